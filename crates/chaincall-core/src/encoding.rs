//! `0x`-prefixed hex helpers.
//!
//! Output is always `0x` followed by lowercase digits. Input may omit the
//! prefix and may use either letter case.

use crate::error::AbiError;

/// Encode bytes as a `0x`-prefixed lowercase hex string.
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Strip an optional `0x` / `0X` prefix.
pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode a hex string (with or without `0x`) into bytes.
pub fn from_hex(s: &str) -> Result<Vec<u8>, AbiError> {
    hex::decode(strip_0x(s)).map_err(|e| AbiError::InvalidHex {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

/// Decode a hex string into exactly 32 bytes.
pub fn word_from_hex(s: &str) -> Result<[u8; 32], AbiError> {
    let bytes = from_hex(s)?;
    bytes.as_slice().try_into().map_err(|_| AbiError::InvalidHex {
        input: s.to_string(),
        reason: format!("expected 32 bytes, got {}", bytes.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_output_is_prefixed_lowercase() {
        assert_eq!(to_hex([0xAB, 0x01]), "0xab01");
        assert_eq!(to_hex([0u8; 0]), "0x");
    }

    #[test]
    fn hex_input_accepts_any_case() {
        assert_eq!(from_hex("0xABcd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(from_hex("abcd").unwrap(), vec![0xab, 0xcd]);
        assert!(from_hex("0xzz").is_err());
    }

    #[test]
    fn word_requires_32_bytes() {
        assert!(word_from_hex("0x01").is_err());
        let w = word_from_hex(&format!("0x{}", "00".repeat(31) + "2a")).unwrap();
        assert_eq!(w[31], 0x2a);
    }
}
