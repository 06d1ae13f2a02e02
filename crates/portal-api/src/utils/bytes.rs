use thiserror::Error;

/// Failure while converting between bytes and `0x`-prefixed hex.
#[derive(Error, Debug)]
pub enum HexError {
    #[error("Could not decode hex: {0}")]
    Decode(#[from] hex::FromHexError),

    #[error("Hex strings must start with 0x, but found {0:?}")]
    MissingPrefix(String),
}

/// Encode hex with 0x prefix
pub fn hex_encode<T: AsRef<[u8]>>(data: T) -> String {
    format!("0x{}", hex::encode(data))
}

/// Decode hex with 0x prefix
pub fn hex_decode(data: &str) -> Result<Vec<u8>, HexError> {
    match data.strip_prefix("0x") {
        Some(stripped) => Ok(hex::decode(stripped)?),
        None => Err(HexError::MissingPrefix(data.chars().take(2).collect())),
    }
}

/// Shortened form used in log lines and `Display` impls, e.g. `0xd1c3..621d`.
pub fn hex_encode_compact<T: AsRef<[u8]>>(data: T) -> String {
    let data = data.as_ref();
    if data.len() <= 8 {
        return hex_encode(data);
    }
    let hex = hex::encode(data);
    format!("0x{}..{}", &hex[..4], &hex[hex.len() - 4..])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use rstest::rstest;

    use super::*;

    #[test]
    fn encode_prefixes_output() {
        assert_eq!(hex_encode([0xb0, 0x0f]), "0xb00f");
    }

    #[test]
    fn decode_prefixed_input() {
        assert_eq!(hex_decode("0xb00f").unwrap(), vec![0xb0, 0x0f]);
        assert!(hex_decode("0x").unwrap().is_empty());
    }

    #[rstest]
    #[case::no_prefix("b00f")]
    #[case::invalid_char("0xb00g")]
    #[case::odd_length("0xb00")]
    #[case::empty("")]
    #[case::single_char("0")]
    fn decode_rejects(#[case] input: &str) {
        assert!(hex_decode(input).is_err());
    }

    #[test]
    fn compact_form() {
        assert_eq!(hex_encode_compact([1, 2, 3]), "0x010203");
        let hash = hex_decode("0xd1c390624d3bd4e409a61a858e5dcc5517729a9170d014a6c96530d64dd8621d")
            .unwrap();
        assert_eq!(hex_encode_compact(hash), "0xd1c3..621d");
    }
}
