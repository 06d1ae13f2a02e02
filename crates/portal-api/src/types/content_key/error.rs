use thiserror::Error;

/// An error decoding a content key.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContentKeyError {
    #[error("Input Vec has length {received}, expected {expected}")]
    InvalidLength { received: usize, expected: usize },

    #[error("Unknown content key selector: {0:#04x}")]
    UnknownSelector(u8),

    #[error("Content key is not valid hex: {0}")]
    InvalidHex(String),
}
