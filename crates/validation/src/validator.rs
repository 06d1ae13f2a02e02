use std::future::Future;

/// Outcome of checking a content value against the key it was offered or served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Proven against the pre-merge accumulator or a validated header. Safe to store and gossip.
    CanonicallyValid,
    /// Rejected, with the reason.
    Invalid(String),
}

/// Checks content received from peers before it is stored or passed on.
pub trait Validator<TContentKey> {
    fn validate_content(
        &self,
        content_key: &TContentKey,
        content_value: &[u8],
    ) -> impl Future<Output = ValidationResult> + Send;
}
