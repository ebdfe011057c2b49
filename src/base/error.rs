use thiserror::Error;

/// Error taxonomy for store access, the handler façade and the codec layer.
///
/// Codec variants (`MalformedInput`, `NoCookiesFound`, `UnrecognizedFormat`)
/// are always recoverable: a failed parse surfaces as "nothing imported" and
/// never touches jar state. Store variants distinguish a transport that could
/// not be reached (`StoreUnavailable`) from a store that answered with a
/// domain-specific refusal (`WriteRejected`, `DeleteFailed`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CookieError {
    // Store transport errors
    #[error("Cookie store unavailable: {reason}")]
    StoreUnavailable { reason: String },
    #[error("Cookie write rejected: {reason}")]
    WriteRejected { reason: String },
    #[error("Cookie delete failed: {reason}")]
    DeleteFailed { reason: String },

    // Codec errors
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },
    #[error("No cookies found in input")]
    NoCookiesFound,
    #[error("Input matched no supported interchange format")]
    UnrecognizedFormat,
    #[error("Serialization failed: {message}")]
    Serialization { message: String },
}

impl CookieError {
    /// Create a store-unavailable error with transport context.
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        CookieError::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a write-rejected error with the store's reason.
    pub fn write_rejected(reason: impl Into<String>) -> Self {
        CookieError::WriteRejected {
            reason: reason.into(),
        }
    }

    /// Create a delete-failed error with the store's reason.
    pub fn delete_failed(reason: impl Into<String>) -> Self {
        CookieError::DeleteFailed {
            reason: reason.into(),
        }
    }

    /// Create a malformed-input error naming what failed to decode.
    pub fn malformed_input(message: impl Into<String>) -> Self {
        CookieError::MalformedInput {
            message: message.into(),
        }
    }

    /// True for codec-layer failures that a fallback chain may swallow.
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            CookieError::MalformedInput { .. }
                | CookieError::NoCookiesFound
                | CookieError::UnrecognizedFormat
        )
    }
}

impl From<serde_json::Error> for CookieError {
    fn from(err: serde_json::Error) -> Self {
        CookieError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors() {
        let err = CookieError::store_unavailable("relay channel closed");
        match err {
            CookieError::StoreUnavailable { reason } => {
                assert_eq!(reason, "relay channel closed");
            }
            _ => panic!("Expected StoreUnavailable"),
        }
    }

    #[test]
    fn test_codec_error_classification() {
        assert!(CookieError::malformed_input("bad line").is_codec_error());
        assert!(CookieError::NoCookiesFound.is_codec_error());
        assert!(CookieError::UnrecognizedFormat.is_codec_error());
        assert!(!CookieError::store_unavailable("gone").is_codec_error());
        assert!(!CookieError::write_rejected("bad domain").is_codec_error());
    }

    #[test]
    fn test_display_carries_reason() {
        let err = CookieError::write_rejected("domain not valid for URL");
        assert_eq!(
            err.to_string(),
            "Cookie write rejected: domain not valid for URL"
        );
    }
}
