//! Failure classification for per-repository errors.

use crate::entity::sync_status::SyncStatus;
use crate::platform::PlatformError;

/// How a repository failure affects the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Persisted as `rate_limited`; stops the batch.
    RateLimited,
    /// Persisted as `failed`; siblings continue.
    Transient,
}

impl FailureClass {
    /// Sync status persisted for a failure of this class.
    pub fn sync_status(self) -> SyncStatus {
        match self {
            Self::RateLimited => SyncStatus::RateLimited,
            Self::Transient => SyncStatus::Failed,
        }
    }

    #[inline]
    pub fn is_rate_limited(self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Classify from a transport status and an error message.
///
/// 403 and 429 are rate limits, as is any message mentioning "rate limit"
/// in any letter case.
pub fn classify_parts(status: Option<u16>, message: &str) -> FailureClass {
    if matches!(status, Some(403 | 429)) || message.to_lowercase().contains("rate limit") {
        FailureClass::RateLimited
    } else {
        FailureClass::Transient
    }
}

/// Classify a remote client error.
pub fn classify(err: &PlatformError) -> FailureClass {
    classify_parts(err.status(), &err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_403_is_rate_limited() {
        let err = PlatformError::api(403, "Forbidden");
        assert_eq!(classify(&err), FailureClass::RateLimited);
    }

    #[test]
    fn status_429_is_rate_limited() {
        let err = PlatformError::api(429, "Too Many Requests");
        assert_eq!(classify(&err), FailureClass::RateLimited);
    }

    #[test]
    fn rate_limit_message_is_rate_limited_in_any_case() {
        let err = PlatformError::network("API RATE LIMIT exceeded for installation");
        assert_eq!(classify(&err), FailureClass::RateLimited);

        let err = PlatformError::Api {
            status: None,
            message: "You have exceeded a secondary Rate Limit".to_string(),
        };
        assert_eq!(classify(&err), FailureClass::RateLimited);
    }

    #[test]
    fn other_errors_are_transient() {
        assert_eq!(
            classify(&PlatformError::api(500, "Internal Server Error")),
            FailureClass::Transient
        );
        assert_eq!(
            classify(&PlatformError::not_found("acme/payments")),
            FailureClass::Transient
        );
        assert_eq!(
            classify(&PlatformError::network("connection reset")),
            FailureClass::Transient
        );
    }

    #[test]
    fn class_maps_to_status() {
        assert_eq!(FailureClass::RateLimited.sync_status(), SyncStatus::RateLimited);
        assert_eq!(FailureClass::Transient.sync_status(), SyncStatus::Failed);
    }
}
