//! Bearer token value type.

use std::time::{Duration, SystemTime};

/// Tokens expiring within this window are refreshed before use.
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// An access token obtained from a token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    /// Raw token value.
    pub value: String,
    /// Authorization scheme, usually `Bearer`.
    pub scheme: String,
    /// Lifetime reported by the token endpoint.
    pub expires_in_secs: u64,
    /// When the token was obtained.
    pub obtained_at: SystemTime,
}

impl BearerToken {
    pub fn new(value: impl Into<String>, scheme: impl Into<String>, expires_in_secs: u64) -> Self {
        Self {
            value: value.into(),
            scheme: scheme.into(),
            expires_in_secs,
            obtained_at: SystemTime::now(),
        }
    }

    /// Instant the token stops being valid. `None` when the reported lifetime
    /// is past what `SystemTime` can represent.
    pub fn expires_at(&self) -> Option<SystemTime> {
        self.obtained_at
            .checked_add(Duration::from_secs(self.expires_in_secs))
    }

    /// True if the token expires within `threshold` from now.
    pub fn expires_within(&self, threshold: Duration) -> bool {
        self.expires_within_at(threshold, SystemTime::now())
    }

    /// True if `obtained_at + expiry - now <= threshold`. Already expired tokens count.
    /// A lifetime too large to represent never expires soon.
    pub fn expires_within_at(&self, threshold: Duration, now: SystemTime) -> bool {
        let Some(expires_at) = self.expires_at() else {
            return false;
        };
        match expires_at.duration_since(now) {
            Ok(remaining) => remaining <= threshold,
            Err(_) => true,
        }
    }

    /// Value of the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme, self.value)
    }
}
