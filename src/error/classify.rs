//! Deterministic error classification and retry-hint derivation.
//!
//! Pure functions over (error code, HTTP status, Retry-After): no I/O, no
//! clock access except what the caller passes in.

use std::time::SystemTime;

/// Semantic failure category attached to every [`ApiError`](super::ApiError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Authorization,
    Permission,
    Parameter,
    Throttling,
    Media,
    Template,
    PhoneRegistration,
    Integrity,
    BusinessEligibility,
    ReengagementWindow,
    WabaConfig,
    Flow,
    Synchronization,
    Server,
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Authorization => "authorization",
            Self::Permission => "permission",
            Self::Parameter => "parameter",
            Self::Throttling => "throttling",
            Self::Media => "media",
            Self::Template => "template",
            Self::PhoneRegistration => "phone_registration",
            Self::Integrity => "integrity",
            Self::BusinessEligibility => "business_eligibility",
            Self::ReengagementWindow => "reengagement_window",
            Self::WabaConfig => "waba_config",
            Self::Flow => "flow",
            Self::Synchronization => "synchronization",
            Self::Server => "server",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// What a caller-side retry loop should do with a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Retry as-is.
    Retry,
    /// Retry after the delay in [`RetryHint::retry_after_ms`].
    RetryAfter,
    /// Retrying can never succeed.
    DoNotRetry,
    /// The credential itself is invalid or expired; obtain a new one first.
    RefreshToken,
    /// The request must change before retrying.
    FixAndRetry,
}

/// Structured retry recommendation derived from a classified error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryHint {
    pub action: RetryAction,
    pub retry_after_ms: Option<u64>,
}

impl RetryHint {
    pub(crate) fn retry() -> Self {
        Self {
            action: RetryAction::Retry,
            retry_after_ms: None,
        }
    }

    pub(crate) fn retry_after(ms: u64) -> Self {
        Self {
            action: RetryAction::RetryAfter,
            retry_after_ms: Some(ms),
        }
    }

    pub(crate) fn do_not_retry() -> Self {
        Self {
            action: RetryAction::DoNotRetry,
            retry_after_ms: None,
        }
    }

    pub(crate) fn refresh_token() -> Self {
        Self {
            action: RetryAction::RefreshToken,
            retry_after_ms: None,
        }
    }

    pub(crate) fn fix_and_retry() -> Self {
        Self {
            action: RetryAction::FixAndRetry,
            retry_after_ms: None,
        }
    }
}

/// Codes for which retrying can never succeed.
pub(crate) const DO_NOT_RETRY_CODES: &[i64] = &[131049, 131050, 131047, 368, 130497, 131031];

/// Codes meaning the credential itself is invalid or expired.
pub(crate) const REFRESH_TOKEN_CODES: &[i64] = &[0, 190];

/// Codes the platform documents as transient even outside 5xx.
pub(crate) const TRANSIENT_CODES: &[i64] = &[1, 2, 17, 341];

/// Ordered code-to-category rules. A `match` keeps the evaluation order
/// explicit; none of the ranges overlap.
fn lookup_code(code: i64) -> Option<ErrorCategory> {
    use ErrorCategory::*;
    let category = match code {
        0 | 190 => Authorization,
        3 | 10 => Permission,
        4 | 80007 | 130429 | 131048 | 131056 => Throttling,
        33 | 100 | 130472 | 131008 | 131009 | 131021 | 131026 | 135000 => Parameter,
        131051..=131053 => Media,
        131000 | 131016 | 131057 | 133004 | 133005 => Server,
        368 | 130497 | 131031 => Integrity,
        131047 => ReengagementWindow,
        131037 => WabaConfig,
        131042 | 134011 => BusinessEligibility,
        131045 | 133000 | 133006 | 133008 | 133009 | 133010 | 133015 | 133016 => PhoneRegistration,
        132000 | 132001 | 132005 | 132007 | 132012 | 132015 | 132016 => Template,
        132068 | 132069 => Flow,
        2593107 | 2593108 => Synchronization,
        // Unlisted 2xx codes are permission failures.
        200..=299 => Permission,
        _ => return None,
    };
    Some(category)
}

/// Map an error code and HTTP status to a semantic category.
///
/// Specific statuses win over the code table; the generic 4xx fallback
/// applies only when the code is absent or unlisted.
pub fn categorize(code: Option<i64>, http_status: u16) -> ErrorCategory {
    match http_status {
        401 => return ErrorCategory::Authorization,
        403 => return ErrorCategory::Permission,
        404 => return ErrorCategory::Parameter,
        429 => return ErrorCategory::Throttling,
        s if s >= 500 => return ErrorCategory::Server,
        _ => {}
    }

    if let Some(code) = code {
        if let Some(category) = lookup_code(code) {
            return category;
        }
    }

    if (400..500).contains(&http_status) {
        return ErrorCategory::Parameter;
    }

    ErrorCategory::Unknown
}

/// Derive the retry recommendation for a classified failure.
///
/// `retry_after_ms` is the already-parsed Retry-After value when the
/// response carried one; it takes precedence over everything else.
pub fn derive_retry_hint(
    code: Option<i64>,
    http_status: u16,
    retry_after_ms: Option<u64>,
) -> RetryHint {
    if let Some(ms) = retry_after_ms {
        return RetryHint::retry_after(ms);
    }
    if let Some(code) = code {
        if DO_NOT_RETRY_CODES.contains(&code) {
            return RetryHint::do_not_retry();
        }
        if REFRESH_TOKEN_CODES.contains(&code) {
            return RetryHint::refresh_token();
        }
    }
    if http_status >= 500 {
        return RetryHint::retry();
    }
    RetryHint::fix_and_retry()
}

/// Parse a Retry-After header value into milliseconds.
///
/// Accepts a plain integer (seconds) or an HTTP date; dates in the past
/// clamp to zero. `now` is injected so the date arithmetic is testable.
pub fn parse_retry_after(value: &str, now: SystemTime) -> Option<u64> {
    let value = value.trim();
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse::<u64>().ok().map(|secs| secs * 1000);
    }
    let date = httpdate::parse_http_date(value).ok()?;
    let ms = date
        .duration_since(now)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    Some(ms)
}
