//! # Retry classification of HTTP statuses.
//!
//! [`RetryClass`] splits every reply a transport can observe into two groups:
//!
//! - [`RetryClass::Retryable`]: `429`, `500`, `502`, `503`, `504`
//! - [`RetryClass::Terminal`]: every other status, including all `2xx` and the rest of `4xx`
//!
//! I/O-level failures are classified by
//! [`TransportError::is_retryable`](crate::TransportError::is_retryable) instead.

/// Statuses retried by the transport.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Transport-level classification of a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryClass {
    /// Transient server condition: another attempt may succeed.
    Retryable,
    /// Final answer: returned to the caller immediately.
    Terminal,
}

impl RetryClass {
    /// Classifies an HTTP status code.
    ///
    /// # Example
    /// ```
    /// use jobvisor::RetryClass;
    ///
    /// assert_eq!(RetryClass::of_status(503), RetryClass::Retryable);
    /// assert_eq!(RetryClass::of_status(404), RetryClass::Terminal);
    /// ```
    pub fn of_status(status: u16) -> Self {
        if RETRYABLE_STATUSES.contains(&status) {
            RetryClass::Retryable
        } else {
            RetryClass::Terminal
        }
    }

    /// True for [`RetryClass::Retryable`].
    #[inline]
    pub fn is_retryable(self) -> bool {
        matches!(self, RetryClass::Retryable)
    }
}

/// True for `2xx` statuses.
#[inline]
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_set() {
        for s in RETRYABLE_STATUSES {
            assert!(RetryClass::of_status(s).is_retryable(), "{s}");
        }
    }

    #[test]
    fn everything_else_is_terminal() {
        for s in [200, 201, 204, 301, 400, 401, 403, 404, 409, 422, 501, 505] {
            assert_eq!(RetryClass::of_status(s), RetryClass::Terminal, "{s}");
        }
    }

    #[test]
    fn success_range() {
        assert!(is_success(200));
        assert!(is_success(299));
        assert!(!is_success(300));
        assert!(!is_success(199));
    }
}
