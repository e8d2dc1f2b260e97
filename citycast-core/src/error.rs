use thiserror::Error;

/// The only way a forecast fetch fails.
///
/// Transport errors, non-2xx statuses and undecodable bodies all collapse into
/// this one kind. `reason` is kept for logs; callers are not expected to
/// branch on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Bad fetch response: {reason}")]
pub struct FetchError {
    reason: String,
}

impl FetchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_reason() {
        let err = FetchError::new("status 500 Internal Server Error");
        assert_eq!(err.to_string(), "Bad fetch response: status 500 Internal Server Error");
        assert_eq!(err.reason(), "status 500 Internal Server Error");
    }
}
