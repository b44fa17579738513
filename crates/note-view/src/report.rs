//! Reporting of terminal reload failures.

use crate::error::RefreshError;

/// Turns a terminal reload failure into the message shown to the user.
///
/// Injected into the store at construction time.
pub trait ErrorReporter: Send + Sync {
    /// Record the failure and return the user-facing message.
    fn report(&self, error: &RefreshError) -> String;
}

/// Logs through `tracing` and uses the error's display text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &RefreshError) -> String {
        tracing::error!(attempts = error.attempts(), cause = %error.cause(), "note reload failed");
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;

    #[test]
    fn test_tracing_reporter_message() {
        let err = RefreshError::Permanent {
            attempts: 1,
            source: LoadError::Malformed("front matter".into()),
        };
        assert_eq!(
            TracingReporter.report(&err),
            "Failed to load notes: Malformed document data: front matter"
        );
    }
}
