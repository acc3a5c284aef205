//! Score sinks: where saved score sheets go.
//!
//! Saving is an extension point. The engine hands a [`ScoreSubmission`]
//! to a [`ScoreSink`] and only cares whether it succeeded. The default
//! [`LogScoreSink`] logs the sheet after a short simulated delay; durable
//! and remote sinks live in `kultoura-store`.

use std::future::Future;
use std::time::Duration;

use kultoura_types::ScoreSubmission;
use tracing::info;

/// Simulated I/O delay of the log sink, in milliseconds.
pub const DEFAULT_LOG_SINK_DELAY_MS: u64 = 1000;

/// Errors a score sink can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    /// The backend failed to accept the submission.
    #[error("score backend failed: {0}")]
    Backend(String),

    /// The submission could not be encoded.
    #[error("score submission could not be encoded: {0}")]
    Encoding(String),
}

/// A destination for saved score sheets.
///
/// Implementations must be cheap to share between tasks; the kiosk host
/// keeps one behind an `Arc`.
pub trait ScoreSink: Send + Sync {
    /// Accept one submission.
    fn submit(
        &self,
        submission: &ScoreSubmission,
    ) -> impl Future<Output = Result<(), SaveError>> + Send;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// A score sink that only logs what it receives.
#[derive(Debug, Clone)]
pub struct LogScoreSink {
    delay: Duration,
}

impl LogScoreSink {
    /// Create a log sink that waits `delay` before reporting success.
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for LogScoreSink {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_LOG_SINK_DELAY_MS))
    }
}

impl ScoreSink for LogScoreSink {
    async fn submit(&self, submission: &ScoreSubmission) -> Result<(), SaveError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let sheet = serde_json::to_string(&submission.sheet)
            .map_err(|e| SaveError::Encoding(e.to_string()))?;

        info!(
            submission_id = %submission.id,
            event_id = %submission.event_id,
            station = submission.station.as_deref().unwrap_or("-"),
            teams = submission.sheet.team_count(),
            sheet = %sheet,
            "Saved scores"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
