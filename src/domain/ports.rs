use crate::domain::model::PollSnapshot;
use crate::utils::error::Result;
use async_trait::async_trait;

/// The remote formal-verification capability, reachable only through a
/// fire-and-poll command channel. Injected so tests can substitute an
/// in-memory stub for the real transport.
#[async_trait]
pub trait VerificationChannel: Send + Sync {
    /// Dispatch a verification command for the model at `model_path` and
    /// return the remote job identifier.
    async fn submit(&self, model_path: &str) -> Result<String>;

    /// Fetch the current status of a previously submitted command. Polling
    /// has no side effects on the remote job. Implementations return
    /// `MetricsError::JobNotVisible` while the job record has not
    /// registered yet; the orchestrator retries those.
    async fn poll(&self, job_id: &str) -> Result<PollSnapshot>;
}
