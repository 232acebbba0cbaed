use crate::domain::model::{
    ConsistencyVerdict, JobStatus, RedundancyStatus, RedundancyVerdict, VerificationJob,
    VerificationOutcome,
};
use crate::domain::ports::VerificationChannel;
use crate::utils::error::MetricsError;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};

/// Timing knobs for the submit-and-poll loop. Defaults follow the remote
/// checker deployment: commands take a few seconds to register, and the
/// analysis itself runs tens of seconds on non-trivial models.
#[derive(Debug, Clone)]
pub struct VerifierSettings {
    /// Wait before the first poll; the remote system needs time to register
    /// the job.
    pub initial_delay: Duration,
    pub poll_interval: Duration,
    pub max_attempts: u32,
    /// Hard wall-clock backstop, independent of the attempt budget.
    pub overall_timeout: Duration,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            poll_interval: Duration::from_secs(6),
            max_attempts: 15,
            overall_timeout: Duration::from_secs(120),
        }
    }
}

/// Drives the remote verification channel for one model at a time and
/// normalizes whatever comes back into the BH1/BH2 verdict pair.
///
/// Callers always receive well-formed verdicts; terminal channel failures,
/// malformed output and timeouts are folded into the verdict messages and
/// never surface as errors.
pub struct VerificationOrchestrator<C: VerificationChannel> {
    channel: C,
    settings: VerifierSettings,
    // One in-flight command per channel target; polling is not serialized.
    submit_lock: Mutex<()>,
}

impl<C: VerificationChannel> VerificationOrchestrator<C> {
    pub fn new(channel: C) -> Self {
        Self::with_settings(channel, VerifierSettings::default())
    }

    pub fn with_settings(channel: C, settings: VerifierSettings) -> Self {
        Self {
            channel,
            settings,
            submit_lock: Mutex::new(()),
        }
    }

    /// Runs one full verification round: submit, poll to a terminal state,
    /// normalize. Returns the consistency (BH2) and redundancy (BH1)
    /// verdicts, in that order.
    pub async fn verify(&self, model_path: &str) -> (ConsistencyVerdict, RedundancyVerdict) {
        let outcome = match timeout(self.settings.overall_timeout, self.run(model_path)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(model_path, "verification cancelled by overall timeout");
                VerificationOutcome::TimedOut
            }
        };
        normalize(outcome)
    }

    async fn run(&self, model_path: &str) -> VerificationOutcome {
        let job = {
            let _guard = self.submit_lock.lock().await;
            match self.channel.submit(model_path).await {
                Ok(job_id) => VerificationJob::new(job_id, model_path.to_string()),
                Err(e) => {
                    tracing::warn!(model_path, error = %e, "verification command dispatch failed");
                    return VerificationOutcome::Failed {
                        message: e.to_string(),
                    };
                }
            }
        };
        tracing::debug!(job_id = %job.job_id, "verification command dispatched");
        sleep(self.settings.initial_delay).await;

        let mut attempts = 0;
        while attempts < self.settings.max_attempts {
            match self.channel.poll(&job.job_id).await {
                Ok(snapshot) => match snapshot.status {
                    JobStatus::Success => {
                        let elapsed = chrono::Utc::now() - job.submitted_at;
                        tracing::info!(
                            job_id = %job.job_id,
                            elapsed_ms = elapsed.num_milliseconds(),
                            "verification command succeeded"
                        );
                        return VerificationOutcome::Succeeded {
                            output: snapshot.output.unwrap_or_default(),
                        };
                    }
                    JobStatus::Failed => {
                        return VerificationOutcome::Failed {
                            message: "Verification command failed".to_string(),
                        }
                    }
                    JobStatus::Pending | JobStatus::InProgress => {}
                    JobStatus::Other(status) => {
                        return VerificationOutcome::Failed {
                            message: format!("Unexpected command status: {}", status),
                        }
                    }
                },
                // The job record is not registered yet; a poll race, not a
                // failure. Retrying consumes one attempt.
                Err(MetricsError::JobNotVisible { .. }) => {
                    tracing::debug!(job_id = %job.job_id, "command not visible yet, retrying");
                }
                Err(e) => {
                    return VerificationOutcome::Failed {
                        message: e.to_string(),
                    }
                }
            }

            attempts += 1;
            if attempts < self.settings.max_attempts {
                sleep(self.settings.poll_interval).await;
            }
        }

        tracing::warn!(job_id = %job.job_id, "polling attempts exhausted");
        VerificationOutcome::ExhaustedAttempts
    }
}

#[derive(Debug, Deserialize)]
struct RawCheckerOutput {
    success: Option<bool>,
    satisfiable: Option<bool>,
    redundant: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RedundantEntry {
    template: String,
    activities: Vec<String>,
}

fn normalize(outcome: VerificationOutcome) -> (ConsistencyVerdict, RedundancyVerdict) {
    match outcome {
        VerificationOutcome::Succeeded { output } => normalize_output(&output),
        VerificationOutcome::Failed { message } => failure_pair(message, RedundancyStatus::Failed),
        VerificationOutcome::ExhaustedAttempts => failure_pair(
            "Computation timed out".to_string(),
            RedundancyStatus::TooComplex,
        ),
        VerificationOutcome::TimedOut => failure_pair(
            "Computation timed out".to_string(),
            RedundancyStatus::TimedOut,
        ),
    }
}

/// Splits the raw checker payload into the two independent metric objects.
/// Both carry the same message for traceability; neither carries the
/// other's fields.
fn normalize_output(output: &str) -> (ConsistencyVerdict, RedundancyVerdict) {
    let trimmed = output.trim();
    if trimmed.is_empty() || !trimmed.starts_with('{') {
        return failure_pair("Invalid output format".to_string(), RedundancyStatus::Failed);
    }
    let raw: RawCheckerOutput = match serde_json::from_str(trimmed) {
        Ok(raw) => raw,
        Err(_) => {
            return failure_pair("Invalid output format".to_string(), RedundancyStatus::Failed)
        }
    };

    if raw.success == Some(false) {
        let message = raw
            .error
            .unwrap_or_else(|| "Failed to check consistency or semantical redundancy".to_string());
        return failure_pair(message, RedundancyStatus::Failed);
    }

    let entries = match raw.redundant.as_deref() {
        Some(encoded) => match parse_redundant(encoded) {
            Ok(entries) => entries,
            Err(_) => {
                return failure_pair(
                    "Invalid output format".to_string(),
                    RedundancyStatus::Failed,
                )
            }
        },
        None => Vec::new(),
    };

    let message = "Model verification completed".to_string();
    let consistency = ConsistencyVerdict {
        message: message.clone(),
        satisfiable: Some(raw.satisfiable.unwrap_or(false)),
    };

    let redundancy = if entries.is_empty() {
        RedundancyVerdict {
            message,
            status: RedundancyStatus::None,
            result: None,
            redundant_count: Some(0),
        }
    } else {
        RedundancyVerdict {
            message,
            status: RedundancyStatus::Detected,
            result: Some(format_redundant(&entries)),
            redundant_count: Some(entries.len()),
        }
    };

    (consistency, redundancy)
}

/// The checker encodes the redundant-constraint array as a string, with
/// Python-style single quotes. Normalize the quoting before the inner parse.
fn parse_redundant(encoded: &str) -> serde_json::Result<Vec<RedundantEntry>> {
    serde_json::from_str(&encoded.replace('\'', "\""))
}

fn format_redundant(entries: &[RedundantEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let activities = entry
                .activities
                .iter()
                .map(|activity| format!("'{}'", activity))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}[{}]", entry.template, activities)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn failure_pair(
    message: String,
    status: RedundancyStatus,
) -> (ConsistencyVerdict, RedundancyVerdict) {
    (
        ConsistencyVerdict {
            message: message.clone(),
            satisfiable: None,
        },
        RedundancyVerdict {
            message,
            status,
            result: None,
            redundant_count: None,
        },
    )
}
