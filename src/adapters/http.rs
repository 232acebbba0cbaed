use crate::domain::model::{JobStatus, PollSnapshot};
use crate::domain::ports::VerificationChannel;
use crate::utils::error::{MetricsError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Verification channel over an HTTP command API.
///
/// The remote side exposes `POST /commands` to dispatch the checker against
/// a model path on a target instance, and `GET /commands/{id}` to observe
/// the invocation. A 404 on the poll endpoint means the command record has
/// not registered yet and maps to the retryable `JobNotVisible` error.
#[derive(Debug, Clone)]
pub struct HttpVerifierChannel {
    client: Client,
    endpoint: String,
    instance_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    instance_id: &'a str,
    model_path: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    command_id: String,
}

#[derive(Deserialize)]
struct PollResponse {
    status: String,
    output: Option<String>,
}

impl HttpVerifierChannel {
    pub fn new(endpoint: impl Into<String>, instance_id: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            endpoint,
            instance_id: instance_id.into(),
        }
    }
}

#[async_trait]
impl VerificationChannel for HttpVerifierChannel {
    async fn submit(&self, model_path: &str) -> Result<String> {
        let url = format!("{}/commands", self.endpoint);
        tracing::debug!(url = %url, model_path, "dispatching verification command");

        let response = self
            .client
            .post(&url)
            .json(&SubmitRequest {
                instance_id: &self.instance_id,
                model_path,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MetricsError::ChannelError {
                message: format!("command submission returned {}", response.status()),
            });
        }

        let body: SubmitResponse = response.json().await?;
        Ok(body.command_id)
    }

    async fn poll(&self, job_id: &str) -> Result<PollSnapshot> {
        let url = format!("{}/commands/{}", self.endpoint, job_id);

        let response = self
            .client
            .get(&url)
            .query(&[("instance", self.instance_id.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(MetricsError::JobNotVisible {
                job_id: job_id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(MetricsError::ChannelError {
                message: format!("status poll returned {}", response.status()),
            });
        }

        let body: PollResponse = response.json().await?;
        Ok(PollSnapshot {
            status: JobStatus::from_remote(&body.status),
            output: body.output,
        })
    }
}
