use crate::core::verifier::VerificationOrchestrator;
use crate::core::{components, grammar, metrics, parser};
use crate::domain::model::{MetricValue, PollSnapshot};
use crate::domain::ports::VerificationChannel;
use crate::utils::error::{MetricsError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// The full metrics pipeline: validate, parse, analyze, calculate, verify.
///
/// Produces one mapping from metric identifier to value, handed verbatim to
/// whatever persists it. Verification is optional; without an orchestrator
/// the behavioral metrics are simply absent from the mapping.
pub struct MetricsEngine<C: VerificationChannel> {
    verifier: Option<VerificationOrchestrator<C>>,
}

impl<C: VerificationChannel> MetricsEngine<C> {
    pub fn new(verifier: VerificationOrchestrator<C>) -> Self {
        Self {
            verifier: Some(verifier),
        }
    }

    /// Computes all metrics for one model.
    ///
    /// `model_text` is the raw file content; `model_path` is the storage
    /// locator the remote checker resolves on its own. An empty text short-
    /// circuits to the qualitative sentinels; a grammar violation rejects
    /// the whole computation with the offending line's diagnostic.
    pub async fn compute(
        &self,
        model_text: &str,
        model_path: &str,
    ) -> Result<BTreeMap<String, MetricValue>> {
        if model_text.trim().is_empty() {
            tracing::info!("model has no content, returning qualitative sentinels only");
            return Ok(metrics::sentinel_metrics());
        }

        grammar::validate(model_text)?;
        let model = parser::parse(model_text);
        let analyzed = components::analyze(&model);
        tracing::debug!(
            activities = model.activities().len(),
            constraints = model.constraints().len(),
            components = analyzed.len(),
            "model analyzed"
        );

        let mut mapping = metrics::structural_metrics(&model, &analyzed);
        mapping.extend(metrics::sentinel_metrics());

        if let Some(verifier) = &self.verifier {
            tracing::info!(model_path, "dispatching remote verification");
            let (consistency, redundancy) = verifier.verify(model_path).await;
            mapping.insert("BH2".to_string(), MetricValue::Consistency(consistency));
            mapping.insert("BH1".to_string(), MetricValue::Redundancy(redundancy));
        }

        Ok(mapping)
    }
}

/// Stand-in channel for engines running without remote verification.
pub struct NullChannel;

#[async_trait]
impl VerificationChannel for NullChannel {
    async fn submit(&self, _model_path: &str) -> Result<String> {
        Err(MetricsError::ChannelError {
            message: "verification channel disabled".to_string(),
        })
    }

    async fn poll(&self, _job_id: &str) -> Result<PollSnapshot> {
        Err(MetricsError::ChannelError {
            message: "verification channel disabled".to_string(),
        })
    }
}

impl MetricsEngine<NullChannel> {
    /// An engine that computes structural metrics only.
    pub fn structural_only() -> Self {
        Self { verifier: None }
    }
}
