use anyhow::Context;
use clap::Parser;
use declare_metrics::utils::{logger, validation::Validate};
use declare_metrics::{
    CliConfig, HttpVerifierChannel, MetricsEngine, VerificationOrchestrator, VerifierConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting declare-metrics CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let model_text = load_model_text(&config.model)
        .await
        .with_context(|| format!("failed to load model text from {}", config.model))?;
    let model_path = config.model_path.clone().unwrap_or_else(|| config.model.clone());

    let mapping = match &config.verifier_config {
        Some(path) => {
            let verifier_config =
                VerifierConfig::from_file(path).context("failed to load verifier config")?;
            verifier_config.validate()?;

            let channel = HttpVerifierChannel::new(
                &verifier_config.channel.endpoint,
                &verifier_config.channel.instance_id,
            );
            let orchestrator =
                VerificationOrchestrator::with_settings(channel, verifier_config.settings());
            let engine = MetricsEngine::new(orchestrator);
            engine.compute(&model_text, &model_path).await?
        }
        None => {
            tracing::info!("no verifier config given, computing structural metrics only");
            let engine = MetricsEngine::structural_only();
            engine.compute(&model_text, &model_path).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&mapping)?);
    Ok(())
}

async fn load_model_text(locator: &str) -> anyhow::Result<String> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        let response = reqwest::get(locator).await?;
        if !response.status().is_success() {
            anyhow::bail!("failed to fetch model content: {}", response.status());
        }
        Ok(response.text().await?)
    } else {
        Ok(std::fs::read_to_string(locator)?)
    }
}
