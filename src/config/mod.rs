pub mod verifier;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "declare-metrics")]
#[command(about = "Structural and behavioral metrics for Declare process models")]
pub struct CliConfig {
    /// Path or http(s) URL of the model file
    pub model: String,

    #[arg(long, help = "TOML config for the remote verification channel")]
    pub verifier_config: Option<String>,

    #[arg(
        long,
        help = "Storage locator passed to the remote checker (defaults to the model argument)"
    )]
    pub model_path: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
