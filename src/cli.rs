// cli.rs - Command-line interface configuration
use clap::Parser;

use crate::config::{ViewerConfig, DEFAULT_FALLBACK_MODEL, DEFAULT_PRIMARY_MODEL};

#[derive(Parser, Debug, Clone)]
#[command(name = "model-viewer")]
#[command(about = "glTF model viewer with an orbit camera", long_about = None)]
pub struct Cli {
    /// Directory or http(s):// base URL the model paths are relative to
    #[arg(long, default_value = ".")]
    pub assets: String,

    /// Model tried first
    #[arg(long, default_value = DEFAULT_PRIMARY_MODEL)]
    pub primary: String,

    /// Model tried once if the primary fails
    #[arg(long, default_value = DEFAULT_FALLBACK_MODEL)]
    pub fallback: String,

    /// Hide the status text and buttons
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

impl Cli {
    pub fn apply(&self, config: &mut ViewerConfig) {
        config.asset_root = self.assets.clone();
        config.primary_model = self.primary.clone();
        config.fallback_model = self.fallback.clone();
        config.show_ui = !self.no_ui;
    }
}
