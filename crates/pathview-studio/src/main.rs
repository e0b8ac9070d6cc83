mod app;
mod cli;

use anyhow::Result;
use clap::Parser;

use pathview_engine::logging::{init_logging, LoggingConfig};
use pathview_engine::window::Runtime;

use crate::app::PreviewApp;
use crate::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..Default::default()
    });

    let config = args.preview_config();
    config.validate()?;

    let app = PreviewApp::new(config.clone(), args.step);
    Runtime::run(config.runtime_config(), config.gpu_init(), app)
}
