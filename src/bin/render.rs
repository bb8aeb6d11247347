use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crypto_scanner::config::Config;
use crypto_scanner::error::Result;
use crypto_scanner::report::{load_analysis, render_report};

fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(&cfg) {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(cfg: &Config) -> Result<()> {
    let doc = load_analysis(&cfg.data_path)?;
    info!(
        "Generating report with {} opportunities",
        doc.opportunities.len()
    );
    render_report(&cfg.report_path, &doc.opportunities)?;
    info!("Report written to {}", cfg.report_path);
    Ok(())
}
