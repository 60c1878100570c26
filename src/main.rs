use std::fs::File;
use std::path::PathBuf;

use chatview::core::config;
use chatview::tui;
use clap::Parser;
use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

#[derive(Parser)]
#[command(name = "chatview", about = "Terminal viewer for exported chat archives")]
struct Args {
    /// Archive to open (defaults to processed_data.json)
    archive: Option<PathBuf>,

    /// Directory the modified processed_data.json is written to
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

/// File logger that records everything until the configured level is known.
fn init_logging(log_file: File) {
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    let _ = WriteLogger::init(LevelFilter::Trace, log_config, log_file);
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Logger first, so config loading can report what it did
    if let Ok(log_file) = File::create("chatview.log") {
        init_logging(log_file);
    }

    let file_config = config::load_config().map_err(std::io::Error::other)?;
    let resolved = config::resolve(
        &file_config,
        args.archive.as_deref(),
        args.export_dir.as_deref(),
    );
    log::set_max_level(resolved.log_level);

    log::info!(
        "chatview starting with archive {} (export to {})",
        resolved.archive_path.display(),
        resolved.export_path.display()
    );

    tui::run(resolved)
}
