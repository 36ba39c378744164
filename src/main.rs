use kindle_clippings::config::Config;
use kindle_clippings::parser::{parse_clippings, ParseOptions};
use kindle_clippings::render::{render_json, render_markdown};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum AppError {
    InputRead(String, std::io::Error),
    OutputWrite(String, std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InputRead(path, e) => write!(f, "Failed to read '{}': {}", path, e),
            AppError::OutputWrite(path, e) => write!(f, "Failed to write '{}': {}", path, e),
            AppError::Json(e) => write!(f, "Failed to serialize JSON: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), AppError> {
    let input_path = resolve_input_path(&config.input_path);
    info!("Parsing input file: {}", input_path);

    let raw = std::fs::read_to_string(&input_path)
        .map_err(|e| AppError::InputRead(input_path.clone(), e))?;

    let opts = ParseOptions {
        body_join: config.body_join,
    };
    let report = parse_clippings(&raw, &opts);

    for skipped in &report.skipped {
        warn!("Skipped block {}: {}", skipped.index, skipped.reason);
    }
    if report.clippings.is_empty() {
        warn!("No clippings found in the file");
    }

    let markdown = render_markdown(&report.clippings);
    std::fs::write(&config.output_path, markdown)
        .map_err(|e| AppError::OutputWrite(config.output_path.clone(), e))?;
    info!("Markdown written to: {}", config.output_path);

    if config.json {
        let json_path = config.json_output_path();
        let json = render_json(&report.clippings).map_err(AppError::Json)?;
        std::fs::write(&json_path, json).map_err(|e| AppError::OutputWrite(json_path.clone(), e))?;
        info!("JSON written to: {}", json_path);
    }

    info!(
        "Done: {} clippings, {} blocks skipped",
        report.clippings.len(),
        report.skipped.len()
    );

    Ok(())
}

// When the given path does not exist, look for the file under the input/
// directory before giving up.
fn resolve_input_path(path: &str) -> String {
    if Path::new(path).exists() {
        return path.to_string();
    }

    match Path::new(path).file_name() {
        Some(name) => {
            let fallback = Path::new("input").join(name);
            if fallback.exists() {
                fallback.to_string_lossy().into_owned()
            } else {
                path.to_string()
            }
        }
        None => path.to_string(),
    }
}
