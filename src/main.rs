use std::io::Read;
use std::path::PathBuf;

mod ai;
mod app;
mod config;
mod error;
mod models;
mod store;

use app::{App, SAMPLE_TRANSCRIPT};
use config::Config;
use error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load()?;

    if config.groq_api_key.is_none() {
        tracing::warn!(
            "No Groq API key configured; analysis requests will fail. \
             Set GROQ_API_KEY or add groq_api_key to {:?}",
            Config::config_path()
        );
    }

    let app = App::new(&config);

    // Check for --history flag (print stored analyses and exit)
    if args.len() >= 2 && args[1] == "--history" {
        println!("{}", app.history_text());
        return Ok(());
    }

    // Check for --sample flag (analyze the bundled example transcript)
    let use_sample = args.len() >= 2 && args[1] == "--sample";

    // Check for --file flag
    let file_path = if args.len() >= 3 && args[1] == "--file" {
        Some(PathBuf::from(&args[2]))
    } else {
        None
    };

    let transcript = if use_sample {
        SAMPLE_TRANSCRIPT.to_string()
    } else if let Some(path) = file_path {
        if !path.exists() {
            return Err(anyhow::anyhow!("Transcript file not found: {:?}", path).into());
        }
        std::fs::read_to_string(&path)?
    } else {
        // Default: read the transcript from stdin
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let outcome = app.analyze(&transcript).await;

    if outcome.summary.is_empty() && outcome.sentiment.is_empty() {
        println!("{}", outcome.status);
        return Ok(());
    }

    println!("Summary:\n{}\n", outcome.summary);
    println!("Sentiment: {}\n", outcome.sentiment);
    println!("{}", outcome.status);
    if let Some(path) = outcome.history_path {
        println!("History file: {}", path.display());
    }

    Ok(())
}
