use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::application::{
    AddressCorrector, AddressResolver, CoordinateRefiner, GeocodeBatchUseCase,
};
use crate::domain::error::{AppError, Result};
use crate::domain::run::ProgressEvent;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::csv::{CsvReader, CsvWriter};
use crate::infrastructure::geocoding::GoogleMapsClient;
use crate::infrastructure::llm_clients::{GeminiClient, LlmClient};
use crate::infrastructure::request_counter::RequestCounter;

#[derive(Debug, Parser)]
#[command(
    name = "geopin",
    version,
    about = "Batch-geocode a CSV of postal addresses"
)]
pub struct Cli {
    /// Input CSV file; must contain an `address` column
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Directory the augmented CSV is written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Extra TOML config file merged over geopin.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Geocode the raw addresses without the LLM correction pre-step
    #[arg(long, default_value_t = false)]
    no_correct: bool,

    /// Skip the LLM coordinate refinement post-step
    #[arg(long, default_value_t = false)]
    no_refine: bool,

    /// Country restriction (ISO 3166-1 alpha-2), overrides the config value
    #[arg(long, value_name = "CC")]
    country: Option<String>,
}

/// One full run: load, resolve every row on a background task while this
/// task renders progress, then save. One run per process invocation.
pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let country = cli.country.unwrap_or_else(|| config.country.clone());

    if !cli.out_dir.is_dir() {
        return Err(AppError::ValidationError(format!(
            "output directory {} does not exist",
            cli.out_dir.display()
        )));
    }

    let table = CsvReader::new().read_file(&cli.input)?;
    println!(
        "Geocoding {} rows from {} (country filter {})",
        table.len(),
        cli.input.display(),
        country
    );

    let resolver = build_resolver(&config, country, cli.no_correct, cli.no_refine);
    let counter = RequestCounter::load(&config.request_count_file, config.monthly_request_limit);
    let mut use_case = GeocodeBatchUseCase::new(resolver, counter);

    let (tx, rx) = mpsc::channel(32);
    let worker = tokio::spawn(async move {
        let mut table = table;
        let summary = use_case.execute(&mut table, &tx).await;
        (table, summary)
    });

    render_progress(rx).await;

    let (table, summary) = worker
        .await
        .map_err(|e| AppError::Internal(format!("geocoding task failed: {}", e)))?;
    let summary = summary?;

    let path = CsvWriter::new().write(&table, &cli.out_dir)?;
    println!(
        "Done: {} of {} rows resolved, {} requests used this month.",
        summary.resolved, summary.total, summary.requests_used
    );
    println!("Results written to {}", path.display());
    Ok(())
}

fn build_resolver(
    config: &AppConfig,
    country: String,
    no_correct: bool,
    no_refine: bool,
) -> AddressResolver {
    let geocoder = Arc::new(GoogleMapsClient::new(config.google_maps_api_key.clone()));
    let mut resolver = AddressResolver::new(geocoder, country);

    let llm_client: Option<Arc<dyn LlmClient + Send + Sync>> =
        config.gemini_api_key.as_ref().map(|key| {
            Arc::new(GeminiClient::new(key.clone(), &config.gemini))
                as Arc<dyn LlmClient + Send + Sync>
        });

    match llm_client {
        Some(client) => {
            if !no_correct {
                resolver = resolver.with_corrector(AddressCorrector::new(client.clone()));
            }
            if !no_refine {
                resolver = resolver.with_refiner(CoordinateRefiner::new(client));
            }
        }
        None => {
            tracing::info!("no Gemini API key configured, LLM correction and refinement disabled");
        }
    }
    resolver
}

async fn render_progress(mut events: mpsc::Receiver<ProgressEvent>) {
    let mut bar: Option<ProgressBar> = None;
    while let Some(event) = events.recv().await {
        match event {
            ProgressEvent::Started { total_rows } => {
                let pb = ProgressBar::new(total_rows as u64);
                pb.set_style(
                    ProgressStyle::with_template(
                        "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                pb.set_message("geocoding");
                bar = Some(pb);
            }
            ProgressEvent::RowProcessed { .. } => {
                if let Some(pb) = &bar {
                    pb.inc(1);
                }
            }
            ProgressEvent::QuotaExhausted { completed } => {
                if let Some(pb) = &bar {
                    pb.println(format!(
                        "Monthly request limit reached after {} rows; remaining rows left unresolved.",
                        completed
                    ));
                }
            }
        }
    }
    if let Some(pb) = &bar {
        pb.finish_with_message("done");
    }
}
