mod classify;
mod dashboard;
mod error;
mod merge;
mod model;
mod scraper;
mod settings;
mod stats;
mod view;

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use classify::gemini::GeminiClient;
use classify::ModelClassifier;
use dashboard::Dashboard;
use model::Company;
use scraper::{FixtureScraper, RecordSource};
use settings::Settings;
use view::{truncate, ViewMode};

#[derive(Parser)]
#[command(name = "yc_radar", about = "Classify YC startups and chart the AI landscape")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape, classify and render one view
    Sync {
        /// Which view to render after the sync
        #[arg(short, long, value_enum, default_value = "landscape")]
        view: ViewMode,
        /// Skip the simulated scrape delay
        #[arg(long)]
        no_delay: bool,
        /// Override the configured model
        #[arg(short, long)]
        model: Option<String>,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the raw records the scraper would deliver
    Records,
    /// Print the prompt that a sync would send
    Prompt,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Sync {
            view,
            no_delay,
            model,
            json,
        } => {
            if no_delay {
                settings.scrape_delay_ms = 0;
            }
            if let Some(model) = model {
                settings.model = model;
            }
            run_sync(&settings, view, json).await
        }
        Commands::Records => {
            let records = FixtureScraper::bundled(Duration::ZERO).fetch().await?;
            if records.is_empty() {
                println!("No records.");
                return Ok(());
            }
            println!(
                "{:>3} | {:<4} | {:<16} | {:<6} | {:<16} | {:<8} | {}",
                "#", "ID", "Company", "Batch", "Website", "Status", "Description"
            );
            println!("{}", "-".repeat(110));
            for (i, record) in records.into_iter().enumerate() {
                let company = Company::pending(record);
                let r = &company.record;
                println!(
                    "{:>3} | {:<4} | {:<16} | {:<6} | {:<16} | {:<8} | {}",
                    i + 1,
                    r.id,
                    truncate(&r.name, 16),
                    r.batch,
                    truncate(&r.website, 16),
                    company.status().as_str(),
                    truncate(&r.raw_description, 40)
                );
            }
            Ok(())
        }
        Commands::Prompt => {
            let records = FixtureScraper::bundled(Duration::ZERO).fetch().await?;
            println!("--- system ---\n{}\n", classify::SYSTEM_INSTRUCTION);
            println!("--- user ---\n{}", classify::build_prompt(&records));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run_sync(settings: &Settings, view: ViewMode, json: bool) -> anyhow::Result<()> {
    let client = GeminiClient::from_settings(settings)?;
    if client.is_none() {
        println!("No API key configured; using keyword heuristic.");
    }
    let dashboard = Dashboard::new(
        Box::new(FixtureScraper::bundled(settings.scrape_delay())),
        Box::new(ModelClassifier::new(client)),
    );
    dashboard.set_view(view);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Analyzing...");
    pb.enable_steady_tick(Duration::from_millis(100));
    // A failed sync is reported through the banner, not the exit code.
    let _ = dashboard.sync().await;
    pb.finish_and_clear();

    let snapshot = dashboard.snapshot();
    if json {
        println!("{}", view::render_json(&snapshot)?);
    } else {
        print!("{}", view::render(&snapshot));
    }
    Ok(())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
