use anyhow::{Context, Result};
use clap::Parser;
use gazscraper::{
    config::ScraperConfig,
    fetch,
    output::{self, RunReport},
    session::ExtractionSession,
    snapshot::HtmlSnapshot,
};
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Extract the ASIC gazette year tables into one CSV"
)]
struct Args {
    /// YAML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Page to fetch.
    #[arg(long)]
    url: Option<String>,
    /// Saved HTML page to read instead of fetching.
    #[arg(short, long)]
    input: Option<PathBuf>,
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also write a JSON run report here.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Partition to extract; repeat for several. Skips section discovery.
    #[arg(short, long = "partition")]
    partitions: Vec<String>,
    #[arg(long)]
    base_url: Option<String>,
}

fn load_config(args: &Args) -> Result<ScraperConfig> {
    let mut cfg = match &args.config {
        Some(path) => ScraperConfig::load(path)?,
        None => ScraperConfig::default(),
    };
    if let Some(url) = &args.url {
        cfg.target_url = url.clone();
    }
    if let Some(base) = &args.base_url {
        cfg.base_url = Some(base.clone());
    }
    if let Some(out) = &args.output {
        cfg.csv_filename = out.clone();
    }
    if args.report.is_some() {
        cfg.report_filename = args.report.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    let args = Args::parse();
    let cfg = load_config(&args)?;
    let started = Instant::now();

    // ─── 2) acquire the page ─────────────────────────────────────────
    let body = match &args.input {
        Some(path) => fetch::read_page(path).await?,
        None => {
            let url = Url::parse(&cfg.target_url)
                .with_context(|| format!("target_url `{}`", cfg.target_url))?;
            let client = fetch::build_client(&cfg.fetch)?;
            fetch::fetch_page(&client, &url, &cfg.fetch)
                .await
                .context("could not load the gazette page")?
        }
    };
    let snapshot = HtmlSnapshot::parse(&body);

    // ─── 3) decide which partitions to process ───────────────────────
    let partitions = if !args.partitions.is_empty() {
        args.partitions.clone()
    } else {
        let found = snapshot.discover_partitions(
            &cfg.section_selectors,
            &cfg.partitions,
            &cfg.partition_regex()?,
        )?;
        if found.is_empty() {
            warn!("falling back to configured partitions");
            cfg.partitions.clone()
        } else {
            found
        }
    };
    info!(partitions = ?partitions, "partitions to process");

    // ─── 4) extract ──────────────────────────────────────────────────
    let mut session = ExtractionSession::from_config(&cfg)?;
    session.run(&snapshot, &partitions);
    let extraction = session.finish();

    // ─── 5) write results ────────────────────────────────────────────
    let written = output::write_csv(&cfg.csv_filename, &extraction.headers, &extraction.records)?;
    if let Some(path) = &cfg.report_filename {
        output::write_report(path, &RunReport::new(&cfg.target_url, &extraction))?;
    }

    info!(
        records = written,
        columns = extraction.headers.len(),
        diagnostics = extraction.diagnostics.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}
