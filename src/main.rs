//! car-scout CLI - vehicle listing aggregator command line interface.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;
use url::Url;

use car_scout::{
    extractor_for, normalize, query_builder, server, BrowserConfig, ScoutConfig, SearchSpec,
    Site, VehicleListing, DEFAULT_BIND,
};

/// car-scout - Search OLX and WebMotors for used cars
#[derive(Parser)]
#[command(name = "car-scout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every supported site and print matching listings
    Search(SearchArgs),

    /// Serve the HTTP scrape endpoint
    Serve(ServeArgs),

    /// List supported sites and the search URLs the given filters build
    Sites(SpecArgs),

    /// Run a site extractor over a saved results page
    Extract(ExtractArgs),
}

#[derive(Args)]
struct SpecArgs {
    /// Vehicle make (e.g. Fiat)
    #[arg(long)]
    brand: Option<String>,

    /// Vehicle model (e.g. Uno)
    #[arg(long)]
    model: Option<String>,

    /// Maximum price in BRL
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Oldest model year
    #[arg(long)]
    min_year: Option<i32>,

    /// Newest model year
    #[arg(long)]
    max_year: Option<i32>,

    /// Maximum mileage in km
    #[arg(long)]
    max_mileage: Option<u32>,

    /// Text the listing location must contain
    #[arg(long)]
    location: Option<String>,
}

impl SpecArgs {
    fn to_spec(&self) -> SearchSpec {
        SearchSpec {
            brand: self.brand.clone(),
            model: self.model.clone(),
            max_price: self.max_price,
            min_year: self.min_year,
            max_year: self.max_year,
            max_mileage: self.max_mileage,
            location: self.location.clone(),
        }
    }
}

#[derive(Args)]
struct BrowserArgs {
    /// Chrome/Chromium executable (auto-detected if omitted)
    #[arg(long, env = "CAR_SCOUT_CHROME")]
    chrome: Option<PathBuf>,

    /// Show the browser window
    #[arg(long, env = "CAR_SCOUT_HEADFUL")]
    headful: bool,

    /// Page load timeout in seconds
    #[arg(long, env = "CAR_SCOUT_NAVIGATION_TIMEOUT", default_value = "45")]
    navigation_timeout: u64,

    /// Listing card wait timeout in seconds
    #[arg(long, env = "CAR_SCOUT_SELECTOR_TIMEOUT", default_value = "15")]
    selector_timeout: u64,

    /// Maximum browser sessions open at once
    #[arg(long, env = "CAR_SCOUT_CONCURRENCY", default_value = "1")]
    concurrency: usize,
}

impl BrowserArgs {
    fn to_config(&self) -> ScoutConfig {
        ScoutConfig {
            browser: BrowserConfig {
                headless: !self.headful,
                chrome_path: self.chrome.clone(),
                navigation_timeout: Duration::from_secs(self.navigation_timeout),
                selector_timeout: Duration::from_secs(self.selector_timeout),
                ..Default::default()
            },
            max_concurrent_sessions: self.concurrency,
        }
    }
}

#[derive(Args)]
struct SearchArgs {
    #[command(flatten)]
    spec: SpecArgs,

    #[command(flatten)]
    browser: BrowserArgs,

    /// Maximum number of listings to display
    #[arg(short, long, default_value = "50")]
    limit: usize,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "CAR_SCOUT_BIND", default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    #[command(flatten)]
    browser: BrowserArgs,
}

#[derive(Args)]
struct ExtractArgs {
    /// Site whose extraction rules to apply (olx, webmotors)
    #[arg(short, long, value_parser = parse_site)]
    site: Site,

    /// Saved HTML results page
    #[arg(long)]
    file: PathBuf,

    /// URL the page was saved from, for resolving relative links
    #[arg(long)]
    base_url: Option<Url>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

fn parse_site(id: &str) -> std::result::Result<Site, String> {
    Site::from_id(id).ok_or_else(|| {
        let known: Vec<&str> = Site::ALL.iter().map(|s| s.id()).collect();
        format!("unknown site '{}' (expected one of: {})", id, known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search(args) => run_search(args).await,
        Commands::Serve(args) => run_serve(args).await,
        Commands::Sites(args) => list_sites(&args),
        Commands::Extract(args) => run_extract(&args),
    }
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let spec = args.spec.to_spec();
    let search = args.browser.to_config().build_search();
    let outcome = search.run(&spec).await?;

    for report in outcome.failed_sources() {
        if let Err(e) = &report.result {
            eprintln!("Warning: {} failed: {}", report.site.display_name(), e);
        }
    }

    if matches!(args.format, OutputFormat::Text) {
        println!(
            "\nFound {} vehicles in {}ms:\n",
            outcome.total(),
            outcome.duration_ms
        );
    }
    print_listings(&outcome.vehicles, args.limit, args.format)
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let search = args.browser.to_config().build_search();
    server::serve(args.bind, search)
        .await
        .with_context(|| format!("HTTP server on {} failed", args.bind))
}

fn list_sites(args: &SpecArgs) -> Result<()> {
    let spec = args.to_spec();
    println!("Supported sites:\n");
    for site in Site::ALL {
        println!("  {:<10} - {}", site.id(), site.display_name());
        match query_builder::build(site, &spec) {
            Some(query) => println!("               {}", query.url()),
            None => println!("               (no search URL for these filters)"),
        }
    }
    println!();
    println!("Usage: car-scout search --brand Fiat --model Uno --max-price 40000");
    Ok(())
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let html = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let base = match &args.base_url {
        Some(url) => url.clone(),
        None => query_builder::build(args.site, &SearchSpec::new())
            .map(|query| query.url().clone())
            .context("No default base URL for site")?,
    };

    let records = extractor_for(args.site).extract_cards(&html, &base)?;
    let listings: Vec<VehicleListing> = records
        .into_iter()
        .filter_map(normalize::normalize)
        .collect();

    if matches!(args.format, OutputFormat::Text) {
        println!(
            "\n{} listings extracted from {}:\n",
            listings.len(),
            args.file.display()
        );
    }
    print_listings(&listings, usize::MAX, args.format)
}

fn print_listings(listings: &[VehicleListing], limit: usize, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for (i, listing) in listings.iter().take(limit).enumerate() {
                println!("{}. {}", i + 1, listing.title);
                println!("   URL: {}", listing.listing_url);
                println!(
                    "   Price: {} | Year: {} | Km: {}",
                    display_or_dash(listing.price.as_ref()),
                    display_or_dash(listing.year.as_ref()),
                    display_or_dash(listing.mileage_km.as_ref())
                );
                if let Some(location) = &listing.location {
                    println!("   Location: {}", location);
                }
                println!("   Site: {}", listing.source_site.display_name());
                println!();
            }
        }
        OutputFormat::Json => {
            let output: Vec<_> = listings.iter().take(limit).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Compact => {
            for listing in listings.iter().take(limit) {
                println!(
                    "{}\t{}\t{}",
                    listing.source_site,
                    listing.title,
                    listing.listing_url
                );
            }
        }
    }
    Ok(())
}

fn display_or_dash<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "-".to_string(), T::to_string)
}
