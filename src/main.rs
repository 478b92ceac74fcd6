mod cli;

use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;
use cli::Cli;
use stay_scout::export;
use stay_scout::{ProgressSink, ScraperConfig, StayScraper};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => ScraperConfig::from_yaml_file(path)?,
        None => ScraperConfig::default(),
    };
    if let Some(limit) = args.limit {
        config.listings_per_city = limit;
    }
    if args.no_browser {
        config.use_browser = false;
    }
    if args.headful {
        config.headless = false;
    }

    let cities = if args.all {
        config.cities.clone()
    } else {
        args.cities.clone()
    };
    if cities.is_empty() {
        bail!("No cities selected; pass --city \"City, ST\" or --all");
    }

    info!("🏠 Stay Scout");
    info!(
        "Scraping {} cities, up to {} listings each",
        cities.len(),
        config.listings_per_city
    );

    let scraper = StayScraper::new(config).context("Failed to set up scraper")?;
    info!(backend = scraper.backend_name(), "Using fetch backend");

    let run_flag = scraper.run_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Stop requested, finishing the current city");
            run_flag.stop();
        }
    });

    let progress = ProgressSink::new(|message| {
        println!("[{}] {}", Local::now().format("%H:%M:%S"), message);
    });

    let listings = scraper.scrape_cities(&cities, &progress).await;
    // Release Chrome before writing output.
    drop(scraper);

    info!("✅ Scraping completed! Found {} listings", listings.len());
    for (i, listing) in listings.iter().enumerate() {
        match &listing.original_price {
            Some(original) => println!(
                "{}. {} ({} was {})",
                i + 1,
                listing.name,
                listing.price,
                original
            ),
            None => println!("{}. {} ({})", i + 1, listing.name, listing.price),
        }
        println!("   {} | {}", listing.location, listing.url);
    }

    if listings.is_empty() {
        warn!("No listings to export");
        return Ok(());
    }

    let written = export::export(
        &listings,
        args.format,
        &args.output_dir,
        args.output.as_deref(),
    )
    .await?;
    for path in written {
        info!("Data saved to {}", path.display());
    }

    Ok(())
}
