use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use vitals_core::api::{MediaWikiClient, MediaWikiClientConfig};
use vitals_core::check::{CheckReport, check_listing_page};
use vitals_core::config::{DEFAULT_LISTING_PAGE, VITAL_LEVEL_PAGES, load_config};

#[derive(Debug, Parser)]
#[command(
    name = "vitals",
    version,
    about = "Check listed article quality assessments against the wiki's current assessments"
)]
struct Cli {
    #[arg(
        value_name = "PAGE",
        help = "Listing pages to check, or `all` for the built-in vital article levels"
    )]
    pages: Vec<String>,
    #[arg(
        long,
        value_name = "N",
        help = "Restrict the check to one numbered section of the listing page"
    )]
    section: Option<String>,
    #[arg(
        long,
        value_name = "RATIO",
        help = "Agreement ratio below which a listing is reported (0.0-1.0)"
    )]
    tolerance: Option<f64>,
    #[arg(
        long,
        value_name = "PATH",
        default_value = ".vitals.toml",
        help = "Config file path"
    )]
    config: PathBuf,
    #[arg(long, help = "Print reports as JSON instead of plain lines")]
    json: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    let tolerance = cli.tolerance.unwrap_or_else(|| config.tolerance());
    if !(0.0..=1.0).contains(&tolerance) {
        bail!("tolerance must be between 0.0 and 1.0, got {tolerance}");
    }

    let pages = resolve_pages(&cli.pages);
    let mut client = MediaWikiClient::new(MediaWikiClientConfig::from_config(&config))?;

    let mut reports = Vec::new();
    for page in &pages {
        let report = check_listing_page(&mut client, page, cli.section.as_deref(), tolerance)?;
        if !cli.json {
            print_report(&report);
        }
        reports.push(report);
    }
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    // Mismatches are a report, not a failure.
    Ok(())
}

fn resolve_pages(pages: &[String]) -> Vec<String> {
    if pages.is_empty() {
        return vec![DEFAULT_LISTING_PAGE.to_string()];
    }
    if pages.len() == 1 && pages[0].eq_ignore_ascii_case("all") {
        return VITAL_LEVEL_PAGES.iter().map(ToString::to_string).collect();
    }
    pages.to_vec()
}

fn print_report(report: &CheckReport) {
    match &report.section {
        Some(section) => println!(
            "Looking at {} (section {}). Checked {} listings.",
            report.page, section, report.listings
        ),
        None => println!(
            "Looking at {}. Checked {} listings.",
            report.page, report.listings
        ),
    }
    for mismatch in &report.mismatches {
        match &mismatch.current {
            Some(current) => println!(
                "Found a mismatch! {} listed as {}, currently {}",
                mismatch.title,
                mismatch.listed_as,
                current.join(", ")
            ),
            None => println!(
                "{} has no assessments! Possible redirect or issue with a WikiProject?",
                mismatch.title
            ),
        }
    }
    println!(
        "{} mismatches found ({} API requests).",
        report.mismatches.len(),
        report.request_count
    );
}
