use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::api::{WikiQuery, fetch_page_wikitext};
use crate::batch::page_assessments;
use crate::listing::{Listing, parse_listings};
use crate::redirects::resolve_redirects;

/// Minimum agreement ratio before a listing is reported. Any positive value
/// means a claimed assessment no rating project agrees with is always
/// reported; raising it demands broader agreement.
pub const DEFAULT_TOLERANCE: f64 = 0.2;

/// A listing whose claimed assessment disagrees with the observed ones.
/// `current: None` means the title yielded no assessment data at all, which
/// usually points at a rename, redirect, or deletion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub title: String,
    pub listed_as: String,
    pub current: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub page: String,
    pub section: Option<String>,
    pub listings: usize,
    pub redirects_resolved: usize,
    pub mismatches: Vec<Mismatch>,
    pub request_count: usize,
}

/// Compares claimed assessments against observed ones.
///
/// Per listing: a title absent from `assessments` is reported with
/// `current: None`. A title whose every observed class is the empty string is
/// not reported at all; nobody has rated it, so there is nothing to judge.
/// Otherwise the listing is reported when the fraction of non-empty classes
/// matching the claim (case-insensitively) falls below `tolerance`, and the
/// report carries the full observed sequence, empty entries included.
pub fn find_mismatches(
    listings: &[Listing],
    assessments: &BTreeMap<String, Vec<String>>,
    tolerance: f64,
) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    for listing in listings {
        let Some(observed) = assessments.get(&listing.title) else {
            mismatches.push(Mismatch {
                title: listing.title.clone(),
                listed_as: listing.assessment.clone(),
                current: None,
            });
            continue;
        };

        let rated: Vec<&String> = observed.iter().filter(|class| !class.is_empty()).collect();
        if rated.is_empty() {
            continue;
        }

        let agreeing = rated
            .iter()
            .filter(|class| class.eq_ignore_ascii_case(&listing.assessment))
            .count();
        let ratio = agreeing as f64 / rated.len() as f64;
        if ratio < tolerance {
            mismatches.push(Mismatch {
                title: listing.title.clone(),
                listed_as: listing.assessment.clone(),
                current: Some(observed.clone()),
            });
        }
    }

    mismatches
}

/// Checks one listing page end to end: fetch its wikitext, parse the
/// listings, canonicalize redirected titles, fetch current assessments keyed
/// by canonical title, and classify.
pub fn check_listing_page<A: WikiQuery>(
    api: &mut A,
    page: &str,
    section: Option<&str>,
    tolerance: f64,
) -> Result<CheckReport> {
    let requests_before = api.request_count();
    let content = fetch_page_wikitext(api, page, section)?
        .with_context(|| format!("no content returned for {page}"))?;
    let mut listings = parse_listings(&content);

    let titles: Vec<String> = listings
        .iter()
        .map(|listing| listing.title.clone())
        .collect();
    let redirect_map = resolve_redirects(api, &titles)?;
    // Canonicalize before any lookup keyed by title, so both the assessment
    // fetch and the report use the current identity.
    for listing in &mut listings {
        if let Some(target) = redirect_map.get(&listing.title) {
            listing.title = target.clone();
        }
    }

    let canonical: Vec<String> = listings
        .iter()
        .map(|listing| listing.title.clone())
        .collect();
    let assessments = page_assessments(api, &canonical)?;
    let mismatches = find_mismatches(&listings, &assessments, tolerance);

    Ok(CheckReport {
        page: page.to_string(),
        section: section.map(ToString::to_string),
        listings: listings.len(),
        redirects_resolved: redirect_map.len(),
        mismatches,
        request_count: api.request_count() - requests_before,
    })
}
