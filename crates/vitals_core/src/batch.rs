use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::api::{WikiQuery, ensure_no_service_error};

/// MediaWiki caps `titles=` at 50 per request for ordinary clients.
pub const MAX_TITLES_PER_REQUEST: usize = 50;

/// Per-title attribute data accumulated across all pages and chunks of one
/// `batch_query` call. Sub-keys merge additively; a sub-key that recurs on a
/// later page overwrites the earlier value.
pub type AttributeMap = BTreeMap<String, Map<String, Value>>;

/// Fetches `prop` data for every title, issuing as many chunked and paginated
/// requests as the service demands.
///
/// A single page response may carry only some titles' data, and may carry
/// different sub-keys for the same title than an earlier page did, so every
/// partial result is merged into one accumulator local to this call. The
/// `continue` payload is opaque: it is echoed back verbatim until a response
/// carries the `batchcomplete` marker. A service-reported error aborts the
/// whole call; the partially accumulated map is discarded with it.
pub fn batch_query<A: WikiQuery>(
    api: &mut A,
    prop: &str,
    titles: &[String],
) -> Result<AttributeMap> {
    let mut results = AttributeMap::new();

    for chunk in titles.chunks(MAX_TITLES_PER_REQUEST) {
        let joined = chunk.join("|");
        // Loop-carried continuation, empty on the first page of the chunk.
        let mut continuation: Vec<(String, String)> = Vec::new();

        loop {
            let response = {
                let mut params = vec![
                    ("action", "query".to_string()),
                    ("prop", prop.to_string()),
                    ("titles", joined.clone()),
                ];
                for (key, value) in &continuation {
                    params.push((key.as_str(), value.clone()));
                }
                api.query(&params)?
            };
            ensure_no_service_error(&response)?;

            if let Some(pages) = response
                .get("query")
                .and_then(|query| query.get("pages"))
                .and_then(Value::as_array)
            {
                for page in pages {
                    let title = match page.get("title").and_then(Value::as_str) {
                        Some(title) => title,
                        None => continue,
                    };
                    let data = match page.get(prop).and_then(Value::as_object) {
                        Some(data) => data,
                        None => continue,
                    };
                    let entry = results.entry(title.to_string()).or_default();
                    for (key, value) in data {
                        entry.insert(key.clone(), value.clone());
                    }
                }
            }

            // Presence of the marker ends the chunk regardless of its value.
            if response.get("batchcomplete").is_some() {
                break;
            }
            continuation = match response.get("continue").and_then(Value::as_object) {
                Some(section) => continuation_pairs(section),
                None => break,
            };
        }
    }

    Ok(results)
}

/// Derived view over `batch_query` for page assessments: per title, the
/// `class` assigned by each rating project, in project order. A project with
/// no usable class contributes an empty string.
pub fn page_assessments<A: WikiQuery>(
    api: &mut A,
    titles: &[String],
) -> Result<BTreeMap<String, Vec<String>>> {
    let attributes = batch_query(api, "pageassessments", titles)?;
    let mut output = BTreeMap::new();
    for (title, projects) in attributes {
        let classes = projects
            .values()
            .map(|project| {
                project
                    .get("class")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string()
            })
            .collect();
        output.insert(title, classes);
    }
    Ok(output)
}

fn continuation_pairs(section: &Map<String, Value>) -> Vec<(String, String)> {
    section
        .iter()
        .map(|(key, value)| {
            let value = match value.as_str() {
                Some(text) => text.to_string(),
                None => value.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}
