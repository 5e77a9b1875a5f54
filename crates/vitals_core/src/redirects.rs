use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::api::{WikiQuery, ensure_no_service_error};
use crate::batch::MAX_TITLES_PER_REQUEST;

/// Resolves which of the given titles are redirects, mapping old title to
/// canonical target. Titles absent from the result are already canonical.
///
/// This is a pure lookup; callers substitute the resolved titles into their
/// own records before fetching anything keyed by title.
pub fn resolve_redirects<A: WikiQuery>(
    api: &mut A,
    titles: &[String],
) -> Result<BTreeMap<String, String>> {
    let mut resolved = BTreeMap::new();

    for chunk in titles.chunks(MAX_TITLES_PER_REQUEST) {
        let response = api.query(&[
            ("action", "query".to_string()),
            ("titles", chunk.join("|")),
            ("redirects", "1".to_string()),
        ])?;
        ensure_no_service_error(&response)?;
        let parsed: RedirectQueryResponse = serde_json::from_value(response)
            .context("failed to decode redirect resolution response")?;

        for item in parsed.query.redirects {
            resolved.insert(item.from, item.to);
        }
    }

    Ok(resolved)
}

#[derive(Debug, Deserialize, Default)]
struct RedirectQueryResponse {
    #[serde(default)]
    query: RedirectQueryPayload,
}

#[derive(Debug, Deserialize, Default)]
struct RedirectQueryPayload {
    #[serde(default)]
    redirects: Vec<RedirectItem>,
}

#[derive(Debug, Deserialize)]
struct RedirectItem {
    from: String,
    to: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::resolve_redirects;
    use crate::testing::ScriptedApi;

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn maps_old_titles_to_canonical_targets() {
        let mut api = ScriptedApi::new(vec![json!({
            "batchcomplete": true,
            "query": {
                "redirects": [
                    {"from": "Buildings", "to": "Building"},
                    {"from": "Bricks", "to": "Brick"},
                    {"from": "WW2", "to": "World War II"},
                    {"from": "WW1", "to": "World War I"}
                ],
                "pages": []
            }
        })]);

        let resolved = resolve_redirects(
            &mut api,
            &titles(&["Buildings", "Bricks", "WW2", "WW1", "Cup"]),
        )
        .expect("resolve");

        assert_eq!(resolved.get("Buildings").map(String::as_str), Some("Building"));
        assert_eq!(resolved.get("WW2").map(String::as_str), Some("World War II"));
        assert_eq!(resolved.get("WW1").map(String::as_str), Some("World War I"));
        // Not a redirect, so not in the map.
        assert!(!resolved.contains_key("Cup"));
        assert_eq!(api.request_param(0, "redirects"), Some("1"));
    }

    #[test]
    fn chunks_titles_without_pagination() {
        let many: Vec<String> = (0..70).map(|index| format!("Title {index}")).collect();
        let empty = || json!({"batchcomplete": true, "query": {"pages": []}});
        let mut api = ScriptedApi::new(vec![empty(), empty()]);

        let resolved = resolve_redirects(&mut api, &many).expect("resolve");
        assert!(resolved.is_empty());
        assert_eq!(api.requests.len(), 2);
    }

    #[test]
    fn service_error_aborts_resolution() {
        let mut api = ScriptedApi::new(vec![json!({
            "error": {"code": "badtoken", "info": "Invalid request."}
        })]);

        let error = resolve_redirects(&mut api, &titles(&["Anything"])).expect_err("must fail");
        assert!(error.to_string().contains("badtoken"));
    }
}
