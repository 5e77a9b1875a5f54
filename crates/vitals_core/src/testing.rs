use std::collections::{BTreeMap, VecDeque};

use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::api::WikiQuery;

/// Replays canned API responses in order and records the parameters of every
/// request so tests can assert on chunking and continuation echoing.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    pub responses: VecDeque<Value>,
    pub requests: Vec<BTreeMap<String, String>>,
}

impl ScriptedApi {
    pub fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: responses.into(),
            requests: Vec::new(),
        }
    }

    pub fn request_param(&self, index: usize, key: &str) -> Option<&str> {
        self.requests
            .get(index)
            .and_then(|params| params.get(key))
            .map(String::as_str)
    }
}

impl WikiQuery for ScriptedApi {
    fn query(&mut self, params: &[(&str, String)]) -> Result<Value> {
        self.requests.push(
            params
                .iter()
                .map(|(key, value)| ((*key).to_string(), value.clone()))
                .collect(),
        );
        self.responses
            .pop_front()
            .ok_or_else(|| anyhow!("scripted api ran out of responses"))
    }

    fn request_count(&self) -> usize {
        self.requests.len()
    }
}
