//! Raw per-node results as returned by the check-result endpoint
//!
//! The service reports each node as either `null` (still running) or an
//! array payload whose shape depends on the check type. Positional access
//! into those arrays is confined to this module.

use crate::types::{AppError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reporting state of a single node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    /// The node has not produced a result yet
    Pending,
    /// The node's raw payload
    Ready(Value),
}

impl NodeState {
    pub fn is_pending(&self) -> bool {
        matches!(self, NodeState::Pending)
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            NodeState::Pending => None,
            NodeState::Ready(value) => Some(value),
        }
    }
}

impl From<Value> for NodeState {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => NodeState::Pending,
            other => NodeState::Ready(other),
        }
    }
}

impl Serialize for NodeState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            NodeState::Pending => serializer.serialize_none(),
            NodeState::Ready(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for NodeState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(NodeState::from(Value::deserialize(deserializer)?))
    }
}

/// Snapshot of a check-result response, ordered by node id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResults {
    nodes: BTreeMap<String, NodeState>,
}

impl RawResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a response body; anything but a JSON object is rejected
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self {
                nodes: map
                    .into_iter()
                    .map(|(node_id, state)| (node_id, NodeState::from(state)))
                    .collect(),
            }),
            other => Err(AppError::parse(format!(
                "Expected a JSON object of node results, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn insert<S: Into<String>>(&mut self, node_id: S, state: NodeState) {
        self.nodes.insert(node_id.into(), state);
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeState> {
        self.nodes.get(node_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodeState)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes still owed a result.
    ///
    /// Counts `null` entries plus nodes the service has not listed yet.
    pub fn pending_count(&self, expected_node_count: usize) -> usize {
        let null_entries = self.nodes.values().filter(|state| state.is_pending()).count();
        let missing = expected_node_count.saturating_sub(self.nodes.len());
        null_entries + missing
    }

    pub fn is_complete(&self, expected_node_count: usize) -> bool {
        self.pending_count(expected_node_count) == 0
    }

    /// Requested nodes that never produced a payload
    pub fn pending_nodes(&self, requested: &[String]) -> Vec<String> {
        let mut pending: Vec<String> = requested
            .iter()
            .filter(|node_id| self.get(node_id).map_or(true, NodeState::is_pending))
            .cloned()
            .collect();

        // Nodes the service added on its own but left unfinished
        for (node_id, state) in &self.nodes {
            if state.is_pending() && !requested.contains(node_id) {
                pending.push(node_id.clone());
            }
        }
        pending
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One ping attempt: `[status, elapsed_secs, ip?]`
#[derive(Debug, Clone, PartialEq)]
pub struct PingAttempt {
    pub status: String,
    pub elapsed_secs: Option<f64>,
    pub ip: Option<String>,
}

impl PingAttempt {
    /// Decode an attempt; `None` when the status is missing or not a string
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_array()?;
        let status = fields.first()?.as_str()?.to_string();
        Some(Self {
            status,
            elapsed_secs: fields.get(1).and_then(Value::as_f64),
            ip: fields.get(2).and_then(Value::as_str).map(str::to_string),
        })
    }

    /// Successful when the status is "OK" and a numeric time was measured
    pub fn is_success(&self) -> bool {
        self.status == "OK" && self.elapsed_secs.is_some()
    }

    pub fn latency_ms(&self) -> Option<f64> {
        if self.status == "OK" {
            self.elapsed_secs.map(|secs| secs * 1000.0)
        } else {
            None
        }
    }
}

/// The single HTTP attempt: `[success, elapsed_secs, message, code?, ip?]`
#[derive(Debug, Clone, PartialEq)]
pub struct HttpAttempt {
    pub success: bool,
    pub elapsed_secs: f64,
    pub status_message: String,
    pub status_code: String,
    pub ip: String,
}

impl HttpAttempt {
    /// Decode an attempt; `None` when the success flag is missing
    pub fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_array()?;
        let flag = fields.first().filter(|flag| !flag.is_null())?;
        let success = match flag {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64() == Some(1.0),
            _ => false,
        };

        Some(Self {
            success,
            elapsed_secs: fields.get(1).and_then(Value::as_f64).unwrap_or(0.0),
            status_message: fields
                .get(2)
                .and_then(Value::as_str)
                .unwrap_or("N/A")
                .to_string(),
            status_code: fields.get(3).and_then(scalar_to_string).unwrap_or_else(|| "N/A".to_string()),
            ip: fields
                .get(4)
                .and_then(Value::as_str)
                .unwrap_or("N/A")
                .to_string(),
        })
    }

    pub fn response_time_ms(&self) -> f64 {
        self.elapsed_secs * 1000.0
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
