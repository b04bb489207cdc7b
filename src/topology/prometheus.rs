use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::model::{RawConnection, RawNode, StatusResponse};
use super::source::SourceError;

#[derive(Debug, Deserialize)]
pub(super) struct PromResponse {
    pub(super) status: String,
    #[serde(default)]
    pub(super) data: PromData,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct PromData {
    #[serde(default)]
    pub(super) result: Vec<PromSample>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PromSample {
    #[serde(default)]
    pub(super) metric: HashMap<String, String>,
    pub(super) value: (Value, Value),
}

/// Turns an instant-vector answer for `probe_success` into the status shape:
/// `hostname` and `target` labels become nodes in first-seen order and the
/// sample value becomes the connection strength.
pub(super) fn extract_status(response: PromResponse) -> Result<StatusResponse, SourceError> {
    if response.status != "success" {
        return Err(SourceError::QueryFailed(response.status));
    }

    let mut ids: HashMap<String, i64> = HashMap::new();
    let mut nodes = Vec::new();
    let mut connections = Vec::with_capacity(response.data.result.len());

    for sample in response.data.result {
        let hostname = sample.metric.get("hostname").cloned().unwrap_or_default();
        let target = sample.metric.get("target").cloned().unwrap_or_default();
        let strength = parse_sample(&sample.value.1)?;

        let source = node_id(&mut ids, &mut nodes, hostname);
        let target = node_id(&mut ids, &mut nodes, target);
        connections.push(RawConnection {
            source,
            target,
            strength: Some(strength),
        });
    }

    propagate_weakest_link(&mut connections);

    Ok(StatusResponse { nodes, connections })
}

fn node_id(ids: &mut HashMap<String, i64>, nodes: &mut Vec<RawNode>, name: String) -> i64 {
    if let Some(&id) = ids.get(&name) {
        return id;
    }
    let id = nodes.len() as i64;
    ids.insert(name.clone(), id);
    nodes.push(RawNode { id, name });
    id
}

fn parse_sample(value: &Value) -> Result<f64, SourceError> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| SourceError::BadSample(number.to_string())),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| SourceError::BadSample(text.clone())),
        other => Err(SourceError::BadSample(other.to_string())),
    }
}

/// A link is only as healthy as the weakest link feeding its source host.
/// Updates run in order and in place, so earlier lowered values feed later
/// connections.
pub(super) fn propagate_weakest_link(connections: &mut [RawConnection]) {
    for index in 0..connections.len() {
        let source = connections[index].source;
        let mut weakest = connections[index].strength.unwrap_or(0.0);
        for incoming in connections.iter().filter(|other| other.target == source) {
            if let Some(strength) = incoming.strength
                && strength < weakest
            {
                weakest = strength;
            }
        }
        connections[index].strength = Some(weakest);
    }
}
