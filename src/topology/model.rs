use serde::{Deserialize, Serialize};

pub const DEFAULT_STRENGTH: f32 = 0.5;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawNode {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawConnection {
    pub source: i64,
    pub target: i64,
    #[serde(default)]
    pub strength: Option<f64>,
}

/// Body of the `/status` endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub connections: Vec<RawConnection>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub strength: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Topology {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

impl Topology {
    pub fn from_response(response: StatusResponse) -> Self {
        let nodes = response
            .nodes
            .into_iter()
            .map(|node| Node {
                id: node.id.to_string(),
                name: node.name,
            })
            .collect();

        let connections = response
            .connections
            .into_iter()
            .map(|connection| Connection {
                source: connection.source.to_string(),
                target: connection.target.to_string(),
                strength: coerce_strength(connection.strength),
            })
            .collect();

        Self { nodes, connections }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// Absent, zero and non-finite strengths all fall back to the default.
fn coerce_strength(raw: Option<f64>) -> f32 {
    match raw {
        Some(value) if value.is_finite() && value != 0.0 => value as f32,
        _ => DEFAULT_STRENGTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_ids_become_string_keys() {
        let raw = r#"{
            "nodes": [{"id": 0, "name": "edge-1"}, {"id": 7, "name": "db"}],
            "connections": [{"source": 0, "target": 7, "strength": 0.25}]
        }"#;
        let response: StatusResponse = serde_json::from_str(raw).unwrap();
        let topology = Topology::from_response(response);

        assert_eq!(topology.nodes[1].id, "7");
        assert_eq!(topology.connections[0].source, "0");
        assert_eq!(topology.connections[0].target, "7");
        assert_eq!(topology.connections[0].strength, 0.25);
        assert_eq!(topology.nodes[1].name, "db");
    }

    #[test]
    fn missing_or_falsy_strength_defaults_to_half() {
        let raw = r#"{
            "nodes": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}],
            "connections": [
                {"source": 1, "target": 2},
                {"source": 2, "target": 1, "strength": 0},
                {"source": 1, "target": 1, "strength": null},
                {"source": 2, "target": 2, "strength": 1}
            ]
        }"#;
        let response: StatusResponse = serde_json::from_str(raw).unwrap();
        let strengths = Topology::from_response(response)
            .connections
            .iter()
            .map(|connection| connection.strength)
            .collect::<Vec<_>>();

        assert_eq!(strengths, vec![0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn empty_body_is_an_empty_topology() {
        let response: StatusResponse = serde_json::from_str("{}").unwrap();
        assert!(Topology::from_response(response).is_empty());
    }
}
