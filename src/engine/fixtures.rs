use crate::topology::{Connection, Node, Topology};

pub(crate) fn topology(nodes: &[&str], links: &[(&str, &str, f32)]) -> Topology {
    Topology {
        nodes: nodes
            .iter()
            .map(|id| Node {
                id: (*id).to_owned(),
                name: format!("host-{id}"),
            })
            .collect(),
        connections: links
            .iter()
            .map(|(source, target, strength)| Connection {
                source: (*source).to_owned(),
                target: (*target).to_owned(),
                strength: *strength,
            })
            .collect(),
    }
}
