mod model;
mod prometheus;
mod query;
mod source;

#[cfg(test)]
pub use model::Node;
pub use model::{Connection, Topology};
pub use query::{Aggregation, StatusQuery, TimeWindow};
pub use source::{DataSource, load_topology};
