//! Directed edges between node positions.

use serde::{Deserialize, Serialize};

/// One output-param → input-param pairing carried by a link.
///
/// Wire keys are `from`/`to`; the in-memory names stay explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamMapping {
    #[serde(rename = "from")]
    pub from_param: String,
    #[serde(rename = "to")]
    pub to_param: String,
}

/// A directed edge between two node positions.
///
/// An empty `param_mapping` is a full-node pass-through. Links are immutable
/// once created; they live only inside the owning pipeline's link list, in
/// insertion order, and that order is the serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "from")]
    pub from_node: usize,
    #[serde(rename = "to")]
    pub to_node: usize,
    #[serde(rename = "paramMapping", default)]
    pub param_mapping: Vec<ParamMapping>,
}
