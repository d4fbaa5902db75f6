//! Dataset model and top-N filtering.

mod filter;
mod types;

pub use filter::{FilterParams, filter_nodes};
pub use types::{FloatKey, GraphData, GraphLink, GraphNode, Key};
