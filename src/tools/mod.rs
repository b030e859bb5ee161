//! Catalog tools exposed to the oracle

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{ToolDispatcher, ToolOutcome};
pub use registry::CatalogTool;
