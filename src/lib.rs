//! tabletalk: natural-language Q&A over an enterprise metadata catalog
//!
//! The crate wires three layers together:
//! - `catalog`: a resilient, cached, read-only adapter over the catalog's
//!   HTTP API
//! - `llm`: the reasoning oracle that interprets questions and picks tools
//! - `engine`: the bounded tool-execution loop that produces a final answer
//!   with governance annotations
//!
//! ```no_run
//! use std::sync::Arc;
//! use tabletalk::catalog::{CatalogAdapter, HttpTransport};
//! use tabletalk::config::Config;
//! use tabletalk::engine::AnswerEngine;
//! use tabletalk::llm::AnthropicClient;
//! use tabletalk::tools::ToolDispatcher;
//!
//! # async fn run() -> eyre::Result<()> {
//! let config = Config::load(None)?;
//! let transport = HttpTransport::from_config(&config.catalog)?;
//! let adapter = Arc::new(CatalogAdapter::new(transport, &config.catalog));
//! let llm = Arc::new(AnthropicClient::new(config.oracle.clone())?);
//!
//! let engine = AnswerEngine::new(
//!     llm,
//!     ToolDispatcher::new(adapter),
//!     &config.engine,
//!     config.oracle.max_tokens,
//! );
//! let answer = engine.answer("Who owns the customers table?", &[]).await;
//! println!("{}", answer.text);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod governance;
pub mod llm;
pub mod prompt;
pub mod tools;

pub use catalog::{CatalogAdapter, CatalogError, HttpTransport, MockTransport};
pub use config::Config;
pub use engine::{Answer, AnswerEngine, AnswerOutcome};
pub use error::{Result, TabletalkError};
pub use governance::{GovernanceFlag, GovernanceFlags};
pub use llm::{AnthropicClient, LlmClient, LlmError, MockLlmClient};
pub use prompt::ThreadMessage;
pub use tools::{CatalogTool, ToolDispatcher, ToolOutcome};
