//! # modelflow
//!
//! A typed client for remote AI pipeline platforms: build a directed graph
//! of computation nodes, validate it, serialize it to the backend's wire
//! format, submit it, and watch it to completion through asynchronous
//! polling.
//!
//! ## Core Concepts
//!
//! - **[`Pipeline`]** -- the graph container. Owns all nodes and links,
//!   assigns stable positions, validates completeness, and renders the wire
//!   JSON.
//! - **[`Node`]** -- a typed vertex: data inputs, remote AI assets, scripts,
//!   routers/decisions, outputs. Asset nodes resolve their params through an
//!   injected [`AssetResolver`](designer::AssetResolver).
//! - **[`ExecutionClient`]** -- submits a serialized graph (or a direct asset
//!   invocation), then drives the poll loop: adaptive backoff (×1.1 up to
//!   60 s), a hard timeout, and typed terminal outcomes.
//! - **[`classify`]** -- pure mapping of HTTP statuses and transport failures
//!   onto a closed [`ErrorKind`] taxonomy; retryability is a property of the
//!   kind.
//!
//! ## Quick Start
//!
//! ```no_run
//! use modelflow::designer::{AssetSpec, CatalogResolver, DataType, Pipeline};
//! use modelflow::{ExecutionClient, PollSchedule};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = CatalogResolver::new().with(
//!         AssetSpec::new("6239efa4822d7a13b8e20454", "translation")
//!             .with_input("text", Some(DataType::Text), true)
//!             .with_output("data", Some(DataType::Text)),
//!     );
//!
//!     let mut pipeline = Pipeline::new();
//!     let input = pipeline.input()?;
//!     let model = pipeline.asset(&catalog, "6239efa4822d7a13b8e20454")?;
//!     pipeline.link(input, model)?;
//!     pipeline.use_output(model, "data")?;
//!     pipeline.validate()?;
//!
//!     let client = ExecutionClient::builder("https://platform.example.com", "team-api-key")
//!         .build();
//!     let outcome = client
//!         .run_pipeline(&mut pipeline, json!("the sky is blue"), &PollSchedule::pipeline())
//!         .await?;
//!     println!("{:?}: {:?}", outcome.status, outcome.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Graph-construction problems are [`DesignError`]s raised at the offending
//! call. Execution problems never panic and never raise past the client:
//! they land in the returned [`RunOutcome`] as a terminal status plus a
//! classified [`PlatformError`], so callers branch on
//! [`RunOutcome::status`] without error plumbing.

pub mod classifier;
pub mod client;
pub mod designer;
pub mod error;
pub mod events;
pub mod execution;
pub mod response;
pub mod retry;

pub use classifier::{classify, classify_transport, ErrorKind, PlatformError};
pub use client::{ClientBuilder, ExecutionClient};
pub use designer::{DataType, Node, NodeHandle, NodeKind, Pipeline};
pub use error::{DesignError, Result};
pub use events::{EventHandler, FnEventHandler, RunEvent};
pub use execution::{HttpTransport, MockTransport, PollSchedule, Transport};
pub use response::{PollResponse, RunOutcome, RunStatus};
pub use retry::RetryPolicy;
