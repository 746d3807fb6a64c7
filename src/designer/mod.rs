//! Graph definition and validation model.
//!
//! A [`Pipeline`] owns a flat arena of [`Node`]s and [`Link`]s. Attaching a
//! node hands back a [`NodeHandle`] (the node's stable position plus the
//! owning pipeline's identity tag); every later operation (linking, routing,
//! setting params) goes through the pipeline with handles, so the graph has
//! no reference cycles and serializes without bookkeeping.
//!
//! ```text
//! Node ──attach──► Pipeline ──link/route/use_output──► Links
//!                      │
//!                  validate()          (pure, re-runnable)
//!                      │
//!                  serialize()         (wire JSON, insertion order)
//! ```
//!
//! Asset-backed nodes resolve their remote spec through an [`AssetResolver`]
//! injected at construction; [`CatalogResolver`] is the in-memory
//! implementation used in tests and offline catalogs.

pub mod asset;
pub mod link;
pub mod node;
pub mod pipeline;
pub mod route;

pub use asset::{AssetResolver, AssetSpec, CatalogResolver, FunctionKind, ParamSpec};
pub use link::{Link, ParamMapping};
pub use node::{AssetFields, DataType, Node, NodeBody, NodeKind, Param, ParamDirection};
pub use pipeline::{NodeHandle, Pipeline};
pub use route::{Route, RouteKind, RouteOperation, RouteValue};
