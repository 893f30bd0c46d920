//! Exposes generic, declaratively-described data models through a
//! dynamically generated, Hasura-style GraphQL surface.
//!
//! The crate is the bidirectional translation layer between two type
//! systems: at startup the [`Registry`] and the schema builder derive a full
//! SDL document from model descriptors; per request the projection parsers
//! convert GraphQL selections into engine-agnostic [`ProjectionNode`] trees
//! and the output mapper renames engine rows back to exposed names.
//! Transport, model introspection and query execution are collaborators
//! behind the [`DataEngine`] trait.

pub mod document;
pub mod engine;
pub mod error;
pub mod exposure;
pub mod model;
pub mod output;
pub mod projection;
pub mod registry;
pub mod scalar;
pub mod schema;

pub use engine::DataEngine;
pub use error::{Error, Result, SchemaError};
pub use exposure::{Exposure, Operation, RootField};
pub use model::{DirectiveInstance, FieldDescriptor, ModelDescriptor};
pub use projection::{
    AggregateParser, FilterNode, FilterValue, ParseError, ProjectionArgs, ProjectionNode,
    ReadParser,
};
pub use registry::{RegisteredField, RegisteredModel, Registry};
