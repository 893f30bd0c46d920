use derive_more::From;

use crate::exposure::Operation;
use crate::projection::ParseError;

/// Failures raised while deriving the schema document from the registry.
/// These abort startup; nothing is served from a partially built schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown value type {0}")]
    UnknownScalar(String),
}

/// Crate-level error, aggregating the build-time and per-request failure
/// modes plus the data-engine boundary.
#[derive(From, thiserror::Error, Debug)]
pub enum Error {
    #[error("schema build failed: {0}")]
    Schema(SchemaError),

    #[error("query parse failed: {0}")]
    Parse(ParseError),

    #[error("unknown root field {0}")]
    #[from(ignore)]
    UnknownRootField(String),

    #[error("{0} is not wired to a data engine")]
    #[from(ignore)]
    Unimplemented(Operation),

    #[error("data engine error: {0}")]
    Engine(anyhow::Error),
}

pub type Result<A> = std::result::Result<A, Error>;
