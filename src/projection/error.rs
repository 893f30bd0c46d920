/// Per-request parse failures. Any of these aborts the whole query
/// resolution; no partial projection is ever handed to the data engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unsupported selection kind on {model}")]
    UnsupportedSelection { model: String },

    #[error("unknown field {field} on {model}")]
    UnknownField { model: String, field: String },

    #[error("expected the aggregate field, found {found}")]
    ExpectedAggregateField { found: String },

    #[error("field {field} requires a selection set")]
    MissingSelectionSet { field: String },

    #[error("malformed where argument on {model}")]
    MalformedFilter { model: String },

    #[error("variable {name} is not defined")]
    VariableNotFound { name: String },
}

pub type Result<A> = std::result::Result<A, ParseError>;
