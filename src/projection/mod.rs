mod aggregate;
mod error;
mod read;

use async_graphql_value::ConstValue;
use indexmap::IndexMap;
use serde::Serialize;

pub use aggregate::AggregateParser;
pub use error::{ParseError, Result};
pub use read::ReadParser;

/// Engine-agnostic description of what a query requests. Nodes carry
/// underlying names; exposed names never leak past the parsers.
/// Serializable so engines behind a wire can take projections as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionNode {
    /// A scalar field to fetch.
    Leaf { name: String },
    /// A relation or root query with its own nested selection.
    Expand {
        name: String,
        args: ProjectionArgs,
        fields: Vec<ProjectionNode>,
    },
}

impl ProjectionNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::Leaf { name: name.into() }
    }

    pub fn expand(
        name: impl Into<String>,
        args: ProjectionArgs,
        fields: Vec<ProjectionNode>,
    ) -> Self {
        Self::Expand { name: name.into(), args, fields }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Leaf { name } | Self::Expand { name, .. } => name,
        }
    }

    /// Overrides the node name. The exposure layer uses this to replace the
    /// exposed root name with the model's underlying name before dispatch.
    pub fn rename(&mut self, new_name: impl Into<String>) {
        match self {
            Self::Leaf { name } | Self::Expand { name, .. } => *name = new_name.into(),
        }
    }
}

/// Resolved root/relation arguments. Paging values that are not integers are
/// dropped here; the GraphQL layer has already validated them against `Int`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectionArgs {
    pub filter: Option<FilterNode>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ProjectionArgs {
    pub fn is_empty(&self) -> bool {
        self.filter.is_none() && self.limit.is_none() && self.offset.is_none()
    }
}

/// A filter tree keyed by underlying field names, plus the `_and`/`_or`
/// combinators. Leaf operator objects are opaque to this layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterNode(IndexMap<String, FilterValue>);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A nested filter on a related model.
    Relation(FilterNode),
    /// `_and` / `_or`: a list of sibling filters on the same model.
    Group(Vec<FilterNode>),
    /// An operator object or scalar, forwarded verbatim to the data engine.
    Opaque(ConstValue),
}

impl FilterNode {
    pub fn insert(&mut self, name: impl Into<String>, value: FilterValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FilterValue)> for FilterNode {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
