use async_graphql::parser::types::{Field, Selection, SelectionSet};
use async_graphql::Variables;

use super::error::{ParseError, Result};
use super::read::ReadParser;
use super::{ProjectionArgs, ProjectionNode};
use crate::registry::{RegisteredModel, Registry};

/// Specialization of the read parser for `m_aggregate` queries. Only count
/// semantics are defined; named aggregators are parsed structurally and left
/// to the data engine to reject or support.
pub struct AggregateParser<'a> {
    registry: &'a Registry,
}

impl<'a> AggregateParser<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Parses an aggregate root field into an `Expand` node already named
    /// with the model's underlying name.
    pub fn parse_field(
        &self,
        model: &RegisteredModel,
        field: &Field,
        variables: &Variables,
    ) -> Result<ProjectionNode> {
        if field.selection_set.node.items.is_empty() {
            return Err(ParseError::MissingSelectionSet {
                field: field.name.node.to_string(),
            });
        }

        let args = ReadParser::new(self.registry).parse_args(model, field, variables)?;
        let fields = self.parse_selection_set(model, &field.selection_set.node)?;
        Ok(ProjectionNode::expand(model.underlying_name(), args, fields))
    }

    fn parse_selection_set(
        &self,
        model: &RegisteredModel,
        selection_set: &SelectionSet,
    ) -> Result<Vec<ProjectionNode>> {
        let mut output = Vec::with_capacity(selection_set.items.len());
        for selection in &selection_set.items {
            let Selection::Field(field) = &selection.node else {
                return Err(ParseError::UnsupportedSelection {
                    model: model.exposed_name().to_string(),
                });
            };
            match field.node.name.node.as_str() {
                "aggregate" => output.push(self.parse_aggregate(model, &field.node)?),
                found => {
                    return Err(ParseError::ExpectedAggregateField {
                        found: found.to_string(),
                    })
                }
            }
        }
        Ok(output)
    }

    fn parse_aggregate(&self, model: &RegisteredModel, field: &Field) -> Result<ProjectionNode> {
        if field.selection_set.node.items.is_empty() {
            return Err(ParseError::MissingSelectionSet {
                field: "aggregate".to_string(),
            });
        }

        let mut fields = Vec::with_capacity(field.selection_set.node.items.len());
        for selection in &field.selection_set.node.items {
            let Selection::Field(inner) = &selection.node else {
                return Err(ParseError::UnsupportedSelection {
                    model: model.exposed_name().to_string(),
                });
            };
            let name = inner.node.name.node.as_str();
            if name == "count" {
                fields.push(ProjectionNode::leaf("count"));
                continue;
            }
            fields.push(self.parse_aggregator(model, name, &inner.node)?);
        }

        Ok(ProjectionNode::expand(
            "aggregate",
            ProjectionArgs::default(),
            fields,
        ))
    }

    /// A named aggregator enumerates model fields to aggregate over. The
    /// names are validated against the model; the aggregator itself is not.
    fn parse_aggregator(
        &self,
        model: &RegisteredModel,
        name: &str,
        field: &Field,
    ) -> Result<ProjectionNode> {
        if field.selection_set.node.items.is_empty() {
            return Err(ParseError::MissingSelectionSet { field: name.to_string() });
        }

        let mut fields = Vec::with_capacity(field.selection_set.node.items.len());
        for selection in &field.selection_set.node.items {
            let Selection::Field(column) = &selection.node else {
                return Err(ParseError::UnsupportedSelection {
                    model: model.exposed_name().to_string(),
                });
            };
            let column_name = column.node.name.node.as_str();
            let registered = model.field_by_exposed(column_name).ok_or_else(|| {
                ParseError::UnknownField {
                    model: model.exposed_name().to_string(),
                    field: column_name.to_string(),
                }
            })?;
            fields.push(ProjectionNode::leaf(registered.underlying_name()));
        }

        Ok(ProjectionNode::expand(
            name,
            ProjectionArgs::default(),
            fields,
        ))
    }
}
