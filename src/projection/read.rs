use async_graphql::parser::types::{Field, Selection, SelectionSet};
use async_graphql::Variables;
use async_graphql_value::ConstValue;

use super::error::{ParseError, Result};
use super::{FilterNode, FilterValue, ProjectionArgs, ProjectionNode};
use crate::registry::{RegisteredModel, Registry};

/// Protocol meta fields that never reach the data engine.
const META_FIELDS: &[&str] = &["__typename", "__schema", "__type"];

/// Filter combinators recognized on every `bool_exp` input type.
const GROUP_OPERATORS: &[&str] = &["_and", "_or"];

/// Converts a GraphQL read selection into a projection tree. The parser only
/// borrows the registry; every call produces a fresh, request-owned tree.
pub struct ReadParser<'a> {
    registry: &'a Registry,
}

impl<'a> ReadParser<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Parses a root or relation field into an `Expand` node named
    /// `root_name`. Variable substitution happens before any argument is
    /// interpreted.
    pub fn parse_field(
        &self,
        model: &RegisteredModel,
        root_name: &str,
        field: &Field,
        variables: &Variables,
    ) -> Result<ProjectionNode> {
        if field.selection_set.node.items.is_empty() {
            return Err(ParseError::MissingSelectionSet {
                field: root_name.to_string(),
            });
        }

        let args = self.parse_args(model, field, variables)?;
        let fields = self.parse_selection_set(model, &field.selection_set.node, variables)?;
        Ok(ProjectionNode::expand(root_name, args, fields))
    }

    fn parse_selection_set(
        &self,
        model: &RegisteredModel,
        selection_set: &SelectionSet,
        variables: &Variables,
    ) -> Result<Vec<ProjectionNode>> {
        let mut output = Vec::with_capacity(selection_set.items.len());
        for selection in &selection_set.items {
            if let Selection::Field(field) = &selection.node {
                if META_FIELDS.contains(&field.node.name.node.as_str()) {
                    continue;
                }
            }
            output.push(self.parse_selection(model, &selection.node, variables)?);
        }
        Ok(output)
    }

    fn parse_selection(
        &self,
        model: &RegisteredModel,
        selection: &Selection,
        variables: &Variables,
    ) -> Result<ProjectionNode> {
        let Selection::Field(field) = selection else {
            return Err(ParseError::UnsupportedSelection {
                model: model.exposed_name().to_string(),
            });
        };

        let name = field.node.name.node.as_str();
        let registered = model.field_by_exposed(name).ok_or_else(|| {
            ParseError::UnknownField {
                model: model.exposed_name().to_string(),
                field: name.to_string(),
            }
        })?;

        if field.node.selection_set.node.items.is_empty() {
            return Ok(ProjectionNode::leaf(registered.underlying_name()));
        }

        // A nested selection marks a relation. Falling back to the current
        // model covers the self/scalar-object case.
        let destination = self
            .registry
            .model_by_type(registered.type_of())
            .unwrap_or(model);
        self.parse_field(
            destination,
            registered.underlying_name(),
            &field.node,
            variables,
        )
    }

    /// Resolves the recognized arguments (`where`, `limit`, `offset`) against
    /// the request variables. Anything else is ignored.
    pub(crate) fn parse_args(
        &self,
        model: &RegisteredModel,
        field: &Field,
        variables: &Variables,
    ) -> Result<ProjectionArgs> {
        let mut args = ProjectionArgs::default();
        for (name, value) in &field.arguments {
            let value = value.node.clone().into_const_with(|variable| {
                variables.get(&variable).cloned().ok_or_else(|| {
                    ParseError::VariableNotFound { name: variable.to_string() }
                })
            })?;
            match name.node.as_str() {
                "where" => args.filter = Some(self.parse_where(model, &value)?),
                "limit" => args.limit = as_paging(&value),
                "offset" => args.offset = as_paging(&value),
                _ => {}
            }
        }
        Ok(args)
    }

    /// Walks a filter object, renaming keys to underlying field names and
    /// recursing into relations. Leaf operator objects pass through verbatim.
    fn parse_where(&self, model: &RegisteredModel, value: &ConstValue) -> Result<FilterNode> {
        let ConstValue::Object(object) = value else {
            return Err(ParseError::MalformedFilter {
                model: model.exposed_name().to_string(),
            });
        };

        let mut output = FilterNode::default();
        for (key, value) in object {
            let key = key.as_str();
            if GROUP_OPERATORS.contains(&key) {
                let ConstValue::List(items) = value else {
                    return Err(ParseError::MalformedFilter {
                        model: model.exposed_name().to_string(),
                    });
                };
                let group = items
                    .iter()
                    .map(|item| self.parse_where(model, item))
                    .collect::<Result<Vec<_>>>()?;
                output.insert(key, FilterValue::Group(group));
                continue;
            }

            let registered = model.field_by_exposed(key).ok_or_else(|| {
                ParseError::UnknownField {
                    model: model.exposed_name().to_string(),
                    field: key.to_string(),
                }
            })?;

            match self.registry.model_by_type(registered.type_of()) {
                Some(destination) => output.insert(
                    registered.underlying_name(),
                    FilterValue::Relation(self.parse_where(destination, value)?),
                ),
                None => output.insert(
                    registered.underlying_name(),
                    FilterValue::Opaque(value.clone()),
                ),
            }
        }
        Ok(output)
    }
}

fn as_paging(value: &ConstValue) -> Option<u64> {
    let paging = match value {
        ConstValue::Number(number) => number.as_u64(),
        _ => None,
    };
    if paging.is_none() {
        tracing::debug!(%value, "dropping unusable paging argument");
    }
    paging
}

#[cfg(test)]
mod tests {
    use async_graphql::parser::types::DocumentOperations;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{DirectiveInstance, FieldDescriptor, ModelDescriptor, PK_DIRECTIVE};

    fn registry() -> Registry {
        Registry::build(vec![
            ModelDescriptor::new("User")
                .field(
                    FieldDescriptor::new("id", "uuid")
                        .non_null()
                        .directive(DirectiveInstance::new(PK_DIRECTIVE)),
                )
                .field(FieldDescriptor::new("fullName", "string").non_null())
                .field(FieldDescriptor::new("age", "int"))
                .field(FieldDescriptor::new("posts", "Post").collection()),
            ModelDescriptor::new("Post")
                .field(
                    FieldDescriptor::new("id", "uuid")
                        .non_null()
                        .directive(DirectiveInstance::new(PK_DIRECTIVE)),
                )
                .field(FieldDescriptor::new("title", "string").non_null())
                .field(FieldDescriptor::new("author", "User")),
        ])
    }

    fn first_field(query: &str) -> Field {
        let document = async_graphql::parser::parse_query(query).unwrap();
        let operation = match &document.operations {
            DocumentOperations::Single(operation) => &operation.node,
            DocumentOperations::Multiple(operations) => {
                &operations.values().next().unwrap().node
            }
        };
        match &operation.selection_set.node.items[0].node {
            Selection::Field(field) => field.node.clone(),
            _ => panic!("expected a field selection"),
        }
    }

    fn parse(query: &str, variables: Variables) -> Result<ProjectionNode> {
        let registry = registry();
        let model = registry.model_by_exposed("user").unwrap();
        let field = first_field(query);
        ReadParser::new(&registry).parse_field(model, "user", &field, &variables)
    }

    #[test]
    fn scalar_selection_round_trips_to_underlying_names() {
        let projection = parse("{ user { full_name age } }", Variables::default()).unwrap();

        assert_eq!(
            projection,
            ProjectionNode::expand(
                "user",
                ProjectionArgs::default(),
                vec![ProjectionNode::leaf("fullName"), ProjectionNode::leaf("age")],
            )
        );
    }

    #[test]
    fn meta_fields_are_skipped() {
        let projection =
            parse("{ user { __typename full_name } }", Variables::default()).unwrap();

        let ProjectionNode::Expand { fields, .. } = projection else {
            panic!("expected an expand node");
        };
        assert_eq!(fields, vec![ProjectionNode::leaf("fullName")]);
    }

    #[test]
    fn relation_selection_resolves_against_the_related_model() {
        let projection = parse(
            "{ user { full_name posts { title author { age } } } }",
            Variables::default(),
        )
        .unwrap();

        assert_eq!(
            projection,
            ProjectionNode::expand(
                "user",
                ProjectionArgs::default(),
                vec![
                    ProjectionNode::leaf("fullName"),
                    ProjectionNode::expand(
                        "posts",
                        ProjectionArgs::default(),
                        vec![
                            ProjectionNode::leaf("title"),
                            ProjectionNode::expand(
                                "author",
                                ProjectionArgs::default(),
                                vec![ProjectionNode::leaf("age")],
                            ),
                        ],
                    ),
                ],
            )
        );
    }

    #[test]
    fn where_operator_objects_are_forwarded_verbatim() {
        let projection = parse(
            "{ user(where: {full_name: {_eq: \"ada\"}}) { age } }",
            Variables::default(),
        )
        .unwrap();

        let ProjectionNode::Expand { args, .. } = projection else {
            panic!("expected an expand node");
        };
        let filter = args.filter.unwrap();
        assert_eq!(
            filter.get("fullName"),
            Some(&FilterValue::Opaque(
                ConstValue::from_json(json!({"_eq": "ada"})).unwrap()
            ))
        );
    }

    #[test]
    fn where_relations_recurse_into_the_related_filter() {
        let projection = parse(
            "{ user(where: {posts: {title: {_eq: \"x\"}}}) { age } }",
            Variables::default(),
        )
        .unwrap();

        let ProjectionNode::Expand { args, .. } = projection else {
            panic!("expected an expand node");
        };
        let filter = args.filter.unwrap();
        let Some(FilterValue::Relation(nested)) = filter.get("posts") else {
            panic!("expected a relation filter");
        };
        assert_eq!(
            nested.get("title"),
            Some(&FilterValue::Opaque(
                ConstValue::from_json(json!({"_eq": "x"})).unwrap()
            ))
        );
    }

    #[test]
    fn group_operators_keep_their_key_and_model_context() {
        let projection = parse(
            "{ user(where: {_or: [{age: {_eq: 1}}, {age: {_eq: 2}}]}) { age } }",
            Variables::default(),
        )
        .unwrap();

        let ProjectionNode::Expand { args, .. } = projection else {
            panic!("expected an expand node");
        };
        let filter = args.filter.unwrap();
        let Some(FilterValue::Group(group)) = filter.get("_or") else {
            panic!("expected a filter group");
        };
        assert_eq!(group.len(), 2);
        assert_eq!(
            group[0].get("age"),
            Some(&FilterValue::Opaque(
                ConstValue::from_json(json!({"_eq": 1})).unwrap()
            ))
        );
    }

    #[test]
    fn variables_substitute_before_interpretation() {
        let variables = Variables::from_json(json!({
            "w": {"full_name": {"_eq": "ada"}},
            "n": 10,
        }));
        let projection = parse(
            "query ($w: user_bool_exp, $n: Int) { user(where: $w, limit: $n, offset: 5) { age } }",
            variables,
        )
        .unwrap();

        let ProjectionNode::Expand { args, .. } = projection else {
            panic!("expected an expand node");
        };
        assert_eq!(args.limit, Some(10));
        assert_eq!(args.offset, Some(5));
        assert!(args.filter.unwrap().get("fullName").is_some());
    }

    #[test]
    fn missing_variable_is_a_parse_error() {
        let error = parse(
            "query ($w: user_bool_exp) { user(where: $w) { age } }",
            Variables::default(),
        )
        .unwrap_err();

        assert_eq!(error, ParseError::VariableNotFound { name: "w".to_string() });
    }

    #[test]
    fn unknown_field_aborts_the_whole_query() {
        let error = parse("{ user { full_name nickname } }", Variables::default()).unwrap_err();

        assert_eq!(
            error,
            ParseError::UnknownField {
                model: "user".to_string(),
                field: "nickname".to_string(),
            }
        );
    }

    #[test]
    fn fragment_selections_are_unsupported() {
        let error = parse(
            "{ user { ...parts } } fragment parts on user { age }",
            Variables::default(),
        )
        .unwrap_err();

        assert_eq!(error, ParseError::UnsupportedSelection { model: "user".to_string() });
    }

    #[test]
    fn root_field_without_a_selection_set_is_rejected() {
        let error = parse("{ user }", Variables::default()).unwrap_err();

        assert_eq!(error, ParseError::MissingSelectionSet { field: "user".to_string() });
    }

    #[test]
    fn negative_paging_values_are_dropped() {
        let projection = parse(
            "{ user(limit: -1, offset: 3) { age } }",
            Variables::default(),
        )
        .unwrap();

        let ProjectionNode::Expand { args, .. } = projection else {
            panic!("expected an expand node");
        };
        assert_eq!(args.limit, None);
        assert_eq!(args.offset, Some(3));
    }

    #[test]
    fn unrecognized_arguments_are_ignored() {
        let projection = parse(
            "{ user(order_by: {age: \"asc\"}) { age } }",
            Variables::default(),
        )
        .unwrap();

        let ProjectionNode::Expand { args, .. } = projection else {
            panic!("expected an expand node");
        };
        assert!(args.is_empty());
    }
}
