use std::fmt;

use async_graphql::parser::types::{Field, ServiceDocument};
use async_graphql::Variables;
use indexmap::IndexMap;
use tracing::info;

use crate::engine::DataEngine;
use crate::error::{Error, Result, SchemaError};
use crate::model::ModelDescriptor;
use crate::output;
use crate::projection::{AggregateParser, ReadParser};
use crate::registry::{RegisteredModel, Registry};
use crate::{document, schema};

/// The operations the schema surface advertises per model. Only `Read` and
/// `Aggregate` are wired to the data engine; the rest are schema-visible
/// collaborator stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    ReadByPk,
    Aggregate,
    InsertOne,
    InsertMany,
    UpdateMany,
    DeleteMany,
    UpdateByPk,
    DeleteByPk,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::ReadByPk => "read_by_pk",
            Self::Aggregate => "aggregate",
            Self::InsertOne => "insert_one",
            Self::InsertMany => "insert_many",
            Self::UpdateMany => "update_many",
            Self::DeleteMany => "delete_many",
            Self::UpdateByPk => "update_by_pk",
            Self::DeleteByPk => "delete_by_pk",
        };
        f.write_str(name)
    }
}

/// A resolved root Query/Mutation field: which model it addresses and what
/// it does to it.
#[derive(Debug, Clone, Copy)]
pub struct RootField<'a> {
    pub model: &'a RegisteredModel,
    pub operation: Operation,
}

/// The process-wide exposure state: registry, schema document and its SDL,
/// built once at startup and shared read-only afterwards.
pub struct Exposure {
    registry: Registry,
    document: ServiceDocument,
    sdl: String,
    roots: IndexMap<String, (String, Operation)>,
}

impl Exposure {
    pub fn new(models: Vec<ModelDescriptor>) -> std::result::Result<Self, SchemaError> {
        let registry = Registry::build(models);
        let document = schema::build(&registry)?;
        let sdl = document::print(&document);
        let roots = root_index(&registry);
        info!(models = registry.len(), "graphql exposure built");
        Ok(Self { registry, document, sdl, roots })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn document(&self) -> &ServiceDocument {
        &self.document
    }

    pub fn sdl(&self) -> &str {
        &self.sdl
    }

    /// Classifies a root field name against the generated schema surface.
    pub fn root_field(&self, name: &str) -> Option<RootField<'_>> {
        let (exposed, operation) = self.roots.get(name)?;
        let model = self.registry.model_by_exposed(exposed)?;
        Some(RootField { model, operation: *operation })
    }

    /// Resolves any root field: parses, dispatches to the engine for the
    /// wired operations and fails with `Unimplemented` for the rest.
    pub async fn resolve(
        &self,
        engine: &dyn DataEngine,
        field: &Field,
        variables: &Variables,
    ) -> Result<serde_json::Value> {
        let name = field.name.node.as_str();
        let root = self
            .root_field(name)
            .ok_or_else(|| Error::UnknownRootField(name.to_string()))?;
        match root.operation {
            Operation::Read => self.resolve_read(engine, root.model, field, variables).await,
            Operation::Aggregate => {
                self.resolve_aggregate(engine, root.model, field, variables)
                    .await
            }
            other => Err(Error::Unimplemented(other)),
        }
    }

    /// The read path: parse the selection, swap the exposed root name for
    /// the model's underlying name, fetch, then reshape the rows.
    pub async fn resolve_read(
        &self,
        engine: &dyn DataEngine,
        model: &RegisteredModel,
        field: &Field,
        variables: &Variables,
    ) -> Result<serde_json::Value> {
        let mut projection = ReadParser::new(&self.registry).parse_field(
            model,
            model.exposed_name(),
            field,
            variables,
        )?;
        projection.rename(model.underlying_name());
        let rows = engine.read(projection).await.map_err(Error::Engine)?;
        Ok(output::map_output(&self.registry, model, rows))
    }

    /// The aggregate path. Aggregate results carry no model fields, so the
    /// engine's answer passes through unmapped.
    pub async fn resolve_aggregate(
        &self,
        engine: &dyn DataEngine,
        model: &RegisteredModel,
        field: &Field,
        variables: &Variables,
    ) -> Result<serde_json::Value> {
        let projection =
            AggregateParser::new(&self.registry).parse_field(model, field, variables)?;
        engine.read(projection).await.map_err(Error::Engine)
    }
}

/// One entry per generated root field, mapping its name to the model's
/// exposed name and the operation it denotes.
fn root_index(registry: &Registry) -> IndexMap<String, (String, Operation)> {
    let mut roots = IndexMap::new();
    for model in registry.models() {
        let exposed = model.exposed_name().to_string();
        let entries = [
            (exposed.clone(), Operation::Read),
            (format!("{exposed}_aggregate"), Operation::Aggregate),
            (format!("{exposed}_by_pk"), Operation::ReadByPk),
            (format!("insert_{exposed}_one"), Operation::InsertOne),
            (format!("insert_{exposed}"), Operation::InsertMany),
            (format!("update_{exposed}"), Operation::UpdateMany),
            (format!("delete_{exposed}"), Operation::DeleteMany),
            (format!("update_{exposed}_by_pk"), Operation::UpdateByPk),
            (format!("delete_{exposed}_by_pk"), Operation::DeleteByPk),
        ];
        for (name, operation) in entries {
            roots.insert(name, (exposed.clone(), operation));
        }
    }
    roots
}
