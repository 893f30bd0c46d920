use convert_case::{Case, Casing};
use indexmap::IndexMap;
use tracing::debug;

use crate::model::{FieldDescriptor, ModelDescriptor, PK_DIRECTIVE};

/// A field descriptor enriched with the schema-facing metadata derived at
/// registry construction time.
#[derive(Debug, Clone)]
pub struct RegisteredField {
    descriptor: FieldDescriptor,
    exposed_name: String,
    is_primary_key: bool,
}

impl RegisteredField {
    fn register(descriptor: FieldDescriptor) -> Self {
        let exposed_name = descriptor.name.to_case(Case::Snake);
        let is_primary_key = descriptor.has_directive(PK_DIRECTIVE);
        Self { descriptor, exposed_name, is_primary_key }
    }

    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// The name the field carries in engine rows and projections.
    pub fn underlying_name(&self) -> &str {
        &self.descriptor.name
    }

    /// The name the field carries in the generated schema.
    pub fn exposed_name(&self) -> &str {
        &self.exposed_name
    }

    /// Scalar tag or the underlying name of another model.
    pub fn type_of(&self) -> &str {
        &self.descriptor.type_of
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }
}

/// A model admitted into the registry. Immutable after construction and
/// shared read-only by the schema builder and both projection parsers.
#[derive(Debug, Clone)]
pub struct RegisteredModel {
    underlying_name: String,
    exposed_name: String,
    fields: Vec<RegisteredField>,
    by_exposed: IndexMap<String, usize>,
    by_underlying: IndexMap<String, usize>,
    primary_key: Vec<usize>,
}

impl RegisteredModel {
    fn register(descriptor: ModelDescriptor) -> Self {
        let exposed_name = descriptor.name.to_case(Case::Snake);
        let fields: Vec<RegisteredField> = descriptor
            .fields
            .into_iter()
            .map(RegisteredField::register)
            .collect();

        let mut by_exposed = IndexMap::with_capacity(fields.len());
        let mut by_underlying = IndexMap::with_capacity(fields.len());
        let mut primary_key = Vec::new();
        for (index, field) in fields.iter().enumerate() {
            by_exposed.insert(field.exposed_name().to_string(), index);
            by_underlying.insert(field.underlying_name().to_string(), index);
            if field.is_primary_key() {
                primary_key.push(index);
            }
        }

        Self {
            underlying_name: descriptor.name,
            exposed_name,
            fields,
            by_exposed,
            by_underlying,
            primary_key,
        }
    }

    pub fn underlying_name(&self) -> &str {
        &self.underlying_name
    }

    pub fn exposed_name(&self) -> &str {
        &self.exposed_name
    }

    pub fn fields(&self) -> &[RegisteredField] {
        &self.fields
    }

    pub fn primary_key_fields(&self) -> impl Iterator<Item = &RegisteredField> {
        self.primary_key.iter().map(|index| &self.fields[*index])
    }

    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }

    pub fn field_by_exposed(&self, name: &str) -> Option<&RegisteredField> {
        self.by_exposed.get(name).map(|index| &self.fields[*index])
    }

    pub fn field_by_underlying(&self, name: &str) -> Option<&RegisteredField> {
        self.by_underlying.get(name).map(|index| &self.fields[*index])
    }
}

/// Read-optimized index over every exposed model, built once at startup.
/// Models without a primary key are silently dropped; omission is the only
/// failure signal the registry emits.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    models: Vec<RegisteredModel>,
    by_underlying: IndexMap<String, usize>,
    by_exposed: IndexMap<String, usize>,
}

impl Registry {
    pub fn build(descriptors: Vec<ModelDescriptor>) -> Self {
        let mut models = Vec::with_capacity(descriptors.len());
        let mut by_underlying = IndexMap::new();
        let mut by_exposed = IndexMap::new();

        for descriptor in descriptors {
            let model = RegisteredModel::register(descriptor);
            if !model.has_primary_key() {
                debug!(model = model.underlying_name(), "dropping model without a primary key");
                continue;
            }
            let index = models.len();
            by_underlying.insert(model.underlying_name().to_string(), index);
            by_exposed.insert(model.exposed_name().to_string(), index);
            models.push(model);
        }

        debug!(models = models.len(), "model registry built");
        Self { models, by_underlying, by_exposed }
    }

    pub fn models(&self) -> impl Iterator<Item = &RegisteredModel> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Resolves a field's underlying type to the model it references, if any.
    /// `None` means the type is a scalar tag (or names a dropped model, which
    /// the schema builder then rejects as an unknown scalar).
    pub fn model_by_type(&self, underlying_name: &str) -> Option<&RegisteredModel> {
        self.by_underlying
            .get(underlying_name)
            .map(|index| &self.models[*index])
    }

    pub fn model_by_exposed(&self, exposed_name: &str) -> Option<&RegisteredModel> {
        self.by_exposed
            .get(exposed_name)
            .map(|index| &self.models[*index])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::DirectiveInstance;

    fn user_model() -> ModelDescriptor {
        ModelDescriptor::new("UserProfile")
            .field(
                FieldDescriptor::new("id", "uuid")
                    .non_null()
                    .directive(DirectiveInstance::new(PK_DIRECTIVE)),
            )
            .field(FieldDescriptor::new("fullName", "string").non_null())
            .field(FieldDescriptor::new("posts", "Post").collection())
    }

    fn tag_model() -> ModelDescriptor {
        // No pk directive anywhere.
        ModelDescriptor::new("Tag").field(FieldDescriptor::new("label", "string"))
    }

    #[test]
    fn exposed_names_are_snake_cased() {
        let registry = Registry::build(vec![user_model()]);
        let model = registry.model_by_type("UserProfile").unwrap();

        assert_eq!(model.exposed_name(), "user_profile");
        let field = model.field_by_underlying("fullName").unwrap();
        assert_eq!(field.exposed_name(), "full_name");
        assert_eq!(field.underlying_name(), "fullName");
    }

    #[test]
    fn models_without_primary_key_are_dropped() {
        let registry = Registry::build(vec![user_model(), tag_model()]);

        assert_eq!(registry.len(), 1);
        assert!(registry.model_by_type("Tag").is_none());
        assert!(registry.model_by_exposed("tag").is_none());
    }

    #[test]
    fn primary_key_subset_preserves_field_order() {
        let descriptor = ModelDescriptor::new("Membership")
            .field(
                FieldDescriptor::new("userId", "uuid")
                    .non_null()
                    .directive(DirectiveInstance::new(PK_DIRECTIVE)),
            )
            .field(FieldDescriptor::new("role", "string"))
            .field(
                FieldDescriptor::new("groupId", "uuid")
                    .non_null()
                    .directive(DirectiveInstance::new(PK_DIRECTIVE)),
            );

        let registry = Registry::build(vec![descriptor]);
        let model = registry.model_by_exposed("membership").unwrap();
        let pk: Vec<&str> = model
            .primary_key_fields()
            .map(|f| f.underlying_name())
            .collect();

        assert_eq!(pk, vec!["userId", "groupId"]);
    }

    #[test]
    fn field_lookup_goes_both_ways() {
        let registry = Registry::build(vec![user_model()]);
        let model = registry.model_by_exposed("user_profile").unwrap();

        assert!(model.field_by_exposed("full_name").is_some());
        assert!(model.field_by_exposed("fullName").is_none());
        assert!(model.field_by_underlying("fullName").is_some());
        assert!(model.field_by_underlying("full_name").is_none());
    }
}
