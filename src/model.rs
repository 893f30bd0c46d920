use async_graphql_value::ConstValue;
use indexmap::IndexMap;

/// Directive marking a field as part of the model's primary key.
pub const PK_DIRECTIVE: &str = "pk";

/// Directive marking a field as carrying a server-side default value.
pub const DEFAULT_DIRECTIVE: &str = "default";

/// Argument on the `pk` directive signalling that the key is generated by
/// the data engine and must never be supplied on insert.
pub const GENERATED_ARG: &str = "generated";

/// A directive attached to a field descriptor, e.g. `pk(generated: true)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveInstance {
    pub name: String,
    pub args: IndexMap<String, ConstValue>,
}

impl DirectiveInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), args: IndexMap::new() }
    }

    pub fn arg(mut self, name: impl Into<String>, value: ConstValue) -> Self {
        self.args.insert(name.into(), value);
        self
    }

    /// True when the named argument is present and set to `true`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.args.get(name), Some(ConstValue::Boolean(true)))
    }
}

/// Engine-agnostic description of a single field, as handed over by the
/// model source. `type_of` is either a scalar tag (`"string"`, `"int"`, ...)
/// or the underlying name of another model.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_of: String,
    pub non_null: bool,
    pub collection: bool,
    pub directives: Vec<DirectiveInstance>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_of: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_of: type_of.into(),
            non_null: false,
            collection: false,
            directives: Vec::new(),
        }
    }

    pub fn non_null(mut self) -> Self {
        self.non_null = true;
        self
    }

    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    pub fn directive(mut self, directive: DirectiveInstance) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn directive_named(&self, name: &str) -> Option<&DirectiveInstance> {
        self.directives.iter().find(|d| d.name == name)
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directive_named(name).is_some()
    }
}

/// Engine-agnostic description of a model, as handed over by the model
/// source. Field order is preserved all the way into the generated schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}
