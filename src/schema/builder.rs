use async_graphql::parser::types::*;
use async_graphql::{Pos, Positioned};
use async_graphql_value::Name;

use crate::error::SchemaError;
use crate::model::{DEFAULT_DIRECTIVE, GENERATED_ARG, PK_DIRECTIVE};
use crate::registry::{RegisteredField, RegisteredModel, Registry};
use crate::scalar;

fn pos<A>(a: A) -> Positioned<A> {
    Positioned::new(a, Pos::default())
}

fn type_ref(name: &str, nullable: bool) -> Type {
    Type { nullable, base: BaseType::Named(Name::new(name)) }
}

fn list_of(inner: Type, nullable: bool) -> Type {
    Type { nullable, base: BaseType::List(Box::new(inner)) }
}

/// Mirrors the descriptor's collection/nullable flags onto a named type:
/// the list wrapper (when present) keeps a nullable element type, and
/// non-null applies outermost.
fn wrap(name: &str, non_null: bool, collection: bool) -> Type {
    if collection {
        list_of(type_ref(name, true), !non_null)
    } else {
        type_ref(name, !non_null)
    }
}

fn input_value(name: &str, ty: Type) -> Positioned<InputValueDefinition> {
    pos(InputValueDefinition {
        description: None,
        name: pos(Name::new(name)),
        ty: pos(ty),
        default_value: None,
        directives: Vec::new(),
    })
}

fn field_def(
    name: &str,
    arguments: Vec<Positioned<InputValueDefinition>>,
    ty: Type,
) -> Positioned<FieldDefinition> {
    pos(FieldDefinition {
        description: None,
        name: pos(Name::new(name)),
        arguments,
        ty: pos(ty),
        directives: Vec::new(),
    })
}

fn object_def(name: String, fields: Vec<Positioned<FieldDefinition>>) -> TypeSystemDefinition {
    TypeSystemDefinition::Type(pos(TypeDefinition {
        extend: false,
        description: None,
        name: pos(Name::new(name)),
        directives: Vec::new(),
        kind: TypeKind::Object(ObjectType { implements: Vec::new(), fields }),
    }))
}

fn input_def(name: String, fields: Vec<Positioned<InputValueDefinition>>) -> TypeSystemDefinition {
    TypeSystemDefinition::Type(pos(TypeDefinition {
        extend: false,
        description: None,
        name: pos(Name::new(name)),
        directives: Vec::new(),
        kind: TypeKind::InputObject(InputObjectType { fields }),
    }))
}

fn scalar_def(name: &str) -> TypeSystemDefinition {
    TypeSystemDefinition::Type(pos(TypeDefinition {
        extend: false,
        description: None,
        name: pos(Name::new(name)),
        directives: Vec::new(),
        kind: TypeKind::Scalar,
    }))
}

/// Derives the full schema document from the registry. Pure and
/// deterministic given registry order; the only failure mode is a field
/// whose underlying type is neither a known scalar tag nor a registered
/// model.
pub fn build(registry: &Registry) -> Result<ServiceDocument, SchemaError> {
    let mut definitions = Vec::new();

    definitions.push(TypeSystemDefinition::Schema(pos(SchemaDefinition {
        extend: false,
        directives: Vec::new(),
        query: Some(pos(Name::new("Query"))),
        mutation: Some(pos(Name::new("Mutation"))),
        subscription: None,
    })));

    for name in scalar::CUSTOM_SCALARS.iter().copied() {
        definitions.push(scalar_def(name));
    }

    for model in registry.models() {
        definitions.push(object_type(registry, model)?);
        definitions.push(bool_exp(registry, model));
        definitions.push(aggregate_type(model));
        definitions.push(aggregate_result_type(model));
        definitions.push(generic_input(registry, model)?);
        definitions.push(insert_input(registry, model)?);
        definitions.push(mutation_response(model));
        definitions.push(set_input(registry, model)?);
        definitions.push(pk_columns_input(registry, model)?);

        for field in model.fields() {
            if registry.model_by_type(field.type_of()).is_none() {
                definitions.push(column_exp(model, field)?);
            }
        }
    }

    definitions.push(query_root(registry)?);
    definitions.push(mutation_root(registry)?);

    Ok(ServiceDocument { definitions })
}

/// Resolves a field's target type name: the related model's type for the
/// given suffix, or the mapped scalar.
fn target_name(
    registry: &Registry,
    field: &RegisteredField,
    suffix: &str,
) -> Result<String, SchemaError> {
    match registry.model_by_type(field.type_of()) {
        Some(destination) => Ok(format!("{}{}", destination.exposed_name(), suffix)),
        None => Ok(scalar::to_graphql_type(field.type_of())?.to_string()),
    }
}

fn object_type(
    registry: &Registry,
    model: &RegisteredModel,
) -> Result<TypeSystemDefinition, SchemaError> {
    let mut fields = Vec::with_capacity(model.fields().len());
    for field in model.fields() {
        let name = target_name(registry, field, "")?;
        let ty = wrap(&name, field.descriptor().non_null, field.descriptor().collection);
        // Relation fields accept a `where` over the related model.
        let arguments = match registry.model_by_type(field.type_of()) {
            Some(destination) => vec![input_value(
                "where",
                type_ref(&format!("{}_bool_exp", destination.exposed_name()), true),
            )],
            None => Vec::new(),
        };
        fields.push(field_def(field.exposed_name(), arguments, ty));
    }
    Ok(object_def(model.exposed_name().to_string(), fields))
}

fn column_exp_name(model: &RegisteredModel, field: &RegisteredField) -> String {
    format!("{}_{}_column_exp", model.exposed_name(), field.exposed_name())
}

fn column_exp(
    model: &RegisteredModel,
    field: &RegisteredField,
) -> Result<TypeSystemDefinition, SchemaError> {
    let scalar_name = scalar::to_graphql_type(field.type_of())?;
    let fields = vec![
        input_value("_eq", type_ref(scalar_name, true)),
        input_value("_in", list_of(type_ref(scalar_name, true), true)),
        input_value("_nin", list_of(type_ref(scalar_name, true), true)),
    ];
    Ok(input_def(column_exp_name(model, field), fields))
}

fn bool_exp(registry: &Registry, model: &RegisteredModel) -> TypeSystemDefinition {
    let self_name = format!("{}_bool_exp", model.exposed_name());
    let mut fields = vec![
        input_value("_and", list_of(type_ref(&self_name, true), true)),
        input_value("_or", list_of(type_ref(&self_name, true), true)),
    ];
    for field in model.fields() {
        let target = match registry.model_by_type(field.type_of()) {
            Some(destination) => format!("{}_bool_exp", destination.exposed_name()),
            None => column_exp_name(model, field),
        };
        fields.push(input_value(field.exposed_name(), type_ref(&target, true)));
    }
    input_def(self_name, fields)
}

fn aggregate_type(model: &RegisteredModel) -> TypeSystemDefinition {
    let fields = vec![field_def(
        "aggregate",
        Vec::new(),
        type_ref(&format!("{}_aggregate_result", model.exposed_name()), false),
    )];
    object_def(format!("{}_aggregate", model.exposed_name()), fields)
}

fn aggregate_result_type(model: &RegisteredModel) -> TypeSystemDefinition {
    let fields = vec![field_def("count", Vec::new(), type_ref("Int", false))];
    object_def(format!("{}_aggregate_result", model.exposed_name()), fields)
}

fn generic_input(
    registry: &Registry,
    model: &RegisteredModel,
) -> Result<TypeSystemDefinition, SchemaError> {
    let mut fields = Vec::with_capacity(model.fields().len());
    for field in model.fields() {
        let name = target_name(registry, field, "_input")?;
        fields.push(input_value(
            field.exposed_name(),
            wrap(&name, field.descriptor().non_null, field.descriptor().collection),
        ));
    }
    Ok(input_def(format!("{}_input", model.exposed_name()), fields))
}

fn insert_input(
    registry: &Registry,
    model: &RegisteredModel,
) -> Result<TypeSystemDefinition, SchemaError> {
    let mut fields = Vec::with_capacity(model.fields().len());
    for field in model.fields() {
        // Server-generated keys never appear on insert.
        let generated = field
            .descriptor()
            .directive_named(PK_DIRECTIVE)
            .is_some_and(|d| d.flag(GENERATED_ARG));
        if generated {
            continue;
        }
        let name = target_name(registry, field, "_insert_input")?;
        let required =
            field.descriptor().non_null && !field.descriptor().has_directive(DEFAULT_DIRECTIVE);
        fields.push(input_value(
            field.exposed_name(),
            wrap(&name, required, field.descriptor().collection),
        ));
    }
    Ok(input_def(format!("{}_insert_input", model.exposed_name()), fields))
}

fn mutation_response(model: &RegisteredModel) -> TypeSystemDefinition {
    let returning = list_of(type_ref(model.exposed_name(), false), false);
    let fields = vec![
        field_def("affected_rows", Vec::new(), type_ref("Int", false)),
        field_def("returning", Vec::new(), returning),
    ];
    object_def(format!("{}_mutation_response", model.exposed_name()), fields)
}

fn set_input(
    registry: &Registry,
    model: &RegisteredModel,
) -> Result<TypeSystemDefinition, SchemaError> {
    let mut fields = Vec::with_capacity(model.fields().len());
    for field in model.fields() {
        if field.is_primary_key() {
            continue;
        }
        let name = target_name(registry, field, "_set_input")?;
        fields.push(input_value(
            field.exposed_name(),
            wrap(&name, false, field.descriptor().collection),
        ));
    }
    Ok(input_def(format!("{}_set_input", model.exposed_name()), fields))
}

fn pk_columns_input(
    registry: &Registry,
    model: &RegisteredModel,
) -> Result<TypeSystemDefinition, SchemaError> {
    let mut fields = Vec::new();
    for field in model.primary_key_fields() {
        fields.push(pk_argument(registry, field)?);
    }
    Ok(input_def(format!("{}_pk_columns_input", model.exposed_name()), fields))
}

fn pk_argument(
    registry: &Registry,
    field: &RegisteredField,
) -> Result<Positioned<InputValueDefinition>, SchemaError> {
    let name = target_name(registry, field, "_input")?;
    Ok(input_value(
        field.exposed_name(),
        wrap(&name, true, field.descriptor().collection),
    ))
}

fn query_root(registry: &Registry) -> Result<TypeSystemDefinition, SchemaError> {
    let mut fields = Vec::new();
    // The registry only admits models with a primary key, so every model
    // gets the full set of root fields.
    for model in registry.models() {
        let exposed = model.exposed_name();
        let bool_exp = format!("{exposed}_bool_exp");

        fields.push(field_def(
            exposed,
            vec![
                input_value("limit", type_ref("Int", true)),
                input_value("offset", type_ref("Int", true)),
                input_value("where", type_ref(&bool_exp, true)),
            ],
            list_of(type_ref(exposed, true), false),
        ));

        fields.push(field_def(
            &format!("{exposed}_aggregate"),
            vec![input_value("where", type_ref(&bool_exp, true))],
            type_ref(&format!("{exposed}_aggregate"), false),
        ));

        let mut pk_arguments = Vec::new();
        for field in model.primary_key_fields() {
            pk_arguments.push(pk_argument(registry, field)?);
        }
        fields.push(field_def(
            &format!("{exposed}_by_pk"),
            pk_arguments,
            type_ref(exposed, true),
        ));
    }
    Ok(object_def("Query".to_string(), fields))
}

fn mutation_root(registry: &Registry) -> Result<TypeSystemDefinition, SchemaError> {
    let mut fields = Vec::new();
    for model in registry.models() {
        let exposed = model.exposed_name();
        let insert_input = format!("{exposed}_insert_input");
        let set_input = format!("{exposed}_set_input");
        let bool_exp = format!("{exposed}_bool_exp");
        let response = format!("{exposed}_mutation_response");

        fields.push(field_def(
            &format!("insert_{exposed}_one"),
            vec![input_value("object", type_ref(&insert_input, false))],
            type_ref(exposed, false),
        ));

        fields.push(field_def(
            &format!("insert_{exposed}"),
            vec![input_value(
                "objects",
                list_of(type_ref(&insert_input, false), false),
            )],
            type_ref(&response, false),
        ));

        fields.push(field_def(
            &format!("update_{exposed}"),
            vec![
                input_value("_set", type_ref(&set_input, false)),
                input_value("where", type_ref(&bool_exp, false)),
            ],
            type_ref(&response, false),
        ));

        fields.push(field_def(
            &format!("delete_{exposed}"),
            vec![input_value("where", type_ref(&bool_exp, false))],
            type_ref(&response, false),
        ));

        fields.push(field_def(
            &format!("update_{exposed}_by_pk"),
            vec![
                input_value("_set", type_ref(&set_input, false)),
                input_value(
                    "pk_columns",
                    type_ref(&format!("{exposed}_pk_columns_input"), false),
                ),
            ],
            type_ref(exposed, false),
        ));

        let mut pk_arguments = Vec::new();
        for field in model.primary_key_fields() {
            pk_arguments.push(pk_argument(registry, field)?);
        }
        fields.push(field_def(
            &format!("delete_{exposed}_by_pk"),
            pk_arguments,
            type_ref(exposed, false),
        ));
    }
    Ok(object_def("Mutation".to_string(), fields))
}
