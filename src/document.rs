//! Prints the generated schema document as SDL. Only the definition kinds
//! the schema builder emits are rendered: the schema block, scalars, input
//! objects and object types.

use async_graphql::parser::types::*;

fn print_schema(schema: &SchemaDefinition) -> String {
    let query = schema
        .query
        .as_ref()
        .map_or(String::new(), |q| format!("  query: {}\n", q.node));
    let mutation = schema
        .mutation
        .as_ref()
        .map_or(String::new(), |m| format!("  mutation: {}\n", m.node));
    format!("schema {{\n{}{}}}\n", query, mutation)
}

fn print_type_def(type_def: &TypeDefinition) -> String {
    match &type_def.kind {
        TypeKind::Scalar => {
            format!("scalar {}\n", type_def.name.node)
        }
        TypeKind::InputObject(input) => {
            format!(
                "input {} {{\n{}\n}}\n",
                type_def.name.node,
                input
                    .fields
                    .iter()
                    .map(|f| print_input_value(&f.node))
                    .collect::<Vec<String>>()
                    .join("\n")
            )
        }
        TypeKind::Object(object) => {
            format!(
                "type {} {{\n{}\n}}\n",
                type_def.name.node,
                object
                    .fields
                    .iter()
                    .map(|f| print_field(&f.node))
                    .collect::<Vec<String>>()
                    .join("\n")
            )
        }
        // The schema builder never emits these.
        TypeKind::Interface(_) | TypeKind::Union(_) | TypeKind::Enum(_) => String::new(),
    }
}

fn print_field(field: &FieldDefinition) -> String {
    let args_str = if !field.arguments.is_empty() {
        let args = field
            .arguments
            .iter()
            .map(|arg| format!("{}: {}", arg.node.name.node, arg.node.ty.node))
            .collect::<Vec<String>>()
            .join(", ");
        format!("({})", args)
    } else {
        String::new()
    };
    format!("  {}{}: {}", field.name.node, args_str, field.ty.node)
}

fn print_input_value(field: &InputValueDefinition) -> String {
    format!("  {}: {}", field.name.node, field.ty.node)
}

/// Renders the document grouped by definition kind: schema, scalars, input
/// objects, then object types, each group in builder order.
pub fn print(document: &ServiceDocument) -> String {
    let definitions_len = document.definitions.len();
    let mut schemas = Vec::with_capacity(definitions_len);
    let mut scalars = Vec::with_capacity(definitions_len);
    let mut inputs = Vec::with_capacity(definitions_len);
    let mut objects = Vec::with_capacity(definitions_len);

    for def in document.definitions.iter() {
        match def {
            TypeSystemDefinition::Schema(schema) => schemas.push(print_schema(&schema.node)),
            TypeSystemDefinition::Type(type_def) => match &type_def.node.kind {
                TypeKind::Scalar => scalars.push(print_type_def(&type_def.node)),
                TypeKind::InputObject(_) => inputs.push(print_type_def(&type_def.node)),
                _ => objects.push(print_type_def(&type_def.node)),
            },
            TypeSystemDefinition::Directive(_) => {}
        }
    }

    schemas
        .into_iter()
        .chain(scalars)
        .chain(inputs)
        .chain(objects)
        .collect::<Vec<String>>()
        .join("\n")
        .trim_end_matches('\n')
        .to_string()
}
