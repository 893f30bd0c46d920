use crate::error::SchemaError;

/// Custom scalars the data engine serializes itself. Always declared in the
/// generated document, whether or not any model uses them.
pub const CUSTOM_SCALARS: &[&str] = &["Date", "Buffer"];

/// Maps an engine scalar tag to its GraphQL type name. The table is closed:
/// anything outside it is fatal at schema-build time.
pub fn to_graphql_type(tag: &str) -> Result<&'static str, SchemaError> {
    match tag {
        "string" => Ok("String"),
        "boolean" => Ok("Boolean"),
        "uuid" => Ok("ID"),
        "int" => Ok("Int"),
        "float" => Ok("Float"),
        "date" => Ok("Date"),
        "buffer" => Ok("Buffer"),
        other => Err(SchemaError::UnknownScalar(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mapping_is_total_over_the_closed_table() {
        let table = [
            ("string", "String"),
            ("boolean", "Boolean"),
            ("uuid", "ID"),
            ("int", "Int"),
            ("float", "Float"),
            ("date", "Date"),
            ("buffer", "Buffer"),
        ];
        for (tag, expected) in table {
            assert_eq!(to_graphql_type(tag).unwrap(), expected);
        }
    }

    #[test]
    fn anything_outside_the_table_is_rejected() {
        assert_eq!(
            to_graphql_type("decimal"),
            Err(SchemaError::UnknownScalar("decimal".to_string()))
        );
        // Exposed GraphQL names are not valid engine tags.
        assert!(to_graphql_type("String").is_err());
        assert!(to_graphql_type("").is_err());
    }
}
