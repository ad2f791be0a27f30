//! Loading schemas that use `@replaces`.
use std::path::Path;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;

use crate::ReplacesOptions;
use crate::error::ReplacesError;

const MARKER_DIRECTIVE_PATH: &str = "replaces_directive.graphql";

/// Definition of the rename marker named `marker_directive`, for schemas that don't declare it
/// themselves.
pub fn replaces_directive_definition(marker_directive: &Name) -> String {
    format!(
        r#"directive @{marker_directive}(
  "The name being replaced."
  name: String!
  "The type being replaced, for fields and arguments whose type was also renamed."
  type: String
  "Whether the old input field was non-nullable."
  wasRequiredBeforeRename: Boolean
  "Whether a zero value of the old input field means it was not set."
  treatZeroAsUnset: Boolean
) on OBJECT | INTERFACE | UNION | ENUM | INPUT_OBJECT | SCALAR | FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION | ENUM_VALUE
"#
    )
}

/// Builds and validates one schema from several source files.
///
/// Extensions without a base definition are adopted, since services routinely extend types they
/// don't own (`extend type User @key(fields: "kaid")`). The definition of the configured marker
/// directive is added unless one of the sources declares it.
pub fn parse_schema<S, P>(
    sources: &[(S, P)],
    options: &ReplacesOptions,
) -> Result<Valid<Schema>, ReplacesError>
where
    S: AsRef<str>,
    P: AsRef<Path>,
{
    let schema = build_schema(sources, None)?;
    if schema
        .directive_definitions
        .contains_key(&options.marker_directive)
    {
        return Ok(schema.validate()?);
    }
    let definition = replaces_directive_definition(&options.marker_directive);
    Ok(build_schema(sources, Some(&definition))?.validate()?)
}

fn build_schema<S, P>(
    sources: &[(S, P)],
    marker_definition: Option<&str>,
) -> Result<Schema, ReplacesError>
where
    S: AsRef<str>,
    P: AsRef<Path>,
{
    let mut builder = Schema::builder().adopt_orphan_extensions();
    if let Some(marker_definition) = marker_definition {
        builder = builder.parse(marker_definition, MARKER_DIRECTIVE_PATH);
    }
    for (source, path) in sources {
        builder = builder.parse(source.as_ref(), path);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;

    use super::*;

    #[test]
    fn adds_the_marker_definition() {
        let schema = parse_schema(
            &[(
                r#"type Query { course: Course } type Course @replaces(name: "Topic") { id: ID }"#,
                "schema.graphql",
            )],
            &ReplacesOptions::default(),
        )
        .expect("valid schema");
        assert!(schema.directive_definitions.contains_key("replaces"));
    }

    #[test]
    fn adds_the_configured_marker_definition() {
        let options = ReplacesOptions {
            marker_directive: name!("renamedFrom"),
            ..ReplacesOptions::default()
        };
        let schema = parse_schema(
            &[(
                r#"type Query { course: Course } type Course @renamedFrom(name: "Topic") { id: ID }"#,
                "schema.graphql",
            )],
            &options,
        )
        .expect("valid schema");
        assert!(schema.directive_definitions.contains_key("renamedFrom"));
        assert!(!schema.directive_definitions.contains_key("replaces"));
    }

    #[test]
    fn keeps_a_declared_marker_definition() {
        let schema = parse_schema(
            &[
                ("directive @replaces(name: String!) on OBJECT", "directives.graphql"),
                (r#"type Query @replaces(name: "Root") { ok: Boolean }"#, "schema.graphql"),
            ],
            &ReplacesOptions::default(),
        )
        .expect("valid schema");
        let definition = schema
            .directive_definitions
            .get("replaces")
            .expect("declared");
        assert_eq!(definition.arguments.len(), 1);
    }

    #[test]
    fn adopts_orphan_extensions() {
        let schema = parse_schema(
            &[
                ("type Query { ok: Boolean }", "query.graphql"),
                ("extend type User { kaid: String }", "user.graphql"),
            ],
            &ReplacesOptions::default(),
        )
        .expect("valid schema");
        assert!(schema.types.contains_key("User"));
    }

    #[test]
    fn reports_invalid_schemas() {
        let error = parse_schema(
            &[("type Query { user: Missing }", "schema.graphql")],
            &ReplacesOptions::default(),
        )
        .expect_err("unknown type");
        assert!(matches!(error, ReplacesError::InvalidGraphQL { .. }));
    }
}
