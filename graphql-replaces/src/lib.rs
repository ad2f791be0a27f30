//! ## Usage
//!
//! Rename types, fields, arguments and enum values of a GraphQL schema without breaking existing
//! clients. The schema uses the new names, and each renamed element declares the name it replaces:
//!
//! ```graphql
//! type Course {
//!     kaLocale: String @replaces(name: "locale")
//! }
//! ```
//!
//! [`compute_overlay`] then produces SDL to be placed alongside the schema, which adds the old
//! names back as deprecated elements:
//!
//! ```graphql
//! extend type Course {
//!     locale: String @deprecated(reason: "Replaced by kaLocale.") @goField(name: "DeprecatedLocale")
//! }
//! ```
//!
//! Every problem with `@replaces` usages is reported at once; when there is any, no overlay is
//! produced.

#![warn(
    rustdoc::broken_intra_doc_links,
    unreachable_pub,
    unreachable_patterns,
    unused,
    unused_qualifications,
    dead_code,
    while_true,
    unconditional_panic,
    clippy::all
)]

pub mod error;
mod format;
mod marker;
mod renames;
mod replacer;
pub mod schema;
pub(crate) mod utils;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::name;

use crate::error::MultipleReplacesErrors;
pub use crate::format::DefinitionKind;
pub use crate::renames::RenameTable;
pub use crate::renames::RenamedField;
pub use crate::renames::RenamedFieldGroup;
pub use crate::renames::RenamedType;
use crate::replacer::Replacer;
pub use crate::schema::parse_schema;
pub use crate::schema::replaces_directive_definition;

/// Directive names used when reading and writing schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacesOptions {
    /// The rename marker.
    pub marker_directive: Name,
    /// The federation key directive, whose `fields` argument is rewritten when it mentions a
    /// renamed field.
    pub key_directive: Name,
    /// Added to old fields so generated code gets distinct accessor names. `None` leaves it out.
    pub binding_hint: Option<BindingHint>,
}

impl Default for ReplacesOptions {
    fn default() -> Self {
        Self {
            marker_directive: name!("replaces"),
            key_directive: name!("key"),
            binding_hint: Some(BindingHint::default()),
        }
    }
}

/// Applied to every old field as `@directive(argument: "<prefix><OldName>")`, e.g.
/// `@goField(name: "DeprecatedLocale")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingHint {
    pub directive: Name,
    pub argument: Name,
    pub prefix: String,
}

impl Default for BindingHint {
    fn default() -> Self {
        Self {
            directive: name!("goField"),
            argument: name!("name"),
            prefix: "Deprecated".to_owned(),
        }
    }
}

/// Checks every `@replaces` usage in `schema`.
pub fn validate(schema: &Schema, options: ReplacesOptions) -> Result<(), MultipleReplacesErrors> {
    let mut replacer = Replacer::new(options);
    replacer.process_schema(schema);
    replacer.into_errors().into_result(())
}

/// Returns the SDL that adds the old names of everything renamed in `schema`, or an empty string
/// when nothing is.
///
/// The overlay is only computed for schemas without `@replaces` errors; otherwise every error is
/// returned and no overlay is.
pub fn compute_overlay(
    schema: &Schema,
    options: ReplacesOptions,
) -> Result<String, MultipleReplacesErrors> {
    let mut replacer = Replacer::new(options);
    replacer.process_schema(schema);
    if replacer.has_errors() {
        return Err(replacer.into_errors());
    }
    let overlay = replacer.schema_additions();
    replacer.into_errors().into_result(overlay)
}

/// Returns the renamed object and input object types and fields of `schema`, for generating
/// mapping code.
pub fn rename_table(
    schema: &Schema,
    options: ReplacesOptions,
) -> Result<RenameTable, MultipleReplacesErrors> {
    let mut replacer = Replacer::new(options);
    replacer.process_schema(schema);
    if replacer.has_errors() {
        return Err(replacer.into_errors());
    }
    Ok(RenameTable::from_replacer(&replacer))
}

#[cfg(test)]
mod tests {
    use apollo_compiler::Schema;

    use super::*;
    use crate::error::SingleReplacesError;

    fn schema(sdl: &str) -> Schema {
        Schema::parse(sdl, "schema.graphql").expect("parses")
    }

    #[test]
    fn processing_twice_is_an_internal_error() {
        let schema = schema("type Query { ok: Boolean }");
        let mut replacer = Replacer::new(ReplacesOptions::default());
        replacer.process_schema(&schema);
        replacer.process_schema(&schema);
        let errors = replacer.into_errors();
        assert!(errors.has_internal_errors());
        assert_eq!(
            errors.errors,
            vec![SingleReplacesError::Internal {
                message: "process_schema called multiple times".to_owned(),
            }]
        );
    }

    #[test]
    fn synthesis_requires_processing() {
        let mut replacer = Replacer::new(ReplacesOptions::default());
        assert_eq!(replacer.schema_additions(), "");
        assert!(replacer.into_errors().has_internal_errors());
    }

    #[test]
    fn synthesizing_twice_is_an_internal_error() {
        let schema = schema(r#"type Query { ok: Boolean @replaces(name: "okay") }"#);
        let mut replacer = Replacer::new(ReplacesOptions::default());
        replacer.process_schema(&schema);
        assert_ne!(replacer.schema_additions(), "");
        assert_eq!(replacer.schema_additions(), "");
        let errors = replacer.into_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors.has_internal_errors());
    }

    #[test]
    fn uses_configured_directive_names() {
        let schema = schema(
            r#"type Query { ok: Boolean }
            type Course @entity(fields: "id lang") { id: ID lang: String @renamedFrom(name: "kaLocale") }"#,
        );
        let options = ReplacesOptions {
            marker_directive: name!("renamedFrom"),
            key_directive: name!("entity"),
            binding_hint: None,
        };
        assert_eq!(
            compute_overlay(&schema, options).expect("no errors"),
            "extend type Course @entity(fields: \"id kaLocale\") {\n    kaLocale: String @deprecated(reason: \"Replaced by lang.\")\n}\n"
        );
    }
}
