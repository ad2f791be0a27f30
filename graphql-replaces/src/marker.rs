//! Reading `@replaces` directive applications.
//!
//! ```graphql
//! type AwesomelyNamedType @replaces(name: "TerriblyNamedType") {
//!     kaid: String
//!     awesomelyNamedField: AnotherGreatType
//!         @replaces(name: "terriblyNamedField", type: "AnotherNotSoGreatType")
//! }
//! ```
//!
//! Throughout this crate the *old* name is the one being replaced (`TerriblyNamedType`,
//! `terriblyNamedField`), the *old type* is the replaced type of a field or argument
//! (`AnotherNotSoGreatType`), and the *new* names are the ones already in the schema.
use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::Value;

use crate::error::SingleReplacesError;

pub(crate) const NAME_ARGUMENT: &str = "name";
pub(crate) const TYPE_ARGUMENT: &str = "type";
pub(crate) const WAS_REQUIRED_BEFORE_RENAME_ARGUMENT: &str = "wasRequiredBeforeRename";
pub(crate) const TREAT_ZERO_AS_UNSET_ARGUMENT: &str = "treatZeroAsUnset";

/// The arguments of one rename marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReplaceInfo {
    pub(crate) old_name: Name,
    /// Only legal on field and argument markers.
    pub(crate) old_type_name: Option<Name>,
    /// Passed through for downstream mappers; not used by the overlay.
    pub(crate) was_required_before_rename: bool,
    pub(crate) treat_zero_as_unset: bool,
    /// `treatZeroAsUnset` was written out, as opposed to omitted.
    pub(crate) treat_zero_as_unset_present: bool,
}

impl ReplaceInfo {
    /// Extracts the marker from `directive`, the application of the marker directive found on
    /// the element at `coordinate` (if any). `Ok(None)` means the element is not renamed.
    pub(crate) fn from_directive(
        directive: Option<&Node<Directive>>,
        coordinate: &str,
    ) -> Result<Option<Self>, SingleReplacesError> {
        let Some(directive) = directive else {
            return Ok(None);
        };

        // Validation against the directive definition enforces `name: String!`, so reaching this
        // means the schema skipped validation or uses a different definition.
        let Some(old_name) = directive
            .specified_argument_by_name(NAME_ARGUMENT)
            .and_then(|value| value.as_str())
        else {
            return Err(SingleReplacesError::MissingMarkerName {
                directive: directive.name.clone(),
                coordinate: coordinate.to_owned(),
            });
        };
        let old_name = parse_name(&directive.name, coordinate, old_name)?;

        let old_type_name = directive
            .specified_argument_by_name(TYPE_ARGUMENT)
            .and_then(|value| value.as_str())
            .map(|old_type_name| parse_name(&directive.name, coordinate, old_type_name))
            .transpose()?;

        let was_required_before_rename =
            boolean_argument(directive, WAS_REQUIRED_BEFORE_RENAME_ARGUMENT).unwrap_or(false);
        let treat_zero_as_unset = boolean_argument(directive, TREAT_ZERO_AS_UNSET_ARGUMENT);

        Ok(Some(Self {
            old_name,
            old_type_name,
            was_required_before_rename,
            treat_zero_as_unset: treat_zero_as_unset.unwrap_or(false),
            treat_zero_as_unset_present: treat_zero_as_unset.is_some(),
        }))
    }
}

fn parse_name(directive: &Name, coordinate: &str, name: &str) -> Result<Name, SingleReplacesError> {
    Name::new(name).map_err(|_| SingleReplacesError::InvalidOldName {
        directive: directive.clone(),
        coordinate: coordinate.to_owned(),
        name: name.to_owned(),
    })
}

/// `None` when the argument is omitted or explicitly `null`.
fn boolean_argument(directive: &Directive, argument: &str) -> Option<bool> {
    match directive.specified_argument_by_name(argument).map(|value| &**value) {
        Some(Value::Boolean(value)) => Some(*value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::Schema;
    use apollo_compiler::name;

    use super::*;

    fn marker_on_type(sdl: &str) -> Result<Option<ReplaceInfo>, SingleReplacesError> {
        let schema = Schema::parse(sdl, "marker.graphql").expect("parses");
        let ty = schema.types.get("T").expect("has T");
        let directive = ty.directives().get("replaces").map(|d| &d.node);
        ReplaceInfo::from_directive(directive, "T")
    }

    #[test]
    fn absent_marker_is_not_an_error() {
        assert_eq!(marker_on_type("type T { a: Int }"), Ok(None));
    }

    #[test]
    fn reads_every_argument() {
        let info = marker_on_type(
            r#"type T @replaces(name: "Old", type: "OldType", wasRequiredBeforeRename: true, treatZeroAsUnset: false) { a: Int }"#,
        )
        .expect("valid marker")
        .expect("marker present");
        assert_eq!(
            info,
            ReplaceInfo {
                old_name: name!("Old"),
                old_type_name: Some(name!("OldType")),
                was_required_before_rename: true,
                treat_zero_as_unset: false,
                treat_zero_as_unset_present: true,
            }
        );
    }

    #[test]
    fn omitted_treat_zero_as_unset_is_tracked() {
        let info = marker_on_type(r#"type T @replaces(name: "Old") { a: Int }"#)
            .expect("valid marker")
            .expect("marker present");
        assert!(!info.treat_zero_as_unset);
        assert!(!info.treat_zero_as_unset_present);
        assert!(!info.was_required_before_rename);
        assert_eq!(info.old_type_name, None);
    }

    #[test]
    fn missing_name_is_internal() {
        let error = marker_on_type(r#"type T @replaces(type: "Old") { a: Int }"#)
            .expect_err("name is required");
        assert_eq!(
            error,
            SingleReplacesError::MissingMarkerName {
                directive: name!("replaces"),
                coordinate: "T".to_owned(),
            }
        );
    }

    #[test]
    fn rejects_names_that_are_not_graphql_names() {
        let error = marker_on_type(r#"type T @replaces(name: "not a name") { a: Int }"#)
            .expect_err("invalid name");
        assert!(matches!(
            error,
            SingleReplacesError::InvalidOldName { name, .. } if name == "not a name"
        ));
    }
}
