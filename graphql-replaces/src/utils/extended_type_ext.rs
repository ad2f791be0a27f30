use apollo_compiler::schema::ExtendedType;

use crate::format::DefinitionKind;

pub(crate) trait ExtendedTypeExt {
    fn has_extension_elements(&self) -> bool;
    fn has_non_extension_elements(&self) -> bool;
    fn definition_kind(&self) -> DefinitionKind;
    fn description_str(&self) -> Option<&str>;

    /// Whether the type only ever appears in `extend` blocks, i.e. there is no base definition.
    ///
    /// This stands in for an `is_extension` flag on the type: every directive, field, value,
    /// member and implemented interface remembers which definition or extension declared it.
    /// A bodiless base definition (`type Foo`) extended elsewhere also reports `true`.
    fn is_declared_by_extension(&self) -> bool {
        self.has_extension_elements() && !self.has_non_extension_elements()
    }
}

fn has_non_extension_inner_elements(extended_type: &ExtendedType) -> bool {
    match extended_type {
        ExtendedType::Scalar(_) => false,
        ExtendedType::Object(t) => {
            t.implements_interfaces
                .iter()
                .any(|itf| itf.origin.extension_id().is_none())
                || t.fields.values().any(|f| f.origin.extension_id().is_none())
        }
        ExtendedType::Interface(t) => {
            t.implements_interfaces
                .iter()
                .any(|itf| itf.origin.extension_id().is_none())
                || t.fields.values().any(|f| f.origin.extension_id().is_none())
        }
        ExtendedType::Union(t) => t.members.iter().any(|m| m.origin.extension_id().is_none()),
        ExtendedType::Enum(t) => t.values.values().any(|v| v.origin.extension_id().is_none()),
        ExtendedType::InputObject(t) => {
            t.fields.values().any(|f| f.origin.extension_id().is_none())
        }
    }
}

impl ExtendedTypeExt for ExtendedType {
    fn has_extension_elements(&self) -> bool {
        match self {
            ExtendedType::Scalar(scalar) => !scalar.extensions().is_empty(),
            ExtendedType::Object(object) => !object.extensions().is_empty(),
            ExtendedType::Interface(interface) => !interface.extensions().is_empty(),
            ExtendedType::Union(union) => !union.extensions().is_empty(),
            ExtendedType::Enum(enum_type) => !enum_type.extensions().is_empty(),
            ExtendedType::InputObject(input_object) => !input_object.extensions().is_empty(),
        }
    }

    fn has_non_extension_elements(&self) -> bool {
        self.directives()
            .iter()
            .any(|d| d.origin.extension_id().is_none())
            || has_non_extension_inner_elements(self)
    }

    fn definition_kind(&self) -> DefinitionKind {
        match self {
            ExtendedType::Scalar(_) => DefinitionKind::Scalar,
            ExtendedType::Object(_) => DefinitionKind::Object,
            ExtendedType::Interface(_) => DefinitionKind::Interface,
            ExtendedType::Union(_) => DefinitionKind::Union,
            ExtendedType::Enum(_) => DefinitionKind::Enum,
            ExtendedType::InputObject(_) => DefinitionKind::InputObject,
        }
    }

    fn description_str(&self) -> Option<&str> {
        let description = match self {
            ExtendedType::Scalar(t) => &t.description,
            ExtendedType::Object(t) => &t.description,
            ExtendedType::Interface(t) => &t.description,
            ExtendedType::Union(t) => &t.description,
            ExtendedType::Enum(t) => &t.description,
            ExtendedType::InputObject(t) => &t.description,
        };
        description.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::Schema;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::extend_at_beginning("extend type StudentList { kaid: String! }", true)]
    #[case::extend_after_other_definitions(
        "enum ContentKind { ARTICLE VIDEO EXERCISE } extend type StudentList { kaid: String! }",
        true
    )]
    #[case::extend_with_extra_white_space(" extend   type     StudentList { kaid: String! }", true)]
    #[case::extend_directives_only("extend type StudentList @deprecated", true)]
    #[case::no_extend("type StudentList { kaid: String! }", false)]
    #[case::no_extend_after_other_definitions(
        "enum ContentKind { ARTICLE VIDEO EXERCISE } type StudentList { kaid: String! }",
        false
    )]
    #[case::extend_in_comment("#extend\ntype StudentList { kaid: String! }", false)]
    #[case::definition_and_extension(
        "type StudentList { kaid: String! } extend type StudentList { id: ID! }",
        false
    )]
    #[case::extension_before_definition(
        "extend type StudentList { id: ID! } type StudentList { kaid: String! }",
        false
    )]
    fn detects_types_declared_by_extension(#[case] sdl: &str, #[case] expected: bool) {
        let schema = Schema::builder()
            .adopt_orphan_extensions()
            .parse(sdl, "schema.graphql")
            .build()
            .expect("builds");
        let ty = schema.types.get("StudentList").expect("has StudentList");
        assert_eq!(ty.is_declared_by_extension(), expected);
    }

    #[rstest]
    #[case::interface("extend interface CurationNode { kind: String! }")]
    #[case::input_object("extend input CurationNode { kind: String! }")]
    #[case::enum_type("extend enum CurationNode { KIND }")]
    #[case::union_type("type A { a: Int } extend union CurationNode = A")]
    fn detects_extensions_of_every_kind(#[case] sdl: &str) {
        let schema = Schema::builder()
            .adopt_orphan_extensions()
            .parse(sdl, "schema.graphql")
            .build()
            .expect("builds");
        let ty = schema.types.get("CurationNode").expect("has CurationNode");
        assert!(ty.is_declared_by_extension());
    }
}
