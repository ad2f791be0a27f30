//! The new name to old name table consumed by code generators, which write mappers between
//! renamed object types and input conversion for renamed input fields.
use apollo_compiler::Name;
use itertools::Itertools;
use serde::Serialize;

use crate::format::DefinitionKind;
use crate::replacer::Replacer;
use crate::utils::ExtendedTypeExt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameTable {
    /// Renamed object and input object types, by new name.
    pub types: Vec<RenamedType>,
    /// Renamed fields of object and input object types, by type name.
    pub fields: Vec<RenamedFieldGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamedType {
    pub kind: DefinitionKind,
    pub new_name: Name,
    pub old_name: Name,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamedFieldGroup {
    pub type_name: Name,
    pub kind: DefinitionKind,
    /// By new name.
    pub fields: Vec<RenamedField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamedField {
    pub new_name: Name,
    pub old_name: Name,
    pub was_required_before_rename: bool,
    pub treat_zero_as_unset: bool,
}

impl RenameTable {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.fields.is_empty()
    }

    /// Whether any input object field was renamed; those need conversion code.
    pub fn has_input_field_renames(&self) -> bool {
        self.fields
            .iter()
            .any(|group| group.kind == DefinitionKind::InputObject)
    }

    pub(crate) fn from_replacer(replacer: &Replacer<'_>) -> Self {
        let types = replacer
            .definitions()
            .iter()
            .filter(|renamed| has_mappers(renamed.definition.definition_kind()))
            .map(|renamed| RenamedType {
                kind: renamed.definition.definition_kind(),
                new_name: renamed.definition.name().clone(),
                old_name: renamed.old_name.clone(),
            })
            .sorted_by(|a, b| a.new_name.as_str().cmp(b.new_name.as_str()))
            .collect();

        let fields = replacer
            .fields()
            .iter()
            .filter_map(|(type_name, fields)| {
                let kind = replacer.definition_kind(type_name)?;
                if !has_mappers(kind) {
                    return None;
                }
                let fields = fields
                    .iter()
                    .map(|renamed| RenamedField {
                        new_name: renamed.field.name().clone(),
                        old_name: renamed.info.old_name.clone(),
                        was_required_before_rename: renamed.info.was_required_before_rename,
                        treat_zero_as_unset: renamed.info.treat_zero_as_unset,
                    })
                    .sorted_by(|a, b| a.new_name.as_str().cmp(b.new_name.as_str()))
                    .collect();
                Some(RenamedFieldGroup {
                    type_name: type_name.clone(),
                    kind,
                    fields,
                })
            })
            .sorted_by(|a, b| a.type_name.as_str().cmp(b.type_name.as_str()))
            .collect();

        Self { types, fields }
    }
}

fn has_mappers(kind: DefinitionKind) -> bool {
    matches!(kind, DefinitionKind::Object | DefinitionKind::InputObject)
}

