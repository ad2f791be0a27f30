//! Rendering of the overlay: old definitions, and extensions that add old fields, enum values,
//! interface implementations and union members.
//!
//! The input schema already uses the new names everywhere. Every stage below sorts by name before
//! rendering so that the overlay only depends on the schema's contents, never on the order types
//! were declared in.
use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::Type;
use apollo_compiler::name;
use apollo_compiler::schema::ExtendedType;
use itertools::Itertools;
use tracing::debug;

use super::FieldRef;
use super::KEY_FIELDS_ARGUMENT;
use super::RenamedDefinition;
use super::RenamedEnumValue;
use super::RenamedField;
use super::Replacer;
use super::ReplacerState;
use crate::error::SingleReplacesError;
use crate::format::DefinitionKind;
use crate::format::OverlayField;
use crate::format::OverlayType;
use crate::format::enum_value_without_directive;
use crate::format::field_without_directive;
use crate::format::input_value_without_directive;
use crate::format::render_overlay;
use crate::format::string_argument_directive;
use crate::format::without_directive;
use crate::utils::ExtendedTypeExt;
use crate::utils::replace_whole_word;

const DEPRECATED_DIRECTIVE: Name = name!("deprecated");
const DEPRECATED_REASON_ARGUMENT: Name = name!("reason");

impl Replacer<'_> {
    /// Returns the overlay: SDL containing the old types and fields, meant to be placed in a
    /// schema file alongside the others.
    ///
    /// Must be called once, after [`Replacer::process_schema`] reported no errors. Misuse is
    /// recorded as an internal error and yields an empty overlay.
    pub(crate) fn schema_additions(&mut self) -> String {
        match self.state {
            ReplacerState::Processed => {}
            ReplacerState::New => {
                self.errors.push(SingleReplacesError::Internal {
                    message: "must call process_schema before schema_additions".to_owned(),
                });
                return String::new();
            }
            ReplacerState::Synthesized => {
                self.errors.push(SingleReplacesError::Internal {
                    message: "schema_additions called multiple times".to_owned(),
                });
                return String::new();
            }
        }
        self.state = ReplacerState::Synthesized;

        let mut additions = Vec::new();
        additions.extend(self.definition_additions());
        additions.extend(self.field_additions());
        additions.extend(self.enum_value_additions());
        additions.extend(self.interface_additions());
        additions.extend(self.union_member_additions());

        debug!(definitions = additions.len(), "rendered overlay");
        render_overlay(additions)
    }

    /// Old definitions, with the new names of their members. Old members are added by the field
    /// and enum value stages, so old and new types end up with the same members.
    fn definition_additions(&self) -> Vec<OverlayType> {
        self.definitions
            .iter()
            .sorted_by(|a, b| a.old_name.as_str().cmp(b.old_name.as_str()))
            .map(|renamed| self.old_definition(renamed))
            .collect()
    }

    fn old_definition(&self, renamed: &RenamedDefinition<'_>) -> OverlayType {
        let marker = &self.options.marker_directive;
        let ty = renamed.definition;
        let mut definition = OverlayType::new(ty.definition_kind(), renamed.old_name.clone());
        definition.extend = ty.is_declared_by_extension();
        definition.description = Some(deprecated_description(
            ty.description_str(),
            &format!("Replaced by {}.", ty.name()),
        ));
        definition.directives =
            without_directive(ty.directives().iter().map(|directive| &directive.node), marker);

        match ty {
            ExtendedType::Object(object) => {
                definition.implements_interfaces = object
                    .implements_interfaces
                    .iter()
                    .map(|interface| interface.name.clone())
                    .collect();
                definition.fields = object
                    .fields
                    .values()
                    .map(|field| field_without_directive(&field.node, marker))
                    .collect();
            }
            ExtendedType::Interface(interface) => {
                definition.implements_interfaces = interface
                    .implements_interfaces
                    .iter()
                    .map(|interface| interface.name.clone())
                    .collect();
                definition.fields = interface
                    .fields
                    .values()
                    .map(|field| field_without_directive(&field.node, marker))
                    .collect();
            }
            ExtendedType::InputObject(input_object) => {
                definition.input_fields = input_object
                    .fields
                    .values()
                    .map(|field| input_value_without_directive(&field.node, marker))
                    .collect();
            }
            ExtendedType::Enum(enum_type) => {
                definition.values = enum_type
                    .values
                    .values()
                    .map(|value| enum_value_without_directive(&value.node, marker))
                    .collect();
            }
            ExtendedType::Union(union) => {
                definition.members = union
                    .members
                    .iter()
                    .map(|member| member.name.clone())
                    .collect();
            }
            ExtendedType::Scalar(_) => {}
        }
        definition
    }

    /// Extensions adding old fields. Renamed types get the extension under both names.
    fn field_additions(&mut self) -> Vec<OverlayType> {
        let mut additions = Vec::new();
        let type_names = self
            .fields
            .keys()
            .sorted_by(|a, b| a.as_str().cmp(b.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        for type_name in type_names {
            let Some(kind) = self.definition_kind(&type_name) else {
                continue;
            };
            let fields = self.fields.get(&type_name).map(Vec::as_slice).unwrap_or_default();
            let old_fields = fields
                .iter()
                .map(|renamed| self.old_field(renamed))
                .collect::<Vec<_>>();
            let keys = match self.rewritten_keys(&type_name, fields) {
                Ok(keys) => keys,
                Err(error) => {
                    self.errors.push(error);
                    Vec::new()
                }
            };

            for name in self.new_and_old_names(&type_name) {
                let mut extension = OverlayType::extension(kind, name);
                for field in &old_fields {
                    extension.push_field(field.clone());
                }
                extension.directives = keys.iter().cloned().collect();
                additions.push(extension);
            }
        }
        additions
    }

    /// The renamed field under its old name and type, with renamed arguments under theirs.
    /// `@deprecated` is not allowed on input fields, so those are deprecated in their description.
    fn old_field(&self, renamed: &RenamedField<'_>) -> OverlayField {
        let marker = &self.options.marker_directive;
        let old_name = &renamed.info.old_name;
        let reason = format!("Replaced by {}.", renamed.field.name());
        let binding_hint = self.options.binding_hint.as_ref().map(|hint| {
            string_argument_directive(
                hint.directive.clone(),
                hint.argument.clone(),
                format!("{}{}", hint.prefix, capitalize(old_name)),
            )
        });

        match renamed.field {
            FieldRef::Output(field) => {
                let mut field = field_without_directive(field, marker);
                let old_field = field.make_mut();
                old_field.name = old_name.clone();
                if let Some(old_type_name) = &renamed.info.old_type_name {
                    rename_type(&mut old_field.ty, old_type_name.clone());
                }
                for (argument, (_, info)) in old_field.arguments.iter_mut().zip(&renamed.arguments)
                {
                    let Some(info) = info else {
                        continue;
                    };
                    let argument = argument.make_mut();
                    argument.name = info.old_name.clone();
                    if let Some(old_type_name) = &info.old_type_name {
                        rename_type(argument.ty.make_mut(), old_type_name.clone());
                    }
                }
                old_field.directives.push(string_argument_directive(
                    DEPRECATED_DIRECTIVE,
                    DEPRECATED_REASON_ARGUMENT,
                    reason,
                ));
                old_field.directives.extend(binding_hint);
                OverlayField::Output(field)
            }
            FieldRef::Input(field) => {
                let mut field = input_value_without_directive(field, marker);
                let old_field = field.make_mut();
                old_field.name = old_name.clone();
                if let Some(old_type_name) = &renamed.info.old_type_name {
                    rename_type(old_field.ty.make_mut(), old_type_name.clone());
                }
                old_field.description = Some(deprecated_description(
                    old_field.description.as_deref(),
                    &reason,
                ));
                old_field.directives.extend(binding_hint);
                OverlayField::Input(field)
            }
        }
    }

    /// Rewrites the type's federation keys to use the old field names, returning the keys that
    /// changed as key directives. Directives on extensions are additive, so the type keeps its
    /// original keys too.
    ///
    /// Matching is by whole word anywhere in the key, so a renamed `id` also rewrites the `id`
    /// of a nested selection like `course { id }`.
    fn rewritten_keys(
        &self,
        type_name: &Name,
        fields: &[RenamedField<'_>],
    ) -> Result<Vec<Node<Directive>>, SingleReplacesError> {
        let mut keys = self
            .federation_keys
            .get(type_name)
            .into_iter()
            .flatten()
            .map(|key| (key.clone(), false))
            .collect::<Vec<_>>();
        for renamed in fields {
            for (key, updated) in &mut keys {
                let rewritten =
                    replace_whole_word(key, renamed.field.name(), &renamed.info.old_name)
                        .map_err(|error| SingleReplacesError::Internal {
                            message: format!(
                                "cannot rewrite key \"{key}\" of \"{type_name}\": {error}"
                            ),
                        })?;
                if let Some(rewritten) = rewritten {
                    *key = rewritten;
                    *updated = true;
                }
            }
        }
        Ok(keys
            .into_iter()
            .filter(|(_, updated)| *updated)
            .map(|(key, _)| {
                string_argument_directive(
                    self.options.key_directive.clone(),
                    KEY_FIELDS_ARGUMENT,
                    key,
                )
            })
            .collect())
    }

    /// Extensions adding old enum values. Renamed enums get the extension under both names.
    fn enum_value_additions(&self) -> Vec<OverlayType> {
        let marker = &self.options.marker_directive;
        self.enum_values
            .iter()
            .sorted_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()))
            .flat_map(|(enum_name, values)| {
                let old_values = values
                    .iter()
                    .map(|RenamedEnumValue { value, old_name }| {
                        let mut old_value = enum_value_without_directive(value, marker);
                        let copy = old_value.make_mut();
                        copy.value = old_name.clone();
                        copy.directives.push(string_argument_directive(
                            DEPRECATED_DIRECTIVE,
                            DEPRECATED_REASON_ARGUMENT,
                            format!("Replaced by {}.", value.value),
                        ));
                        old_value
                    })
                    .collect::<Vec<_>>();
                self.new_and_old_names(enum_name)
                    .into_iter()
                    .map(move |name| {
                        let mut extension = OverlayType::extension(DefinitionKind::Enum, name);
                        extension.values = old_values.clone();
                        extension
                    })
            })
            .collect()
    }

    /// Extensions making objects implement the old names of renamed interfaces.
    fn interface_additions(&self) -> Vec<OverlayType> {
        self.extra_implements
            .iter()
            .sorted_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()))
            .flat_map(|(object_name, interfaces)| {
                self.new_and_old_names(object_name)
                    .into_iter()
                    .map(move |name| {
                        let mut extension = OverlayType::extension(DefinitionKind::Object, name);
                        extension.implements_interfaces = interfaces.clone();
                        extension
                    })
            })
            .collect()
    }

    /// Extensions adding the old names of renamed members to unions.
    fn union_member_additions(&self) -> Vec<OverlayType> {
        self.extra_union_members
            .iter()
            .sorted_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()))
            .flat_map(|(union_name, members)| {
                self.new_and_old_names(union_name)
                    .into_iter()
                    .map(move |name| {
                        let mut extension = OverlayType::extension(DefinitionKind::Union, name);
                        extension.members = members.clone();
                        extension
                    })
            })
            .collect()
    }
}

/// `Deprecated: <reason>`, after the existing description if there is one.
fn deprecated_description(description: Option<&str>, reason: &str) -> Node<str> {
    match description {
        Some(description) if !description.is_empty() => {
            format!("{description}\nDeprecated: {reason}").into()
        }
        _ => format!("Deprecated: {reason}").into(),
    }
}

/// Replaces the innermost named type, keeping list and non-null wrappers as they are.
fn rename_type(ty: &mut Type, new_name: Name) {
    match ty {
        Type::Named(name) => *name = new_name,
        Type::NonNullNamed(name) => *name = new_name,
        Type::List(inner) => rename_type(inner, new_name),
        Type::NonNullList(inner) => rename_type(inner, new_name),
    }
}

/// Uppercases the first character, for accessor names like `DeprecatedLocale`.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
