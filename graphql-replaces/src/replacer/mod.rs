//! Processing of `@replaces` directives.
//!
//! A [`Replacer`] makes two passes over a schema. The first pass records every renamed
//! definition, field, argument and enum value, along with the kind and federation keys of every
//! definition. The second pass needs the complete table of renamed types from the first one: it
//! finds objects implementing renamed interfaces and unions containing renamed members, which
//! have to be extended to also implement/contain the old names.
//!
//! [`Replacer::schema_additions`] then renders the overlay; see the `additions` module.
use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::FieldDefinition;
use apollo_compiler::ast::InputValueDefinition;
use apollo_compiler::ast::Type;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::name;
use apollo_compiler::schema::EnumValueDefinition;
use apollo_compiler::schema::ExtendedType;
use tracing::debug;
use tracing::trace;

use crate::ReplacesOptions;
use crate::error::MultipleReplacesErrors;
use crate::error::SingleReplacesError;
use crate::format::DefinitionKind;
use crate::marker::ReplaceInfo;
use crate::utils::ExtendedTypeExt;

mod additions;

const KEY_FIELDS_ARGUMENT: Name = name!("fields");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplacerState {
    New,
    Processed,
    Synthesized,
}

/// A renamed object, input object, interface, union, enum or scalar.
#[derive(Debug, Clone)]
pub(crate) struct RenamedDefinition<'schema> {
    pub(crate) definition: &'schema ExtendedType,
    pub(crate) old_name: Name,
}

/// Either kind of field that can be renamed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FieldRef<'schema> {
    Output(&'schema Node<FieldDefinition>),
    Input(&'schema Node<InputValueDefinition>),
}

impl<'schema> FieldRef<'schema> {
    pub(crate) fn name(&self) -> &'schema Name {
        match *self {
            FieldRef::Output(field) => &field.name,
            FieldRef::Input(field) => &field.name,
        }
    }

    pub(crate) fn ty(&self) -> &'schema Type {
        match *self {
            FieldRef::Output(field) => &field.ty,
            FieldRef::Input(field) => &field.ty,
        }
    }

    fn directives(&self) -> &'schema [Node<Directive>] {
        match *self {
            FieldRef::Output(field) => &field.directives,
            FieldRef::Input(field) => &field.directives,
        }
    }

    fn arguments(&self) -> &'schema [Node<InputValueDefinition>] {
        match *self {
            FieldRef::Output(field) => &field.arguments,
            FieldRef::Input(_) => &[],
        }
    }
}

/// A renamed field, with the markers of its arguments (renamed arguments are only allowed on
/// renamed fields).
#[derive(Debug, Clone)]
pub(crate) struct RenamedField<'schema> {
    pub(crate) field: FieldRef<'schema>,
    pub(crate) info: ReplaceInfo,
    pub(crate) arguments: Vec<(&'schema Node<InputValueDefinition>, Option<ReplaceInfo>)>,
}

#[derive(Debug, Clone)]
pub(crate) struct RenamedEnumValue<'schema> {
    pub(crate) value: &'schema Node<EnumValueDefinition>,
    pub(crate) old_name: Name,
}

/// Holds information about the renames in one schema.
///
/// A replacer is single use: [`Replacer::process_schema`] must be called exactly once, before
/// [`Replacer::schema_additions`]. Misuse is recorded as an internal error.
pub(crate) struct Replacer<'schema> {
    options: ReplacesOptions,
    /// Collected while processing; reported once every marker has been looked at.
    errors: MultipleReplacesErrors,
    state: ReplacerState,

    /// Renamed top-level definitions.
    definitions: Vec<RenamedDefinition<'schema>>,
    /// (New) type name to the renamed fields on that type.
    fields: IndexMap<Name, Vec<RenamedField<'schema>>>,
    /// (New) enum name to the renamed values of that enum.
    enum_values: IndexMap<Name, Vec<RenamedEnumValue<'schema>>>,
    /// (New) object name to the old names of renamed interfaces it implements.
    extra_implements: IndexMap<Name, Vec<Name>>,
    /// (New) union name to the old names of its renamed members.
    extra_union_members: IndexMap<Name, Vec<Name>>,

    /// New type name to old type name, for every renamed definition.
    replaced_types: IndexMap<Name, Name>,
    /// Old type name back to new type name, to keep the mapping injective.
    replacing_types: IndexMap<Name, Name>,
    definition_kinds: IndexMap<Name, DefinitionKind>,
    /// (New) type name to the `fields` strings of its `@key` directives, e.g. `"kaid classroomId"`
    /// or `"course { id }"`.
    federation_keys: IndexMap<Name, Vec<String>>,
}

impl<'schema> Replacer<'schema> {
    pub(crate) fn new(options: ReplacesOptions) -> Self {
        Self {
            options,
            errors: MultipleReplacesErrors::default(),
            state: ReplacerState::New,
            definitions: Vec::new(),
            fields: IndexMap::default(),
            enum_values: IndexMap::default(),
            extra_implements: IndexMap::default(),
            extra_union_members: IndexMap::default(),
            replaced_types: IndexMap::default(),
            replacing_types: IndexMap::default(),
            definition_kinds: IndexMap::default(),
            federation_keys: IndexMap::default(),
        }
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub(crate) fn into_errors(self) -> MultipleReplacesErrors {
        self.errors
    }

    pub(crate) fn definitions(&self) -> &[RenamedDefinition<'schema>] {
        &self.definitions
    }

    pub(crate) fn fields(&self) -> &IndexMap<Name, Vec<RenamedField<'schema>>> {
        &self.fields
    }

    pub(crate) fn definition_kind(&self, type_name: &Name) -> Option<DefinitionKind> {
        self.definition_kinds.get(type_name).copied()
    }

    /// Records metadata about uses of the rename marker in `schema`.
    pub(crate) fn process_schema(&mut self, schema: &'schema Schema) {
        if self.state != ReplacerState::New {
            self.errors.push(SingleReplacesError::Internal {
                message: "process_schema called multiple times".to_owned(),
            });
            return;
        }
        self.state = ReplacerState::Processed;

        let types = move || schema.types.iter().filter(|(_, ty)| !ty.is_built_in());

        for (type_name, ty) in types() {
            self.process_definition(type_name, ty);

            match ty {
                ExtendedType::Object(object) => {
                    for field in object.fields.values() {
                        self.process_field(
                            type_name,
                            DefinitionKind::Object,
                            FieldRef::Output(&field.node),
                        );
                    }
                }
                ExtendedType::Interface(interface) => {
                    for field in interface.fields.values() {
                        self.process_field(
                            type_name,
                            DefinitionKind::Interface,
                            FieldRef::Output(&field.node),
                        );
                    }
                }
                ExtendedType::InputObject(input_object) => {
                    for field in input_object.fields.values() {
                        self.process_field(
                            type_name,
                            DefinitionKind::InputObject,
                            FieldRef::Input(&field.node),
                        );
                    }
                }
                ExtendedType::Enum(enum_type) => {
                    for value in enum_type.values.values() {
                        self.process_enum_value(type_name, &value.node);
                    }
                }
                ExtendedType::Union(_) | ExtendedType::Scalar(_) => {}
            }
        }

        // Go through the types again to find objects that implement renamed interfaces and unions
        // that include renamed members. These get extended to implement/include the old names.
        for (type_name, ty) in types() {
            match ty {
                ExtendedType::Object(object) => {
                    for interface in &object.implements_interfaces {
                        self.process_interface_implementation(type_name, &interface.name);
                    }
                }
                ExtendedType::Union(union) => {
                    for member in &union.members {
                        self.process_union_member(type_name, &member.name);
                    }
                }
                _ => {}
            }
        }

        debug!(
            definitions = self.definitions.len(),
            types_with_fields = self.fields.len(),
            enums_with_values = self.enum_values.len(),
            extra_implements = self.extra_implements.len(),
            extra_union_members = self.extra_union_members.len(),
            errors = self.errors.len(),
            "processed @{} directives",
            self.options.marker_directive,
        );
    }

    /// Reads the marker in `directives`, recording (and swallowing) extraction errors.
    fn replace_info(
        &mut self,
        directive: Option<&'schema Node<Directive>>,
        coordinate: impl FnOnce() -> String,
    ) -> Option<ReplaceInfo> {
        let directive = directive?;
        match ReplaceInfo::from_directive(Some(directive), &coordinate()) {
            Ok(info) => info,
            Err(error) => {
                self.errors.push(error);
                None
            }
        }
    }

    fn process_definition(&mut self, type_name: &'schema Name, ty: &'schema ExtendedType) {
        self.definition_kinds
            .insert(type_name.clone(), ty.definition_kind());
        let keys = ty
            .directives()
            .get_all(&self.options.key_directive)
            .filter_map(|key| key.specified_argument_by_name(&KEY_FIELDS_ARGUMENT))
            .filter_map(|fields| fields.as_str())
            .map(str::to_owned)
            .collect();
        self.federation_keys.insert(type_name.clone(), keys);

        let directive = ty
            .directives()
            .get(&self.options.marker_directive)
            .map(|directive| &directive.node);
        let Some(info) = self.replace_info(directive, || type_name.to_string()) else {
            return;
        };

        if info.old_type_name.is_some() {
            self.errors.push(SingleReplacesError::DefinitionTypeOverride {
                directive: self.options.marker_directive.clone(),
                definition: type_name.clone(),
            });
        }

        if let Some(previous) = self.replacing_types.get(&info.old_name) {
            self.errors.push(SingleReplacesError::DuplicateOldName {
                directive: self.options.marker_directive.clone(),
                coordinate: type_name.clone(),
                old_name: info.old_name.clone(),
                previous: previous.clone(),
            });
            return;
        }

        trace!(new_name = %type_name, old_name = %info.old_name, "renamed definition");
        self.replacing_types
            .insert(info.old_name.clone(), type_name.clone());
        self.replaced_types
            .insert(type_name.clone(), info.old_name.clone());
        self.definitions.push(RenamedDefinition {
            definition: ty,
            old_name: info.old_name,
        });
    }

    fn process_field(
        &mut self,
        type_name: &'schema Name,
        kind: DefinitionKind,
        field: FieldRef<'schema>,
    ) {
        let marker = self.options.marker_directive.clone();
        let field_name = field.name();
        let directive = field.directives().iter().find(|d| d.name == marker);
        let Some(info) = self.replace_info(directive, || format!("{type_name}.{field_name}")) else {
            // Renamed arguments are only allowed on renamed fields.
            for argument in field.arguments() {
                let directive = argument.directives.iter().find(|d| d.name == marker);
                let coordinate = || format!("{type_name}.{field_name}({}:)", argument.name);
                if self.replace_info(directive, coordinate).is_some() {
                    self.errors
                        .push(SingleReplacesError::ArgumentWithoutFieldRename {
                            directive: marker.clone(),
                            type_name: type_name.clone(),
                            field: field_name.clone(),
                            argument: argument.name.clone(),
                        });
                }
            }
            return;
        };

        if kind == DefinitionKind::InputObject {
            if field.ty().is_non_null() {
                self.errors
                    .push(SingleReplacesError::NullableInputFieldRequired {
                        directive: marker.clone(),
                        type_name: type_name.clone(),
                        field: field_name.clone(),
                    });
            }
            if !field.ty().is_list() && !info.treat_zero_as_unset_present {
                self.errors.push(SingleReplacesError::MissingTreatZeroAsUnset {
                    directive: marker.clone(),
                    type_name: type_name.clone(),
                    field: field_name.clone(),
                });
            }
        }

        let arguments = field
            .arguments()
            .iter()
            .map(|argument| {
                let directive = argument.directives.iter().find(|d| d.name == marker);
                let coordinate = || format!("{type_name}.{field_name}({}:)", argument.name);
                (argument, self.replace_info(directive, coordinate))
            })
            .collect();

        trace!(
            type_name = %type_name,
            new_name = %field_name,
            old_name = %info.old_name,
            "renamed field",
        );
        self.fields
            .entry(type_name.clone())
            .or_default()
            .push(RenamedField {
                field,
                info,
                arguments,
            });
    }

    fn process_enum_value(
        &mut self,
        enum_name: &'schema Name,
        value: &'schema Node<EnumValueDefinition>,
    ) {
        let directive = value.directives.get(&self.options.marker_directive);
        let coordinate = || format!("{enum_name}.{}", value.value);
        let Some(info) = self.replace_info(directive, coordinate) else {
            return;
        };

        if info.old_type_name.is_some() {
            self.errors.push(SingleReplacesError::EnumValueTypeOverride {
                directive: self.options.marker_directive.clone(),
                enum_name: enum_name.clone(),
                value: value.value.clone(),
            });
        }

        trace!(
            enum_name = %enum_name,
            new_name = %value.value,
            old_name = %info.old_name,
            "renamed enum value",
        );
        self.enum_values
            .entry(enum_name.clone())
            .or_default()
            .push(RenamedEnumValue {
                value,
                old_name: info.old_name,
            });
    }

    fn process_interface_implementation(&mut self, object_name: &Name, interface_name: &Name) {
        let Some(old_name) = self.replaced_types.get(interface_name) else {
            return;
        };
        self.extra_implements
            .entry(object_name.clone())
            .or_default()
            .push(old_name.clone());
    }

    fn process_union_member(&mut self, union_name: &Name, member_name: &Name) {
        let Some(old_name) = self.replaced_types.get(member_name) else {
            return;
        };
        self.extra_union_members
            .entry(union_name.clone())
            .or_default()
            .push(old_name.clone());
    }

    /// The new name of a type followed by its old name, if the type was renamed.
    fn new_and_old_names(&self, new_name: &Name) -> Vec<Name> {
        std::iter::once(new_name)
            .chain(self.replaced_types.get(new_name))
            .cloned()
            .collect()
    }
}
