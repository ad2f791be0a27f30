//! Overlay definitions and their SDL rendering.
//!
//! Overlay types are collected in a flattened model (one struct for every kind of type, like the
//! schema tree they are derived from), then converted to `ast` definitions and printed by
//! apollo-compiler.
use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::ast::Argument;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::DirectiveList;
use apollo_compiler::ast::EnumValueDefinition;
use apollo_compiler::ast::FieldDefinition;
use apollo_compiler::ast::InputValueDefinition;
use apollo_compiler::ast::Value;
use serde::Serialize;

const INDENT: &str = "    ";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
pub enum DefinitionKind {
    #[strum(to_string = "scalar")]
    Scalar,
    #[strum(to_string = "type")]
    Object,
    #[strum(to_string = "interface")]
    Interface,
    #[strum(to_string = "union")]
    Union,
    #[strum(to_string = "enum")]
    Enum,
    #[strum(to_string = "input")]
    InputObject,
}

/// A type definition or type extension in the overlay.
#[derive(Debug, Clone)]
pub(crate) struct OverlayType {
    pub(crate) kind: DefinitionKind,
    pub(crate) extend: bool,
    /// Ignored for extensions, which cannot carry descriptions.
    pub(crate) description: Option<Node<str>>,
    pub(crate) name: Name,
    pub(crate) implements_interfaces: Vec<Name>,
    pub(crate) directives: DirectiveList,
    pub(crate) members: Vec<Name>,
    /// Fields of objects and interfaces.
    pub(crate) fields: Vec<Node<FieldDefinition>>,
    pub(crate) input_fields: Vec<Node<InputValueDefinition>>,
    pub(crate) values: Vec<Node<EnumValueDefinition>>,
}

/// An old field, to be added to an object, interface or input object.
#[derive(Debug, Clone)]
pub(crate) enum OverlayField {
    Output(Node<FieldDefinition>),
    Input(Node<InputValueDefinition>),
}

impl OverlayType {
    pub(crate) fn new(kind: DefinitionKind, name: Name) -> Self {
        Self {
            kind,
            extend: false,
            description: None,
            name,
            implements_interfaces: Vec::new(),
            directives: DirectiveList::new(),
            members: Vec::new(),
            fields: Vec::new(),
            input_fields: Vec::new(),
            values: Vec::new(),
        }
    }

    pub(crate) fn extension(kind: DefinitionKind, name: Name) -> Self {
        Self {
            extend: true,
            ..Self::new(kind, name)
        }
    }

    pub(crate) fn push_field(&mut self, field: OverlayField) {
        match field {
            OverlayField::Output(field) => self.fields.push(field),
            OverlayField::Input(field) => self.input_fields.push(field),
        }
    }
}

impl From<OverlayType> for ast::Definition {
    fn from(ty: OverlayType) -> Self {
        let OverlayType {
            kind,
            extend,
            description,
            name,
            implements_interfaces,
            directives,
            members,
            fields,
            input_fields,
            values,
        } = ty;
        match (kind, extend) {
            (DefinitionKind::Scalar, false) => {
                Self::ScalarTypeDefinition(Node::new(ast::ScalarTypeDefinition {
                    description,
                    name,
                    directives,
                }))
            }
            (DefinitionKind::Scalar, true) => {
                Self::ScalarTypeExtension(Node::new(ast::ScalarTypeExtension { name, directives }))
            }
            (DefinitionKind::Object, false) => {
                Self::ObjectTypeDefinition(Node::new(ast::ObjectTypeDefinition {
                    description,
                    name,
                    implements_interfaces,
                    directives,
                    fields,
                }))
            }
            (DefinitionKind::Object, true) => {
                Self::ObjectTypeExtension(Node::new(ast::ObjectTypeExtension {
                    name,
                    implements_interfaces,
                    directives,
                    fields,
                }))
            }
            (DefinitionKind::Interface, false) => {
                Self::InterfaceTypeDefinition(Node::new(ast::InterfaceTypeDefinition {
                    description,
                    name,
                    implements_interfaces,
                    directives,
                    fields,
                }))
            }
            (DefinitionKind::Interface, true) => {
                Self::InterfaceTypeExtension(Node::new(ast::InterfaceTypeExtension {
                    name,
                    implements_interfaces,
                    directives,
                    fields,
                }))
            }
            (DefinitionKind::Union, false) => {
                Self::UnionTypeDefinition(Node::new(ast::UnionTypeDefinition {
                    description,
                    name,
                    directives,
                    members,
                }))
            }
            (DefinitionKind::Union, true) => {
                Self::UnionTypeExtension(Node::new(ast::UnionTypeExtension {
                    name,
                    directives,
                    members,
                }))
            }
            (DefinitionKind::Enum, false) => {
                Self::EnumTypeDefinition(Node::new(ast::EnumTypeDefinition {
                    description,
                    name,
                    directives,
                    values,
                }))
            }
            (DefinitionKind::Enum, true) => {
                Self::EnumTypeExtension(Node::new(ast::EnumTypeExtension {
                    name,
                    directives,
                    values,
                }))
            }
            (DefinitionKind::InputObject, false) => {
                Self::InputObjectTypeDefinition(Node::new(ast::InputObjectTypeDefinition {
                    description,
                    name,
                    directives,
                    fields: input_fields,
                }))
            }
            (DefinitionKind::InputObject, true) => {
                Self::InputObjectTypeExtension(Node::new(ast::InputObjectTypeExtension {
                    name,
                    directives,
                    fields: input_fields,
                }))
            }
        }
    }
}

/// Prints `definitions` as one document: definitions separated by a blank line, with a single
/// trailing newline. No definitions print as the empty string.
pub(crate) fn render_overlay(definitions: impl IntoIterator<Item = OverlayType>) -> String {
    let mut document = ast::Document::new();
    document.definitions = definitions.into_iter().map(ast::Definition::from).collect();
    normalize_indentation(&document.serialize().indent_prefix(INDENT).to_string())
}

/// Tabs become four spaces so output is stable regardless of editor settings.
fn normalize_indentation(sdl: &str) -> String {
    sdl.replace('\t', INDENT)
}

/// Applies `@name(argument: "value")`.
pub(crate) fn string_argument_directive(
    name: Name,
    argument: Name,
    value: String,
) -> Node<Directive> {
    Node::new(Directive {
        name,
        arguments: vec![Node::new(Argument {
            name: argument,
            value: Node::new(Value::String(value)),
        })],
    })
}

/// Copies `directives` without any application of `removed`.
pub(crate) fn without_directive<'a>(
    directives: impl IntoIterator<Item = &'a Node<Directive>>,
    removed: &Name,
) -> DirectiveList {
    directives
        .into_iter()
        .filter(|directive| directive.name != *removed)
        .cloned()
        .collect()
}

/// Copies an output field, dropping `removed` from the field and its arguments.
pub(crate) fn field_without_directive(
    field: &Node<FieldDefinition>,
    removed: &Name,
) -> Node<FieldDefinition> {
    let mut field = field.clone();
    let copy = field.make_mut();
    copy.directives = without_directive(&copy.directives, removed);
    for argument in &mut copy.arguments {
        *argument = input_value_without_directive(argument, removed);
    }
    field
}

/// Copies an argument or input field, dropping `removed` from it.
pub(crate) fn input_value_without_directive(
    value: &Node<InputValueDefinition>,
    removed: &Name,
) -> Node<InputValueDefinition> {
    let mut value = value.clone();
    let copy = value.make_mut();
    copy.directives = without_directive(&copy.directives, removed);
    value
}

pub(crate) fn enum_value_without_directive(
    value: &Node<EnumValueDefinition>,
    removed: &Name,
) -> Node<EnumValueDefinition> {
    let mut value = value.clone();
    let copy = value.make_mut();
    copy.directives = without_directive(&copy.directives, removed);
    value
}
