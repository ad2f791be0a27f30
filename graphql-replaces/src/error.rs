use std::fmt::Display;
use std::fmt::Formatter;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::validation::DiagnosticList;
use apollo_compiler::validation::WithErrors;

/// Broad classification of a [`SingleReplacesError`].
///
/// `InvalidInput` errors are problems with the schema being processed and are meant to be fixed
/// by the schema author. `Internal` errors mean the caller wired things up incorrectly (or the
/// schema skipped validation); they should be reported rather than retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidInput,
    Internal,
}

/// A single problem found while processing rename markers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SingleReplacesError {
    #[error(
        "@{directive} directive on definitions can only use `name` argument (found `type` on \"{definition}\")"
    )]
    DefinitionTypeOverride { directive: Name, definition: Name },
    #[error(
        "@{directive} directive on enum values can only use `name` argument (found `type` on \"{enum_name}.{value}\")"
    )]
    EnumValueTypeOverride {
        directive: Name,
        enum_name: Name,
        value: Name,
    },
    #[error(
        "@{directive} directive on arguments can only be used on renamed fields (argument \"{type_name}.{field}({argument}:)\")"
    )]
    ArgumentWithoutFieldRename {
        directive: Name,
        type_name: Name,
        field: Name,
        argument: Name,
    },
    #[error(
        "input fields using the @{directive} directive must be nullable (field \"{type_name}.{field}\")"
    )]
    NullableInputFieldRequired {
        directive: Name,
        type_name: Name,
        field: Name,
    },
    #[error(
        "@{directive} directive on non-list input fields must include treatZeroAsUnset:true or treatZeroAsUnset:false (field \"{type_name}.{field}\")"
    )]
    MissingTreatZeroAsUnset {
        directive: Name,
        type_name: Name,
        field: Name,
    },
    #[error(
        "@{directive} directive on \"{coordinate}\" names \"{name}\", which is not a valid GraphQL name"
    )]
    InvalidOldName {
        directive: Name,
        coordinate: String,
        name: String,
    },
    #[error(
        "@{directive} directive on \"{coordinate}\" reuses old name \"{old_name}\", already replaced by \"{previous}\""
    )]
    DuplicateOldName {
        directive: Name,
        coordinate: Name,
        old_name: Name,
        previous: Name,
    },
    #[error(
        "An internal error has occurred: name required on @{directive} directive (on \"{coordinate}\")"
    )]
    MissingMarkerName { directive: Name, coordinate: String },
    #[error("An internal error has occurred: {message}")]
    Internal { message: String },
}

impl SingleReplacesError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DefinitionTypeOverride { .. }
            | Self::EnumValueTypeOverride { .. }
            | Self::ArgumentWithoutFieldRename { .. }
            | Self::NullableInputFieldRequired { .. }
            | Self::MissingTreatZeroAsUnset { .. }
            | Self::InvalidOldName { .. }
            | Self::DuplicateOldName { .. } => ErrorKind::InvalidInput,
            Self::MissingMarkerName { .. } | Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}

/// Every problem found in one run, in the order they were found.
///
/// A non-empty list means the whole batch failed: no overlay is produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipleReplacesErrors {
    pub errors: Vec<SingleReplacesError>,
}

impl MultipleReplacesErrors {
    pub fn push(&mut self, error: SingleReplacesError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether any collected error is an integration bug rather than a schema problem.
    pub fn has_internal_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|error| error.kind() == ErrorKind::Internal)
    }

    pub(crate) fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl Display for MultipleReplacesErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "The following errors occurred:")?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MultipleReplacesErrors {}

/// Error of the schema loading helpers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReplacesError {
    #[error("Invalid GraphQL schema:\n{message}")]
    InvalidGraphQL { message: String },
}

impl From<DiagnosticList> for ReplacesError {
    fn from(value: DiagnosticList) -> Self {
        Self::InvalidGraphQL {
            message: value.to_string(),
        }
    }
}

impl From<WithErrors<Schema>> for ReplacesError {
    fn from(value: WithErrors<Schema>) -> Self {
        value.errors.into()
    }
}
