use apollo_compiler::InvalidNameError;
use apollo_compiler::Schema;
use apollo_compiler::validation::DiagnosticList;
use apollo_compiler::validation::WithErrors;

/// Breaks out of the calling function, returning an internal error.
macro_rules! bail {
    ( $( $arg:tt )+ ) => {
        return Err($crate::error::internal_error!( $( $arg )+ ).into())
    }
}
pub(crate) use bail;

/// Creates an internal error.
macro_rules! internal_error {
    ( $( $arg:tt )+ ) => {
        $crate::error::SchemaError::Internal {
            message: format!( $( $arg )+ ),
        }
    }
}
pub(crate) use internal_error;

/// Errors raised while reading or mutating a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("An internal error has occurred, please report this bug to Apollo. Details: {message}")]
    Internal { message: String },
    /// An element with this name already exists where a new one was being added.
    #[error("{message}")]
    DuplicateName { message: String },
    /// A mutation touched a built-in or introspection element.
    #[error("Cannot mutate built-in or introspection element {coordinate}")]
    BuiltInMutation { coordinate: String },
    /// A directive application names a directive with no definition.
    #[error("Unknown directive \"@{name}\"")]
    UnknownDirective { name: String },
    #[error("Unknown type \"{name}\"")]
    UnknownType { name: String },
    /// A value did not coerce to its expected input type.
    #[error("{message}")]
    InvalidValue { message: String },
    /// A user redefinition of a built-in is structurally incompatible with it.
    #[error("Invalid redefinition of built-in {kind} \"{name}\": {message}")]
    BuiltInRedefinition {
        kind: &'static str,
        name: String,
        message: String,
    },
    #[error("{message}")]
    FeatureError { message: String },
    #[error(transparent)]
    InvalidGraphQLName(#[from] InvalidNameError),
    /// Schema-level validation failure reported by apollo-compiler.
    #[error("{diagnostics}")]
    InvalidGraphQL { diagnostics: String },
}

impl SchemaError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        SchemaError::Internal {
            message: message.into(),
        }
    }
}

impl From<DiagnosticList> for SchemaError {
    fn from(value: DiagnosticList) -> Self {
        SchemaError::InvalidGraphQL {
            diagnostics: value.to_string(),
        }
    }
}

impl From<WithErrors<Schema>> for SchemaError {
    fn from(value: WithErrors<Schema>) -> Self {
        value.errors.into()
    }
}
