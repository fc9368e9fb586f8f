use crate::validate::CompilerError;

/// Failures that abort simplification of a template.
///
/// Orphan `elif`/`else` directives are deliberately absent: they are dropped
/// without an error.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimplifyError {
    #[error("Failed to parse expression `{expression}`: {message}")]
    Expression { expression: String, message: String },

    #[error("Unsupported {kind} in expression `{expression}`")]
    UnsupportedSyntax { kind: String, expression: String },

    #[error("Unknown template mode: {0}")]
    UnknownMode(String),

    #[error("Invalid template AST: {0}")]
    InvalidAst(String),

    #[error("Failed to serialize simplified AST: {0}")]
    Serialize(String),

    #[error("Simplified AST violates output contract: {0}")]
    Invariant(CompilerError),
}
