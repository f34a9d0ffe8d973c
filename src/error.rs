//! Error taxonomy for the conversion pass

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Fatal conditions raised while converting Doxygen XML
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parse error in {}: {source}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Missing <{element}> in {}", .path.display())]
    MissingElement { path: PathBuf, element: String },

    #[error("No {prefix}*.xml files found in {}", .dir.display())]
    NoGroupFiles { dir: PathBuf, prefix: String },

    #[error("found reference(s) to non-existing field(s) {names:?} in {typename}")]
    UnknownFieldRefs { typename: String, names: Vec<String> },

    #[error("found reference(s) to non-existing argument(s) {names:?} in function {function}")]
    UnknownArgumentRefs { function: String, names: Vec<String> },

    #[error("enumeration constant {value} is declared within {enumeration}, but does not start with {expected_prefix}")]
    NamingMismatch {
        enumeration: String,
        value: String,
        expected_prefix: String,
    },

    #[error("initializer '{initializer}' appears twice in {enumeration}")]
    DuplicateInitializer {
        enumeration: String,
        initializer: String,
    },

    #[error("identifier {name} already registered with anchor {existing}, cannot rebind to {anchor}")]
    DuplicateIdentifier {
        name: String,
        existing: String,
        anchor: String,
    },

    #[error("Unknown reference: {name}. Declaration not found")]
    UnresolvedReference { name: String },

    #[error("malformed declarator in {declaration}: {reason}")]
    MalformedDeclarator { declaration: String, reason: String },

    #[error("replacement directive for {fields:?} in {typename} matched only part of its fields")]
    IncompleteDirective { typename: String, fields: Vec<String> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("{} error(s) in {}:\n{}", .errors.len(), .file.display(), format_errors(.errors))]
    Group {
        file: PathBuf,
        errors: Vec<ConvertError>,
    },
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors produced by declaration validation rather than I/O
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownFieldRefs { .. }
                | Self::UnknownArgumentRefs { .. }
                | Self::NamingMismatch { .. }
                | Self::DuplicateInitializer { .. }
                | Self::DuplicateIdentifier { .. }
                | Self::MalformedDeclarator { .. }
                | Self::IncompleteDirective { .. }
        )
    }
}

fn format_errors(errors: &[ConvertError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
