use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),
}

/// A slice request that cannot be served. Raised before any traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("operation ids and tags cannot be combined; pick one selector")]
    SelectorConflict,

    #[error("no selector given; pass operation ids or tags")]
    SelectorMissing,

    #[error("unknown document variant: {0}")]
    UnknownDocumentVariant(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("document '{variant}' unavailable at {}: {source}", path.display())]
    DocumentUnavailable {
        variant: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("document '{variant}' is invalid: {source}")]
    DocumentInvalid {
        variant: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Request(#[from] RequestError),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything that can stop a slice request.
#[derive(Debug, Error)]
pub enum SliceError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
