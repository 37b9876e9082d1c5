//! Resolver error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while resolving, fetching, or inspecting model content.
///
/// Every failure during a resolution call aborts that call; partially
/// accumulated results are discarded, never returned.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Input string does not match the DTMI grammar. Raised before any
    /// disk or network access.
    #[error("Invalid DTMI format: '{0}'")]
    InvalidDtmiFormat(String),

    /// The configured local repository root does not exist.
    #[error("Local repository directory '{0}' not found or not accessible")]
    RepositoryNotFound(PathBuf),

    /// No artifact exists at the conventional path for this DTMI.
    #[error("Model '{dtmi}' not found at '{path}'")]
    ModelNotFound { dtmi: String, path: String },

    /// Fetched document's top-level JSON shape is neither object nor array.
    #[error("Unsupported model content: expected a JSON object or array, found {kind}")]
    UnsupportedContentKind { kind: &'static str },

    /// Retrieved model content declares an `@id` that differs from the
    /// requested identifier. Repository path lookup is case-insensitive
    /// while DTMIs are case-sensitive, so a mismatch means the requester
    /// used the wrong casing.
    #[error("Retrieved model content has incorrect DTMI casing: requested '{requested}', parsed '{parsed}'")]
    IncorrectDtmiCasing { requested: String, parsed: String },

    /// Retrieval failed for a reason other than a clean not-found: network
    /// failure, unexpected HTTP status, or a local read error.
    #[error("Transport failure fetching '{path}': {message}")]
    Transport { path: String, message: String },

    /// Model content could not be parsed as JSON.
    #[error("Failed to parse model content for '{context}': {message}")]
    InvalidModelContent { context: String, message: String },

    /// The resolution call was cancelled before the closure was complete.
    #[error("Resolution cancelled while processing '{0}'")]
    Cancelled(String),
}
