//! CLI-specific error types

use crate::error::ResolverError;
use crate::import::ImportError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write file {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
