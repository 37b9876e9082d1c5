//! Command handlers for the models-repository CLI

pub mod export;
pub mod import;
pub mod validate;
