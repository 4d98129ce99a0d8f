//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`serde_json::Error`]
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// archive metadata is truncated or inconsistent
    #[error("archive metadata is truncated or inconsistent")]
    MalformedArchive,

    /// no project file exists for the requested repack
    #[error("no project file found for repacking: {0}")]
    MissingProjectFile(PathBuf),

    /// a texture entry has no recorded header blob, so a structurally valid
    /// archive cannot be produced
    #[error("no texture header recorded for {0}")]
    MissingRequiredMetadata(String),

    /// a replacement image is too short to carry a DDS header
    #[error("{0} is not a valid dds image")]
    InvalidDds(PathBuf),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
