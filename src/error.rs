use std::path::PathBuf;
use thiserror::Error;

use crate::{compression, epoch, filename, filter, header, sequence, version::Version};

/// Errors that terminate an editing run.
/// Non fatal situations (missing inputs, empty result) are not
/// reported through this type: they are logged and the run carries on.
#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    FileNameError(#[from] filename::Error),
    #[error("{0}")]
    HeaderError(#[from] header::Error),
    #[error("{0}")]
    EpochError(#[from] epoch::ParsingError),
    #[error("{0}")]
    SequenceError(#[from] sequence::Error),
    #[error("{0}")]
    CompressionError(#[from] compression::Error),
    #[error("{0}")]
    ExclusionError(#[from] filter::Error),
    #[error("RINEX version {version} detected in {}. Only V3 is supported", path.display())]
    UnsupportedVersion { version: Version, path: PathBuf },
    #[error("unable to create temporary file {}: {source}", path.display())]
    ScratchError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is an input file, use --replace to rewrite inputs", .0.display())]
    InputOverwrite(PathBuf),
    #[error("you need to define a template for the RINEX file names (--template)")]
    MissingTemplate,
    #[error("too many files!")]
    TooManyInputs,
    #[error("no input file or MJD")]
    NoInput,
    #[error("Nothing to do!")]
    NothingToDo,
}
