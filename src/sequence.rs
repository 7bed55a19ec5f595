//! Daily file sequences.
use crate::filename::{Error as FileNameError, FileName};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("sequence endpoints do not share the same {0}")]
    SequenceMismatch(&'static str),
    #[error("sequence ends (MJD {end}) before it starts (MJD {start})")]
    InvalidRange { start: i32, end: i32 },
    #[error("{0}")]
    FileNameError(#[from] FileNameError),
}

/// True for an empty directory, or `.`
pub(crate) fn is_current_dir(directory: &Path) -> bool {
    directory.as_os_str().is_empty() || directory == Path::new(".")
}

/// [FileSequence] is a list of daily file names,
/// one per day, in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSequence(Vec<FileName>);

impl FileSequence {
    /// Builds the sequence that runs from `first` to `last`, both included.
    /// When `with_preceding_day` is set, the sequence starts one day earlier.
    pub fn between(
        first: &FileName,
        last: &FileName,
        with_preceding_day: bool,
    ) -> Result<Self, Error> {
        if let Some(field) = first.mismatch(last) {
            return Err(Error::SequenceMismatch(field));
        }
        let (start, end) = (first.mjd(), last.mjd());
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }
        let start = if with_preceding_day { start - 1 } else { start };
        Ok(Self((start..=end).map(|mjd| first.with_mjd(mjd)).collect()))
    }

    /// Builds the sequence of `[start, end]` MJD range, from a name template.
    /// When `with_preceding_day` is set, the sequence starts one day earlier.
    pub fn from_mjd(
        start: i32,
        end: i32,
        template: &str,
        with_preceding_day: bool,
    ) -> Result<Self, Error> {
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }
        let start = if with_preceding_day { start - 1 } else { start };
        let names = (start..=end)
            .map(|mjd| FileName::parse(&FileName::generate(mjd, template)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(names))
    }

    /// Names that do not have a directory (or `.`) are located in `directory`
    pub fn resolve(self, directory: &Path) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|name| {
                    if is_current_dir(&name.directory) {
                        name.with_directory(directory)
                    } else {
                        name
                    }
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for FileSequence {
    type Item = FileName;
    type IntoIter = std::vec::IntoIter<FileName>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileSequence {
    type Item = &'a FileName;
    type IntoIter = std::slice::Iter<'a, FileName>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
