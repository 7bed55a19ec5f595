//! Scratch directory, where intermediate files are written.
use crate::Error;
use std::fs::{remove_file, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Catenated (or single file) record
const BODY: &str = "rnxmeas.tmp";
/// Complete files, header + record
const ASSEMBLY: &str = "rnx.tmp";

/// [Scratch] directory. It is used by a single run at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Scratch {
    directory: PathBuf,
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new(Path::new("./"))
    }
}

impl Scratch {
    pub fn new(directory: &Path) -> Self {
        Self {
            directory: directory.to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Record being edited
    pub fn body_path(&self) -> PathBuf {
        self.directory.join(BODY)
    }

    /// Record of the nth reassembled day
    pub fn daily_path(&self, nth: usize) -> PathBuf {
        self.directory.join(format!("rnxdailymeas.{}.tmp", nth))
    }

    /// Assembled file. Following files of a same run get numbered.
    pub fn assembly_path(&self, nth: usize) -> PathBuf {
        if nth == 0 {
            self.directory.join(ASSEMBLY)
        } else {
            self.directory.join(format!("rnx.{}.tmp", nth))
        }
    }

    /// Creates (or truncates) a scratch file
    pub fn create(&self, path: &Path) -> Result<BufWriter<File>, Error> {
        let fd = File::create(path).map_err(|source| Error::ScratchError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(BufWriter::new(fd))
    }

    /// Removes a scratch file, if it exists
    pub fn discard(&self, path: &Path) {
        if path.exists() {
            match remove_file(path) {
                Ok(_) => debug!("{} discarded", path.display()),
                Err(e) => warn!("failed to remove {}: {}", path.display(), e),
            }
        }
    }
}
