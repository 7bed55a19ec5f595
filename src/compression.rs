//! File compression handling.
//!
//! Inputs may be gzip (`.gz`) or unix (`.Z`) compressed, and/or Hatanaka
//! compressed (`.crx` or `d` type letter). We work on a readable copy
//! that sits next to the original file, and the original is restored
//! once we are done with it.
//!
//! Gzip is handled in process. Other formats rely on the standard tools:
//! `gzip`, `compress`, `CRX2RNX` and `RNX2CRX`.
use flate2::{read::GzDecoder, write::GzEncoder, Compression as GzCompression};
use std::fs::{remove_file, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

/// gzip compression level
const GZIP_LEVEL: u32 = 6;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("{tool} failed on {}: {reason}", path.display())]
    ToolFailure {
        tool: &'static str,
        path: PathBuf,
        reason: String,
    },
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Compression algorithms, possibly stacked
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Readable file
    #[default]
    None,
    /// `.gz`
    Gzip,
    /// `.Z`
    UnixCompress,
    /// `.crx`, or `d` type letter
    Hatanaka,
    /// `.crx.gz`
    HatanakaGzip,
    /// `.crx.Z`
    HatanakaCompress,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Gzip => write!(f, "gzip"),
            Self::UnixCompress => write!(f, "compress"),
            Self::Hatanaka => write!(f, "hatanaka"),
            Self::HatanakaGzip => write!(f, "hatanaka+gzip"),
            Self::HatanakaCompress => write!(f, "hatanaka+compress"),
        }
    }
}

/*
 * true if this file name designates Hatanaka compressed observations
 */
fn is_hatanaka_name(name: &str) -> bool {
    if name.to_lowercase().ends_with(".crx") {
        return true;
    }
    // V2: .YYd
    let bytes = name.as_bytes();
    let len = bytes.len();
    len > 4
        && bytes[len - 4] == b'.'
        && bytes[len - 3].is_ascii_digit()
        && bytes[len - 2].is_ascii_digit()
        && (bytes[len - 1] == b'd' || bytes[len - 1] == b'D')
}

/*
 * readable name of a Hatanaka compressed file name
 */
fn hatanaka_to_readable(name: &str) -> String {
    let len = name.len();
    match name.get(len.saturating_sub(4)..) {
        Some(".crx") => format!("{}.rnx", &name[..len - 4]),
        Some(".CRX") => format!("{}.RNX", &name[..len - 4]),
        _ => match name.get(len.saturating_sub(1)..) {
            Some("d") => format!("{}o", &name[..len - 1]),
            Some("D") => format!("{}O", &name[..len - 1]),
            _ => name.to_string(),
        },
    }
}

/*
 * Hatanaka compressed name of a readable observation file name
 */
fn readable_to_hatanaka(name: &str) -> Option<String> {
    let len = name.len();
    match name.get(len.saturating_sub(4)..) {
        Some(".rnx") => Some(format!("{}.crx", &name[..len - 4])),
        Some(".RNX") => Some(format!("{}.CRX", &name[..len - 4])),
        _ => {
            let bytes = name.as_bytes();
            if len > 4 && bytes[len - 4] == b'.' {
                match bytes[len - 1] {
                    b'o' => Some(format!("{}d", &name[..len - 1])),
                    b'O' => Some(format!("{}D", &name[..len - 1])),
                    _ => None,
                }
            } else {
                None
            }
        },
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

fn with_file_name(path: &Path, name: &str) -> PathBuf {
    path.with_file_name(name)
}

impl Algorithm {
    /// Identifies compression from the file name
    pub fn from_path(path: &Path) -> Self {
        let name = file_name(path);
        let (inner, gz, z) = if let Some(inner) = name.strip_suffix(".gz") {
            (inner, true, false)
        } else if let Some(inner) = name.strip_suffix(".Z") {
            (inner, false, true)
        } else {
            (name, false, false)
        };
        match (is_hatanaka_name(inner), gz, z) {
            (true, true, _) => Self::HatanakaGzip,
            (true, _, true) => Self::HatanakaCompress,
            (true, _, _) => Self::Hatanaka,
            (false, true, _) => Self::Gzip,
            (false, _, true) => Self::UnixCompress,
            _ => Self::None,
        }
    }

    /// True if Hatanaka compression is involved
    pub fn is_hatanaka(&self) -> bool {
        matches!(
            self,
            Self::Hatanaka | Self::HatanakaGzip | Self::HatanakaCompress
        )
    }

    /// Outer compression layer
    fn outer(&self) -> Self {
        match self {
            Self::Gzip | Self::HatanakaGzip => Self::Gzip,
            Self::UnixCompress | Self::HatanakaCompress => Self::UnixCompress,
            _ => Self::None,
        }
    }

    /// Returns the path of the readable version of a compressed file
    pub fn readable_path(&self, path: &Path) -> PathBuf {
        let mut name = file_name(path).to_string();
        match self.outer() {
            Self::Gzip => name.truncate(name.len() - 3),
            Self::UnixCompress => name.truncate(name.len() - 2),
            _ => {},
        }
        if self.is_hatanaka() {
            name = hatanaka_to_readable(&name);
        }
        with_file_name(path, &name)
    }
}

/*
 * compressed files that may stand for this readable file, by preference order
 */
fn candidates(path: &Path) -> Vec<PathBuf> {
    let name = file_name(path);
    let mut candidates = vec![
        with_file_name(path, &format!("{}.gz", name)),
        with_file_name(path, &format!("{}.Z", name)),
    ];
    if let Some(crx) = readable_to_hatanaka(name) {
        candidates.push(with_file_name(path, &crx));
        candidates.push(with_file_name(path, &format!("{}.gz", crx)));
        candidates.push(with_file_name(path, &format!("{}.Z", crx)));
    }
    candidates
}

const CRX2RNX: &str = "CRX2RNX";
const RNX2CRX: &str = "RNX2CRX";

/*
 * runs an external tool on input, stdout is redirected to output
 */
fn run_tool(
    tool: &'static str,
    flag: Option<&str>,
    input: &Path,
    trailing: Option<&str>,
    output: &Path,
) -> Result<(), Error> {
    let failure = |reason: String| Error::ToolFailure {
        tool,
        path: input.to_path_buf(),
        reason,
    };
    let stdout = File::create(output)?;
    let mut command = Command::new(tool);
    command.args(flag).arg(input).args(trailing);
    debug!("{:?} > {}", command, output.display());
    let status = command
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::null())
        .status()
        .map_err(|e| failure(e.to_string()))?;
    if status.success() {
        Ok(())
    } else {
        let _ = remove_file(output);
        Err(failure(status.to_string()))
    }
}

fn gunzip(input: &Path, output: &Path) -> Result<(), Error> {
    let mut decoder = BufReader::new(GzDecoder::new(File::open(input)?));
    let mut writer = BufWriter::new(File::create(output)?);
    std::io::copy(&mut decoder, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn gzip(input: &Path, output: &Path) -> Result<(), Error> {
    let mut reader = BufReader::new(File::open(input)?);
    let mut encoder = GzEncoder::new(File::create(output)?, GzCompression::new(GZIP_LEVEL));
    std::io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?;
    Ok(())
}

/// Decodes `input` (compressed with `algorithm`) into `output`
pub fn decompress(input: &Path, output: &Path, algorithm: Algorithm) -> Result<(), Error> {
    let crx = if algorithm.is_hatanaka() && algorithm.outer() != Algorithm::None {
        Some(with_file_name(
            output,
            &format!("{}.crx.tmp", file_name(output)),
        ))
    } else {
        None
    };
    let stage = crx.as_deref().unwrap_or(output);
    match algorithm.outer() {
        Algorithm::Gzip => gunzip(input, stage)?,
        Algorithm::UnixCompress => run_tool("gzip", Some("-dc"), input, None, stage)?,
        _ => {},
    }
    if algorithm.is_hatanaka() {
        let source = crx.as_deref().unwrap_or(input);
        let result = run_tool(CRX2RNX, None, source, Some("-"), output);
        if let Some(crx) = &crx {
            let _ = remove_file(crx);
        }
        result?;
    } else if algorithm == Algorithm::None && input != output {
        std::fs::copy(input, output)?;
    }
    Ok(())
}

/// Encodes readable `input` into `output`, using `algorithm`
pub fn compress(input: &Path, output: &Path, algorithm: Algorithm) -> Result<(), Error> {
    let crx = if algorithm.is_hatanaka() && algorithm.outer() != Algorithm::None {
        Some(with_file_name(
            output,
            &format!("{}.crx.tmp", file_name(output)),
        ))
    } else {
        None
    };
    if algorithm.is_hatanaka() {
        run_tool(RNX2CRX, None, input, Some("-"), crx.as_deref().unwrap_or(output))?;
    }
    let stage = crx.as_deref().unwrap_or(input);
    let result = match algorithm.outer() {
        Algorithm::Gzip => gzip(stage, output),
        Algorithm::UnixCompress => run_tool("compress", Some("-c"), stage, None, output),
        _ => {
            if !algorithm.is_hatanaka() && input != output {
                std::fs::copy(input, output)?;
            }
            Ok(())
        },
    };
    if let Some(crx) = &crx {
        let _ = remove_file(crx);
    }
    result
}

/// [CompressionJob] tracks one file we made readable
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionJob {
    /// Readable file we work on
    pub plain: PathBuf,
    /// File as it was found
    pub original: PathBuf,
    /// Compression of the original file
    pub algorithm: Algorithm,
    modified: bool,
    resolved: bool,
}

impl CompressionJob {
    /// Makes `path` readable. When `path` does not exist, its compressed
    /// variants are looked up, by order of preference.
    pub fn decompress(path: &Path) -> Result<Self, Error> {
        let original = if path.exists() {
            path.to_path_buf()
        } else {
            candidates(path)
                .into_iter()
                .find(|p| p.exists())
                .ok_or_else(|| Error::MissingFile(path.to_path_buf()))?
        };

        let algorithm = Algorithm::from_path(&original);
        let plain = algorithm.readable_path(&original);

        if algorithm == Algorithm::None || plain.exists() {
            if algorithm != Algorithm::None {
                debug!(
                    "{} already exists, {} is left as is",
                    plain.display(),
                    original.display()
                );
            }
            return Ok(Self {
                original: plain.clone(),
                plain,
                algorithm: Algorithm::None,
                modified: false,
                resolved: false,
            });
        }

        decompress(&original, &plain, algorithm)?;
        debug!(
            "{} ({}) decompressed to {}",
            original.display(),
            algorithm,
            plain.display()
        );

        Ok(Self {
            plain,
            original,
            algorithm,
            modified: false,
            resolved: false,
        })
    }

    /// Readable file content has been replaced
    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Restores the original file: the readable copy is removed,
    /// after being compressed back into the original if it was modified.
    pub fn restore(&mut self) -> Result<(), Error> {
        if self.resolved {
            return Ok(());
        }
        self.resolved = true;
        if self.algorithm == Algorithm::None {
            return Ok(());
        }
        if self.modified {
            compress(&self.plain, &self.original, self.algorithm)?;
            debug!(
                "{} compressed back to {}",
                self.plain.display(),
                self.original.display()
            );
        }
        remove_file(&self.plain)?;
        Ok(())
    }
}

/// [CompressionJobs] owns every [CompressionJob] of a run.
/// Pending jobs are restored when dropped.
#[derive(Debug, Default)]
pub struct CompressionJobs {
    jobs: Vec<CompressionJob>,
}

impl CompressionJobs {
    /// Makes `path` readable and returns the readable path
    pub fn decompress(&mut self, path: &Path) -> Result<PathBuf, Error> {
        if let Some(job) = self
            .jobs
            .iter()
            .find(|job| !job.resolved && (job.plain == path || job.original == path))
        {
            return Ok(job.plain.clone());
        }
        let job = CompressionJob::decompress(path)?;
        let plain = job.plain.clone();
        self.jobs.push(job);
        Ok(plain)
    }

    /// Job working on this readable file
    pub fn job(&self, plain: &Path) -> Option<&CompressionJob> {
        self.jobs.iter().find(|job| job.plain == plain)
    }

    /// True if this path is an input file, as found or made readable
    pub fn is_input(&self, path: &Path) -> bool {
        self.jobs
            .iter()
            .any(|job| job.plain == path || job.original == path)
    }

    /// Declares that this readable file has been rewritten
    pub fn mark_modified(&mut self, plain: &Path) {
        if let Some(job) = self.jobs.iter_mut().find(|job| job.plain == plain) {
            job.mark_modified();
        }
    }

    /// Restores this readable file only
    pub fn restore(&mut self, plain: &Path) -> Result<(), Error> {
        match self.jobs.iter_mut().find(|job| job.plain == plain) {
            Some(job) => job.restore(),
            None => Ok(()),
        }
    }

    /// Restores all pending jobs. Every job is attempted,
    /// the first error is reported.
    pub fn restore_all(&mut self) -> Result<(), Error> {
        let mut ret = Ok(());
        for job in self.jobs.iter_mut() {
            if let Err(e) = job.restore() {
                error!("failed to restore {}: {}", job.original.display(), e);
                if ret.is_ok() {
                    ret = Err(e);
                }
            }
        }
        ret
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl Drop for CompressionJobs {
    fn drop(&mut self) {
        let _ = self.restore_all();
    }
}
