//! File assembly and placement.
use crate::{
    compression::CompressionJobs, header::Header, opts::Placement, scratch::Scratch, Error,
};
use std::fs::{copy, remove_file, File};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// Where a result ended up
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Result was written to its destination
    Written(PathBuf),
    /// Result was left in the scratch directory
    Scratch(PathBuf),
}

/// Writes `header` followed by the record stored in `body`, into
/// the nth assembly file of the scratch directory. `body` is discarded.
pub fn assemble(
    header: &Header,
    body: &Path,
    scratch: &Scratch,
    nth: usize,
) -> Result<PathBuf, Error> {
    let path = scratch.assembly_path(nth);
    let mut writer = scratch.create(&path)?;
    header.format(&mut writer)?;
    let mut reader = BufReader::new(File::open(body)?);
    std::io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    scratch.discard(body);
    debug!("{} assembled", path.display());
    Ok(path)
}

fn base_name(path: &Path) -> PathBuf {
    path.file_name().map(PathBuf::from).unwrap_or_default()
}

/*
 * copies, then removes the scratch file
 */
fn deliver(assembled: &Path, destination: &Path) -> Result<(), Error> {
    if assembled == destination {
        return Ok(());
    }
    copy(assembled, destination)?;
    remove_file(assembled)?;
    Ok(())
}

/// Moves an assembled file to its final location.
/// `source` is the (readable) file this result originates from,
/// None for catenated results. Results delivered into a directory are
/// named after their source, catenated results keep their scratch name.
/// Only [Placement::Replace] may overwrite an input file.
pub fn place(
    assembled: &Path,
    source: Option<&Path>,
    placement: &Placement,
    jobs: &mut CompressionJobs,
) -> Result<Outcome, Error> {
    match (source, placement) {
        (Some(source), Placement::Replace { backup }) => {
            if *backup {
                let original = jobs
                    .job(source)
                    .map(|job| job.original.clone())
                    .unwrap_or_else(|| source.to_path_buf());
                let mut backup = original.clone().into_os_string();
                backup.push(".original");
                copy(&original, &backup)?;
                debug!("{} backed up", original.display());
            }
            deliver(assembled, source)?;
            jobs.mark_modified(source);
            info!("{} replaced", source.display());
            Ok(Outcome::Written(source.to_path_buf()))
        },
        (_, Placement::Output(destination)) => {
            let destination = if destination.is_dir() {
                destination.join(base_name(source.unwrap_or(assembled)))
            } else {
                destination.clone()
            };
            if jobs.is_input(&destination) {
                return Err(Error::InputOverwrite(destination));
            }
            deliver(assembled, &destination)?;
            info!("{} generated", destination.display());
            Ok(Outcome::Written(destination))
        },
        _ => {
            info!("result left in {}", assembled.display());
            Ok(Outcome::Scratch(assembled.to_path_buf()))
        },
    }
}
