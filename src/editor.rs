//! Editing run.
use crate::{
    catenate::catenate,
    compression::{CompressionJobs, Error as CompressionError},
    filter::GnssFilter,
    header::Header,
    opts::Opts,
    output::{assemble, place, Outcome},
    rollover::reassemble,
    scratch::Scratch,
    Error,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// What a run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Files written to their destination
    pub outputs: Vec<PathBuf>,
    /// Files left in the scratch directory
    pub scratch: Vec<PathBuf>,
    /// Inputs that could not be found
    pub missing: Vec<PathBuf>,
}

impl Report {
    fn push(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written(path) => self.outputs.push(path),
            Outcome::Scratch(path) => self.scratch.push(path),
        }
    }
}

/*
 * only V3 (and later) is supported
 */
fn check_version(path: &Path) -> Result<(), Error> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = Header::read(&mut reader)?;
    let version = header.version()?;
    if !version.is_supported() {
        return Err(Error::UnsupportedVersion {
            version,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Runs the editions described by [Opts].
/// Every file we had to decompress is restored before returning,
/// whatever the outcome.
pub fn run(opts: &Opts) -> Result<Report, Error> {
    if !opts.has_work() {
        return Err(Error::NothingToDo);
    }

    let inputs = opts.input_paths()?;
    let scratch = Scratch::new(&opts.tmp_dir);
    let filter = GnssFilter::new(opts.exclusion.clone());
    let comments = opts.comments();

    let mut jobs = CompressionJobs::default();
    let mut report = Report::default();

    let mut readable = Vec::with_capacity(inputs.len());
    for input in inputs.iter() {
        match jobs.decompress(input) {
            Ok(path) => readable.push(path),
            Err(CompressionError::MissingFile(path)) => {
                debug!("{} is missing", path.display());
                report.missing.push(path);
            },
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(first) = readable.first() {
        check_version(first)?;
    }

    if opts.catenates() {
        let concatenation = match catenate(&readable, &filter, &scratch, &comments)? {
            Some(concatenation) => concatenation,
            None => {
                debug!("nothing to write");
                jobs.restore_all()?;
                return Ok(report);
            },
        };

        if opts.fix_missing {
            let splits = reassemble(&concatenation, filter.exclusion(), &scratch, &comments)?;
            scratch.discard(&concatenation.body);
            for (nth, split) in splits.iter().enumerate() {
                let assembled = assemble(&split.header, &split.body, &scratch, nth)?;
                let outcome = place(
                    &assembled,
                    Some(split.source.as_path()),
                    &opts.placement,
                    &mut jobs,
                )?;
                report.push(outcome);
            }
        } else {
            let assembled = assemble(&concatenation.header, &concatenation.body, &scratch, 0)?;
            let outcome = place(&assembled, None, &opts.placement, &mut jobs)?;
            report.push(outcome);
        }
    } else {
        let mut nth = 0;
        for path in readable.iter() {
            let edited = match catenate(&[path], &filter, &scratch, &comments)? {
                Some(edited) => edited,
                None => {
                    debug!("{}: nothing to write", path.display());
                    continue;
                },
            };
            let assembled = assemble(&edited.header, &edited.body, &scratch, nth)?;
            let outcome = place(&assembled, Some(path.as_path()), &opts.placement, &mut jobs)?;
            report.push(outcome);
            nth += 1;
        }
    }

    jobs.restore_all()?;
    Ok(report)
}
