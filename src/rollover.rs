//! Day rollover repair.
//!
//! Some receivers close their daily files on a time scale that is not
//! the one that dates the observations. The last epochs of a day
//! then end up leading the next file, or the other way around.
//! We repair that by splitting a catenated record again, on the
//! midnights the epochs actually describe.
use crate::{
    catenate::{Concatenation, RecordSummary},
    epoch::mjd_midnight,
    filename::FileName,
    filter::{ExclusionSet, GnssFilter},
    header::{Header, TIME_OF_FIRST_OBS, TIME_OF_LAST_OBS},
    scanner::EpochScanner,
    scratch::Scratch,
    Error,
};
use hifitime::Epoch;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// One reassembled day
#[derive(Debug, Clone)]
pub struct DailySplit {
    /// File this day replaces
    pub source: PathBuf,
    /// Header of this day
    pub header: Header,
    /// Record of this day, in scratch directory
    pub body: PathBuf,
    /// Record summary
    pub summary: RecordSummary,
}

/*
 * UTC midnight that ends the day this file is named after
 */
fn nominal_boundary(source: &Path) -> Option<Epoch> {
    let name = FileName::parse(&source.to_string_lossy()).ok()?;
    Some(mjd_midnight(name.mjd() + 1))
}

/// Splits a [Concatenation] back into its source days.
/// A day ends on the midnight that follows the day its file is named
/// after (or, for non standard names, the day of its first epoch).
/// Epochs past that boundary lead the next day, the last day
/// absorbs everything that remains. Days that do not
/// receive any epoch are not returned, and their file is left untouched.
pub fn reassemble(
    concatenation: &Concatenation,
    exclusion: &ExclusionSet,
    scratch: &Scratch,
    comments: &[String],
) -> Result<Vec<DailySplit>, Error> {
    let reader = BufReader::new(File::open(&concatenation.body)?);
    let mut scanner = EpochScanner::new(reader).peekable();

    // record is already filtered, we only collect satellites
    let collector = GnssFilter::default();

    let ndays = concatenation.sources.len();
    let mut splits = Vec::with_capacity(ndays);

    for (nth, (source, template)) in concatenation.sources.iter().enumerate() {
        let is_last = nth + 1 == ndays;
        let body = scratch.daily_path(nth);
        let mut writer = scratch.create(&body)?;
        let mut summary = RecordSummary::default();
        let mut boundary = nominal_boundary(source);

        while let Some(record) = scanner.next_if(|record| match record {
            Ok(record) => is_last || boundary.map_or(true, |boundary| record.epoch < boundary),
            Err(_) => true,
        }) {
            let mut record = record?;
            if boundary.is_none() {
                boundary = Some(record.timestamp.rollover_boundary());
            }
            collector.apply(&mut record, &mut summary.satellites);
            summary.count(&record);
            record.format(&mut writer)?;
        }
        writer.flush()?;
        drop(writer);

        let (first, last) = match (summary.first, summary.last) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                debug!("{}: no epochs, left untouched", source.display());
                scratch.discard(&body);
                continue;
            },
        };

        let time_system = template.time_system();
        let mut header = template.rewrite_for_exclusion(exclusion, summary.satellites.len());
        header.insert_comments(comments)?;
        header.replace_field(TIME_OF_FIRST_OBS, &first.format_obs_time(&time_system));
        if header.contains(TIME_OF_LAST_OBS) {
            header.replace_field(TIME_OF_LAST_OBS, &last.format_obs_time(&time_system));
        }

        debug!(
            "{}: {} epochs, {} satellites",
            source.display(),
            summary.epochs,
            summary.satellites.len()
        );

        splits.push(DailySplit {
            source: source.clone(),
            header,
            body,
            summary,
        });
    }

    Ok(splits)
}
