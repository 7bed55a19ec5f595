//! Record extraction and file catenation.
use crate::{
    epoch::{EpochRecord, Timestamp},
    filter::{GnssFilter, SatelliteSet},
    header::{Header, TIME_OF_LAST_OBS},
    scanner::EpochScanner,
    scratch::Scratch,
    Error,
};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// What we learnt from a record, while copying it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSummary {
    /// Number of epoch blocks (events included)
    pub epochs: usize,
    /// First block timestamp
    pub first: Option<Timestamp>,
    /// Last block timestamp
    pub last: Option<Timestamp>,
    /// Retained satellites
    pub satellites: SatelliteSet,
}

impl RecordSummary {
    /// Accounts for one more epoch block
    pub fn count(&mut self, record: &EpochRecord) {
        self.epochs += 1;
        if self.first.is_none() {
            self.first = Some(record.timestamp);
        }
        self.last = Some(record.timestamp);
    }
}

/// Copies the record of the file located at `path` into `writer`,
/// applying [GnssFilter] on the way. Returns the file [Header].
pub fn extract<W: Write>(
    path: &Path,
    filter: &GnssFilter,
    writer: &mut W,
    summary: &mut RecordSummary,
) -> Result<Header, Error> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = Header::read(&mut reader)?;
    header.check_observation()?;

    let epochs = summary.epochs;
    for record in EpochScanner::new(reader) {
        let mut record = record?;
        filter.apply(&mut record, &mut summary.satellites);
        summary.count(&record);
        record.format(writer)?;
    }
    debug!("{}: {} epochs", path.display(), summary.epochs - epochs);
    Ok(header)
}

/// Result of a catenation
#[derive(Debug, Clone)]
pub struct Concatenation {
    /// Header of the catenated file
    pub header: Header,
    /// Catenated record, in scratch directory
    pub body: PathBuf,
    /// Catenated record summary
    pub summary: RecordSummary,
    /// Files that were catenated, with their own header, in order
    pub sources: Vec<(PathBuf, Header)>,
}

/// Catenates the records of all `inputs`, in order, into the scratch directory.
/// The first file header serves as template, "TIME OF LAST OBS" comes
/// from the last file. Returns None when the catenated record is empty.
pub fn catenate<P: AsRef<Path>>(
    inputs: &[P],
    filter: &GnssFilter,
    scratch: &Scratch,
    comments: &[String],
) -> Result<Option<Concatenation>, Error> {
    let body = scratch.body_path();
    let mut writer = scratch.create(&body)?;
    let mut summary = RecordSummary::default();
    let mut sources = Vec::with_capacity(inputs.len());

    for input in inputs {
        let path = input.as_ref();
        let header = extract(path, filter, &mut writer, &mut summary)?;
        sources.push((path.to_path_buf(), header));
    }
    writer.flush()?;
    drop(writer);

    let (first, last) = match (sources.first(), sources.last()) {
        (Some((_, first)), Some((_, last))) if summary.epochs > 0 => (first, last),
        _ => {
            debug!("no epochs to write");
            scratch.discard(&body);
            return Ok(None);
        },
    };

    let mut header = first.rewrite_for_exclusion(filter.exclusion(), summary.satellites.len());
    header.insert_comments(comments)?;
    if header.contains(TIME_OF_LAST_OBS) {
        if let Some(last_obs) = last.field(TIME_OF_LAST_OBS).first() {
            header.replace_field(TIME_OF_LAST_OBS, last_obs);
        }
    }

    debug!(
        "catenated {} files: {} epochs, {} satellites",
        sources.len(),
        summary.epochs,
        summary.satellites.len()
    );

    Ok(Some(Concatenation {
        header,
        body,
        summary,
        sources,
    }))
}
