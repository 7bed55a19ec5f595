//! RINEX header section, as an ordered list of labelized lines.
//!
//! We do not interprete the header: we only need to locate a few fields,
//! rewrite them, and drop the tables of excluded constellations.
//! Everything else is reproduced as is.
use crate::{
    filter::ExclusionSet,
    fmt_comment, fmt_rinex, read_line,
    version::{ParsingError as VersionParsingError, Version},
    END_OF_HEADER,
};

use std::io::{BufRead, Write};
use thiserror::Error;

/// "RINEX VERSION / TYPE" label
pub const VERSION_TYPE: &str = "RINEX VERSION / TYPE";
/// "PGM / RUN BY / DATE" label
pub const PGM_RUN_BY_DATE: &str = "PGM / RUN BY / DATE";
/// "COMMENT" label
pub const COMMENT: &str = "COMMENT";
/// "SYS / # / OBS TYPES" label
pub const OBS_TYPES: &str = "SYS / # / OBS TYPES";
/// "SYS / PHASE SHIFT" label
pub const PHASE_SHIFT: &str = "SYS / PHASE SHIFT";
/// "SYS / DCBS APPLIED" label
pub const DCBS_APPLIED: &str = "SYS / DCBS APPLIED";
/// "SYS / PCVS APPLIED" label
pub const PCVS_APPLIED: &str = "SYS / PCVS APPLIED";
/// "PRN / # OF OBS" label
pub const PRN_NUM_OBS: &str = "PRN / # OF OBS";
/// "# OF SATELLITES" label
pub const NUM_SATELLITES: &str = "# OF SATELLITES";
/// "TIME OF FIRST OBS" label
pub const TIME_OF_FIRST_OBS: &str = "TIME OF FIRST OBS";
/// "TIME OF LAST OBS" label
pub const TIME_OF_LAST_OBS: &str = "TIME OF LAST OBS";

// Observables per "SYS / # / OBS TYPES" line
const OBS_TYPES_PER_LINE: usize = 13;
// Satellites per "SYS / PHASE SHIFT" line
const PHASE_SHIFTS_PER_LINE: usize = 10;

#[derive(Error, Debug)]
pub enum Error {
    #[error("header is missing the \"END OF HEADER\" marker")]
    TruncatedHeader,
    #[error("missing mandatory \"{0}\" header field")]
    MissingField(&'static str),
    #[error("bad \"RINEX VERSION / TYPE\": {0}")]
    VersionError(#[from] VersionParsingError),
    #[error("not an Observation RINEX: \"{0}\"")]
    NotObservation(String),
    #[error("failed to read header: {0}")]
    IoError(#[from] std::io::Error),
}

/// One header line: 60 columns of content, followed by its label
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLine(String);

impl std::fmt::Display for HeaderLine {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HeaderLine {
    fn from(line: &str) -> Self {
        Self(line.to_string())
    }
}

impl HeaderLine {
    /// Builds a new [HeaderLine]
    pub fn new(content: &str, label: &str) -> Self {
        Self(fmt_rinex(content, label))
    }
    /// Builds a new COMMENT [HeaderLine]
    pub fn comment(content: &str) -> Self {
        Self(fmt_comment(content))
    }
    /// Complete line
    pub fn as_str(&self) -> &str {
        &self.0
    }
    /// Columns 1-60
    pub fn content(&self) -> &str {
        self.0.get(..60).unwrap_or(&self.0)
    }
    /// Columns 61-80, as written in the file
    fn raw_label(&self) -> &str {
        self.0.get(60..).unwrap_or("")
    }
    /// Columns 61-80, trimmed
    pub fn label(&self) -> &str {
        self.raw_label().trim()
    }
    /// True if this line carries given label
    pub fn is(&self, label: &str) -> bool {
        self.label().starts_with(label)
    }
    /// Constellation code of system dependent records
    pub fn system(&self) -> Option<char> {
        self.0.chars().next().filter(|c| c.is_ascii_alphabetic())
    }
    /// Returns a copy of Self with new content and the very same label
    pub fn with_content(&self, content: &str) -> Self {
        let content: String = content.chars().take(60).collect();
        Self(format!("{:<60}{}", content, self.raw_label()))
    }
    /// Returns given column range, if it exists
    fn columns(&self, range: std::ops::Range<usize>) -> Option<&str> {
        self.0.get(range)
    }
}

/// RINEX header section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    lines: Vec<HeaderLine>,
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for line in self.lines.iter() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/*
 * Number of continuation lines a table record owns,
 * from its item counter.
 */
fn continuation_lines(counter: Option<&str>, items_per_line: usize) -> usize {
    match counter.and_then(|c| c.trim().parse::<usize>().ok()) {
        Some(n) if n > 0 => num_integer::div_ceil(n, items_per_line) - 1,
        _ => 0,
    }
}

impl Header {
    /// Parses [Header] by consuming [BufRead] until end of this section.
    /// [BufRead] is left at the beginning of the record.
    pub fn read<R: BufRead>(reader: &mut R) -> Result<Self, Error> {
        let mut lines = Vec::with_capacity(64);
        let mut buf = String::with_capacity(128);
        while read_line(reader, &mut buf)? {
            let line = HeaderLine::from(buf.as_str());
            let end = line.is(END_OF_HEADER);
            lines.push(line);
            if end {
                return Ok(Self { lines });
            }
        }
        Err(Error::TruncatedHeader)
    }

    /// Header lines, in file order
    pub fn lines(&self) -> &[HeaderLine] {
        &self.lines
    }

    /// Returns content (columns 1-60) of all lines carrying this label,
    /// in file order.
    pub fn field(&self, label: &str) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.is(label))
            .map(|l| l.content())
            .collect()
    }

    /// True if at least one line carries this label
    pub fn contains(&self, label: &str) -> bool {
        self.lines.iter().any(|l| l.is(label))
    }

    /// Replaces the content of the first line carrying this label.
    /// Does nothing if this label does not exist.
    pub fn replace_field(&mut self, label: &str, content: &str) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.is(label)) {
            *line = line.with_content(content);
        }
    }

    /// Inserts comments right after "PGM / RUN BY / DATE", which is mandatory.
    pub fn insert_comments<S: AsRef<str>>(&mut self, comments: &[S]) -> Result<(), Error> {
        let pos = self
            .lines
            .iter()
            .position(|l| l.is(PGM_RUN_BY_DATE))
            .ok_or(Error::MissingField(PGM_RUN_BY_DATE))?;
        for (nth, comment) in comments.iter().enumerate() {
            self.lines
                .insert(pos + 1 + nth, HeaderLine::comment(comment.as_ref()));
        }
        Ok(())
    }

    /// Returns RINEX revision
    pub fn version(&self) -> Result<Version, Error> {
        let field = self
            .field(VERSION_TYPE)
            .first()
            .copied()
            .ok_or(Error::MissingField(VERSION_TYPE))?;
        let version = field.get(..9).unwrap_or(field).parse::<Version>()?;
        Ok(version)
    }

    /// Verifies this is an Observation RINEX
    pub fn check_observation(&self) -> Result<(), Error> {
        let field = self
            .field(VERSION_TYPE)
            .first()
            .copied()
            .ok_or(Error::MissingField(VERSION_TYPE))?;
        match field.get(20..21) {
            Some("O") => Ok(()),
            _ => Err(Error::NotObservation(field.trim_end().to_string())),
        }
    }

    /// Time system declared in "TIME OF FIRST OBS" (columns 49-51)
    pub fn time_system(&self) -> String {
        self.field(TIME_OF_FIRST_OBS)
            .first()
            .and_then(|f| f.get(48..51))
            .unwrap_or("")
            .to_string()
    }

    /// Returns a copy of Self where the system dependent tables
    /// of excluded constellations have been removed, and
    /// "# OF SATELLITES" declares `num_sat`.
    pub fn rewrite_for_exclusion(&self, exclusion: &ExclusionSet, num_sat: usize) -> Self {
        let excluded = |line: &HeaderLine| line.system().map_or(false, |c| exclusion.excludes(c));

        let mut lines = Vec::with_capacity(self.lines.len());
        let mut dropping_prn_obs = false;
        let mut i = 0;

        while i < self.lines.len() {
            let line = &self.lines[i];

            if line.is(OBS_TYPES) && excluded(line) {
                let n = continuation_lines(line.columns(3..6), OBS_TYPES_PER_LINE);
                debug!("dropping {} observables (+{} lines)", line.content().get(..1).unwrap_or(""), n);
                i += 1 + n;
                continue;
            }

            if line.is(PHASE_SHIFT) && excluded(line) {
                let n = continuation_lines(line.columns(16..18), PHASE_SHIFTS_PER_LINE);
                i += 1 + n;
                continue;
            }

            if (line.is(DCBS_APPLIED) || line.is(PCVS_APPLIED)) && excluded(line) {
                i += 1;
                continue;
            }

            if line.is(PRN_NUM_OBS) {
                let sv = line.columns(3..6).unwrap_or("").trim();
                if !sv.is_empty() {
                    dropping_prn_obs = sv.chars().next().map_or(false, |c| exclusion.excludes(c));
                }
                if dropping_prn_obs {
                    i += 1;
                    continue;
                }
            }

            if line.is(NUM_SATELLITES) {
                lines.push(line.with_content(&format!("{:6}", num_sat)));
                i += 1;
                continue;
            }

            if line.label().contains("GLONASS") && exclusion.excludes('R') {
                i += 1;
                continue;
            }

            lines.push(line.clone());
            i += 1;
        }

        Self { lines }
    }

    /// Formats [Header] into [Write]able interface
    pub fn format<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        write!(w, "{}", self)
    }
}
