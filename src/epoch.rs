//! Epoch descriptors of the Observation record, and day arithmetics.
//!
//! A V3 epoch block starts with a descriptor line
//! ```text
//! > 2023 05 30 00 00  0.0000000  0 31
//! ```
//! where column 32 is the epoch flag and columns 33-35 the number of
//! lines that follow. When the flag is < 2, each of these lines starts
//! with a satellite identifier (`G01`, `R24`..), otherwise they are
//! event records we never interprete.
use hifitime::{Epoch, Unit};
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("expecting \"> yyyy mm dd hh mm ss.sssssss  f nnn\" format: \"{0}\"")]
    FormatError(String),
    #[error("failed to parse years from \"{0}\"")]
    YearField(String),
    #[error("failed to parse months from \"{0}\"")]
    MonthField(String),
    #[error("failed to parse days from \"{0}\"")]
    DayField(String),
    #[error("failed to parse hours from \"{0}\"")]
    HoursField(String),
    #[error("failed to parse minutes field from \"{0}\"")]
    MinutesField(String),
    #[error("failed to parse seconds field from \"{0}\"")]
    SecondsField(String),
    #[error("invalid calendar date \"{0}\"")]
    InvalidDate(String),
    #[error("invalid epoch flag: \"{0}\"")]
    EpochFlag(String),
    #[error("invalid number of satellites: \"{0}\"")]
    NumSat(String),
}

/// Calendar description of an observation instant, exactly as
/// encoded in the file. Seconds are fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamp {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: f64,
}

impl Timestamp {
    /// Parses "yyyy mm dd hh mm ss.sssssss"
    pub fn parse(content: &str) -> Result<Self, ParsingError> {
        let items = content.split_ascii_whitespace().collect::<Vec<_>>();
        if items.len() != 6 {
            return Err(ParsingError::FormatError(content.to_string()));
        }
        Ok(Self {
            year: items[0]
                .parse::<i32>()
                .map_err(|_| ParsingError::YearField(items[0].to_string()))?,
            month: items[1]
                .parse::<u8>()
                .map_err(|_| ParsingError::MonthField(items[1].to_string()))?,
            day: items[2]
                .parse::<u8>()
                .map_err(|_| ParsingError::DayField(items[2].to_string()))?,
            hour: items[3]
                .parse::<u8>()
                .map_err(|_| ParsingError::HoursField(items[3].to_string()))?,
            minute: items[4]
                .parse::<u8>()
                .map_err(|_| ParsingError::MinutesField(items[4].to_string()))?,
            second: items[5]
                .parse::<f64>()
                .map_err(|_| ParsingError::SecondsField(items[5].to_string()))?,
        })
    }

    /// Converts to [Epoch]. Calendar values are interpreted in UTC,
    /// whatever the file time system: we only compare timestamps
    /// against calendar boundaries.
    pub fn to_epoch(&self) -> Result<Epoch, ParsingError> {
        let invalid = || ParsingError::InvalidDate(format!("{:?}", self));
        if !(0.0..61.0).contains(&self.second) {
            return Err(invalid());
        }
        let ss = self.second.trunc();
        let ns = (((self.second - ss) * 1.0E9).round() as u32).min(999_999_999);
        Epoch::maybe_from_gregorian_utc(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            ss as u8,
            ns,
        )
        .map_err(|_| invalid())
    }

    /// MJD of this calendar day
    pub fn mjd(&self) -> i32 {
        let midnight = Epoch::from_gregorian_utc_at_midnight(self.year, self.month, self.day);
        midnight.to_mjd_utc_days().round() as i32
    }

    /// Rollover boundary: the UTC midnight that ends this calendar day.
    pub fn rollover_boundary(&self) -> Epoch {
        mjd_midnight(self.mjd() + 1)
    }

    /// Formats this instant as the content of the
    /// "TIME OF FIRST OBS" or "TIME OF LAST OBS" header fields.
    pub fn format_obs_time(&self, time_system: &str) -> String {
        format!(
            "{:6}{:6}{:6}{:6}{:6}{:13.7}     {}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, time_system,
        )
    }
}

/// UTC midnight starting given MJD
pub fn mjd_midnight(mjd: i32) -> Epoch {
    let (y, m, d, _, _, _, _) = Epoch::from_mjd_utc(mjd as f64).to_gregorian_utc();
    Epoch::from_gregorian_utc_at_midnight(y, m, d)
}

/// Converts MJD to (year, day of year)
pub fn mjd_to_date(mjd: i32) -> (i32, u16) {
    let (y, m, d, _, _, _, _) = Epoch::from_mjd_utc(mjd as f64).to_gregorian_utc();
    let new_year = Epoch::from_gregorian_utc_at_midnight(y, 1, 1);
    let midnight = Epoch::from_gregorian_utc_at_midnight(y, m, d);
    let doy = (midnight - new_year).to_unit(Unit::Day).round() as u16 + 1;
    (y, doy)
}

/// Converts (year, day of year) to MJD
pub fn date_to_mjd(year: i32, doy: u16) -> i32 {
    let new_year = Epoch::from_gregorian_utc_at_midnight(year, 1, 1);
    new_year.to_mjd_utc_days().round() as i32 + doy as i32 - 1
}

/// One epoch block of the Observation record
#[derive(Debug, Clone, PartialEq)]
pub struct EpochRecord {
    /// Descriptor line, starting with '>'
    pub line: String,
    /// Calendar timestamp
    pub timestamp: Timestamp,
    /// Sampling instant
    pub epoch: Epoch,
    /// Epoch flag
    pub flag: u8,
    /// Number of lines announced by the descriptor
    pub count: usize,
    /// Lines following the descriptor, in file order
    pub lines: Vec<String>,
}

impl EpochRecord {
    /// Returns true if given line starts a new epoch block
    pub fn is_new_epoch(line: &str) -> bool {
        line.starts_with('>')
    }

    /// Parses an epoch descriptor line. Following lines are to be
    /// pushed by the caller.
    pub fn parse(line: &str) -> Result<Self, ParsingError> {
        Self::parse_after(line, None)
    }

    /// Parses an epoch descriptor line, that follows `previous` in the record.
    /// Event descriptors (flag > 1) may omit their date, they then inherit
    /// the previous timestamp.
    pub fn parse_after(line: &str, previous: Option<&Timestamp>) -> Result<Self, ParsingError> {
        if !Self::is_new_epoch(line) || line.len() < 33 {
            return Err(ParsingError::FormatError(line.to_string()));
        }

        let flag = line
            .get(31..32)
            .ok_or_else(|| ParsingError::EpochFlag(line.to_string()))?;
        let flag = flag
            .trim()
            .parse::<u8>()
            .map_err(|_| ParsingError::EpochFlag(flag.to_string()))?;

        let datetime = line
            .get(1..29)
            .ok_or_else(|| ParsingError::FormatError(line.to_string()))?;
        let timestamp = match previous {
            Some(previous) if flag > 1 && datetime.trim().is_empty() => *previous,
            _ => Timestamp::parse(datetime)?,
        };
        let epoch = timestamp.to_epoch()?;

        let count = line
            .get(32..36)
            .or_else(|| line.get(32..))
            .ok_or_else(|| ParsingError::NumSat(line.to_string()))?;
        let count = count
            .trim()
            .parse::<usize>()
            .map_err(|_| ParsingError::NumSat(count.to_string()))?;

        Ok(Self {
            line: line.to_string(),
            timestamp,
            epoch,
            flag,
            count,
            lines: Vec::with_capacity(count),
        })
    }

    /// True when following lines are satellite measurements
    pub fn has_satellites(&self) -> bool {
        self.flag < 2
    }

    /// Returns the satellite identifier of given measurement line
    pub fn satellite(line: &str) -> &str {
        line.get(..3).unwrap_or(line)
    }

    /// Iterates the satellite identifiers of this block. Empty when
    /// lines are event records.
    pub fn satellites(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines
            .iter()
            .filter(|_| self.has_satellites())
            .map(|line| Self::satellite(line))
    }

    /// Rewrites the number of lines (columns 33-35), leaving all other
    /// columns untouched.
    pub fn set_count(&mut self, count: usize) {
        let head = self.line.get(..32).unwrap_or(&self.line);
        let tail = self.line.get(35..).unwrap_or("");
        self.line = format!("{:<32}{:3}{}", head, count, tail);
        self.count = count;
    }

    /// Writes this block
    pub fn format<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        writeln!(w, "{}", self.line)?;
        for line in self.lines.iter() {
            writeln!(w, "{}", line)?;
        }
        Ok(())
    }
}
