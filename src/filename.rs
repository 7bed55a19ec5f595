//! Standard RINEX file names, and name templates.
//!
//! Two naming conventions are recognized:
//! - the short (V2) convention `SSSSDDD0.YYt`, where `t` is `o` for
//!   Observation and `d` for Hatanaka compressed Observation,
//! - the long (V3) convention `SSSSSSSSS_S_YYYYDDDHHMM_PPP_FFF_TT.ext`.
//!
//! Both may be followed by a compression extension (`.gz`, `.Z`).
use crate::epoch::{date_to_mjd, mjd_to_date};
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

lazy_static! {
    static ref SHORT_NAME: Regex =
        Regex::new(r"^(\w{4})(\d{3})0\.(\d{2})([oOdD](?:\.\w{1,3})?)$").unwrap();
    static ref LONG_NAME: Regex = Regex::new(
        r"^(\w{9})_(\w)_(\d{4})(\d{3})(\d{4})_(\w{3})_(\w{3})_(\w{2})\.(\w{3}(?:\.\w{1,3})?)$"
    )
    .unwrap();
}

/// MJD used to verify templates
const TEMPLATE_CHECK_MJD: i32 = 60_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("file name \"{0}\" does not follow RINEX naming conventions")]
    FormatError(String),
    #[error("template \"{0}\" does not generate standard RINEX file names")]
    TemplateError(String),
}

/// Naming convention
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NamingVersion {
    /// Short `SSSSDDD0.YYt` names
    V2,
    /// Long `SSSSSSSSS_S_YYYYDDDHHMM_PPP_FFF_TT.ext` names
    V3,
}

impl std::fmt::Display for NamingVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::V2 => write!(f, "V2"),
            Self::V3 => write!(f, "V3"),
        }
    }
}

/// Fields that only exist in long file names
#[derive(Debug, Clone, PartialEq)]
pub struct LongNameDetails {
    /// Data source (R: receiver, S: stream, U: unknown)
    pub data_source: String,
    /// Start of period, as HHMM
    pub start: String,
    /// File period, like 01D
    pub period: String,
    /// Data frequency, like 30S
    pub frequency: String,
    /// File type, like MO
    pub file_type: String,
}

/// Standard RINEX file name
#[derive(Debug, Clone, PartialEq)]
pub struct FileName {
    /// Directory part, possibly empty
    pub directory: PathBuf,
    /// Naming convention
    pub version: NamingVersion,
    /// Station: 4 characters (V2), 9 characters (V3)
    pub station: String,
    /// Year, 4 digits
    pub year: i32,
    /// Day of year
    pub doy: u16,
    /// Everything behind the last mandatory separator:
    /// type letter (V2) or format extension (V3),
    /// then possible compression extension
    pub extension: String,
    /// Long names only
    pub details: Option<LongNameDetails>,
}

impl std::str::FromStr for FileName {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

impl FileName {
    /// Parses a standard file name. Only the last path component
    /// must follow the convention.
    pub fn parse(path: &str) -> Result<Self, Error> {
        let error = || Error::FormatError(path.to_string());
        let as_path = Path::new(path);
        let name = as_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(error)?;
        let directory = as_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();

        if let Some(caps) = SHORT_NAME.captures(name) {
            let yy = caps[3].parse::<i32>().map_err(|_| error())?;
            let year = if yy > 80 { 1900 + yy } else { 2000 + yy };
            let doy = caps[2].parse::<u16>().map_err(|_| error())?;
            if doy == 0 || doy > 366 {
                return Err(error());
            }
            return Ok(Self {
                directory,
                version: NamingVersion::V2,
                station: caps[1].to_string(),
                year,
                doy,
                extension: caps[4].to_string(),
                details: None,
            });
        }

        if let Some(caps) = LONG_NAME.captures(name) {
            let year = caps[3].parse::<i32>().map_err(|_| error())?;
            let doy = caps[4].parse::<u16>().map_err(|_| error())?;
            if doy == 0 || doy > 366 {
                return Err(error());
            }
            return Ok(Self {
                directory,
                version: NamingVersion::V3,
                station: caps[1].to_string(),
                year,
                doy,
                extension: caps[9].to_string(),
                details: Some(LongNameDetails {
                    data_source: caps[2].to_string(),
                    start: caps[5].to_string(),
                    period: caps[6].to_string(),
                    frequency: caps[7].to_string(),
                    file_type: caps[8].to_string(),
                }),
            });
        }

        Err(error())
    }

    /// Generates the file name of given MJD, from a template where
    /// `YYYY`, `YY` and `DDD` are replaced, in that order.
    pub fn generate(mjd: i32, template: &str) -> String {
        let (year, doy) = mjd_to_date(mjd);
        template
            .replace("YYYY", &format!("{:04}", year))
            .replace("YY", &format!("{:02}", year.rem_euclid(100)))
            .replace("DDD", &format!("{:03}", doy))
    }

    /// Verifies that a template generates standard names
    pub fn validate_template(template: &str) -> Result<(), Error> {
        let generated = Self::generate(TEMPLATE_CHECK_MJD, template);
        Self::parse(&generated)
            .map(|_| ())
            .map_err(|_| Error::TemplateError(template.to_string()))
    }

    /// Two digit year
    pub fn yy(&self) -> i32 {
        self.year.rem_euclid(100)
    }

    /// Nominal day of this file, as MJD
    pub fn mjd(&self) -> i32 {
        date_to_mjd(self.year, self.doy)
    }

    /// Returns the same name for another day
    pub fn with_date(&self, year: i32, doy: u16) -> Self {
        let mut s = self.clone();
        s.year = year;
        s.doy = doy;
        s
    }

    /// Returns the same name for given MJD
    pub fn with_mjd(&self, mjd: i32) -> Self {
        let (year, doy) = mjd_to_date(mjd);
        self.with_date(year, doy)
    }

    /// Returns the same name located in another directory
    pub fn with_directory(&self, directory: &Path) -> Self {
        let mut s = self.clone();
        s.directory = directory.to_path_buf();
        s
    }

    /// File type (long names only)
    pub fn file_type(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.file_type.as_str())
    }

    /// Returns the name of the first field that prevents
    /// these two names from belonging to the same sequence
    pub fn mismatch(&self, rhs: &Self) -> Option<&'static str> {
        if self.directory != rhs.directory {
            Some("directory")
        } else if self.version != rhs.version {
            Some("naming version")
        } else if self.station != rhs.station {
            Some("station")
        } else if self.file_type() != rhs.file_type() {
            Some("file type")
        } else {
            None
        }
    }

    /// True if both names may belong to the same daily sequence
    pub fn is_sequence_compatible(&self, rhs: &Self) -> bool {
        self.mismatch(rhs).is_none()
    }

    /// File name, without directory
    pub fn name(&self) -> String {
        match &self.details {
            None => format!(
                "{}{:03}0.{:02}{}",
                self.station,
                self.doy,
                self.yy(),
                self.extension
            ),
            Some(details) => format!(
                "{}_{}_{:04}{:03}{}_{}_{}_{}.{}",
                self.station,
                details.data_source,
                self.year,
                self.doy,
                details.start,
                details.period,
                details.frequency,
                details.file_type,
                self.extension
            ),
        }
    }

    /// Complete path
    pub fn path(&self) -> PathBuf {
        self.directory.join(self.name())
    }
}
