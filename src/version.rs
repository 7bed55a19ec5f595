//! RINEX format revision, as declared in the "RINEX VERSION / TYPE" header field.
use thiserror::Error;

/// Lowest `RINEX` revision this editor accepts.
pub const SUPPORTED_MAJOR: u8 = 3;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("empty version field")]
    Empty,
    #[error("failed to parse version from \"{0}\"")]
    Invalid(String),
}

/// `RINEX` revision, `major.minor`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    /// Version major number
    pub major: u8,
    /// Version minor number
    pub minor: u8,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

impl std::str::FromStr for Version {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParsingError::Empty);
        }
        match s.split_once('.') {
            Some((major, minor)) => Ok(Self {
                major: major
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| ParsingError::Invalid(s.to_string()))?,
                minor: minor
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| ParsingError::Invalid(s.to_string()))?,
            }),
            None => Ok(Self {
                major: s
                    .parse::<u8>()
                    .map_err(|_| ParsingError::Invalid(s.to_string()))?,
                minor: 0,
            }),
        }
    }
}

impl Version {
    /// Builds a new [Version]
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
    /// Returns true if this revision can be edited
    pub fn is_supported(&self) -> bool {
        self.major >= SUPPORTED_MAJOR
    }
}
