//! GNSS exclusion, applied to epoch blocks.
use crate::epoch::EpochRecord;
use gnss::prelude::Constellation;
use itertools::Itertools;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unknown GNSS constellation \"{0}\"")]
    UnknownConstellation(char),
    #[error("\"{0}\" (mixed) can't be excluded, list the constellations")]
    MixedConstellation(char),
}

/// Set of constellations to remove, by their RINEX code letter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionSet(BTreeSet<char>);

impl std::str::FromStr for ExclusionSet {
    type Err = Error;
    /// Parses a list of constellation letters, like "RC".
    /// Spaces and commas are tolerated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = BTreeSet::new();
        for c in s.chars().filter(|c| !c.is_whitespace() && *c != ',') {
            let constellation = c
                .to_string()
                .parse::<Constellation>()
                .map_err(|_| Error::UnknownConstellation(c))?;
            if constellation == Constellation::Mixed {
                return Err(Error::MixedConstellation(c));
            }
            let code = format!("{:x}", constellation);
            set.extend(code.chars());
        }
        Ok(Self(set))
    }
}

impl std::fmt::Display for ExclusionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(""))
    }
}

impl ExclusionSet {
    /// True if this constellation code is to be removed
    pub fn excludes(&self, code: char) -> bool {
        self.0.contains(&code.to_ascii_uppercase())
    }
    /// True when nothing is to be removed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Iterates excluded codes, in alphabetical order
    pub fn iter(&self) -> impl Iterator<Item = &char> + '_ {
        self.0.iter()
    }
}

/// Distinct satellites encountered within a scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SatelliteSet(BTreeSet<String>);

impl SatelliteSet {
    /// Stores one satellite identifier
    pub fn insert(&mut self, sv: &str) {
        if !self.0.contains(sv) {
            self.0.insert(sv.to_string());
        }
    }
    /// Number of distinct satellites
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// True if this satellite was encountered
    pub fn contains(&self, sv: &str) -> bool {
        self.0.contains(sv)
    }
    /// Merges another scope into Self
    pub fn extend(&mut self, rhs: &Self) {
        self.0.extend(rhs.0.iter().cloned());
    }
    pub fn iter(&self) -> impl Iterator<Item = &String> + '_ {
        self.0.iter()
    }
}

/// Applies an [ExclusionSet] to epoch blocks.
#[derive(Debug, Clone, Default)]
pub struct GnssFilter {
    exclusion: ExclusionSet,
}

impl GnssFilter {
    pub fn new(exclusion: ExclusionSet) -> Self {
        Self { exclusion }
    }

    pub fn exclusion(&self) -> &ExclusionSet {
        &self.exclusion
    }

    /// Filters this block in place and stores the retained satellites.
    /// Event records are passed through. The descriptor is only
    /// rewritten when an exclusion is active.
    pub fn apply(&self, record: &mut EpochRecord, satellites: &mut SatelliteSet) {
        if !record.has_satellites() {
            return;
        }
        if !self.exclusion.is_empty() {
            record.lines.retain(|line| {
                line.chars()
                    .next()
                    .map_or(true, |code| !self.exclusion.excludes(code))
            });
            let retained = record.lines.len();
            record.set_count(retained);
        }
        for sv in record.satellites() {
            satellites.insert(sv);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    fn record(descriptor: &str, lines: &[&str]) -> EpochRecord {
        let mut record = EpochRecord::parse(descriptor).unwrap();
        record.lines = lines.iter().map(|l| l.to_string()).collect();
        record
    }

    #[test]
    fn exclusion_parsing() {
        let set = ExclusionSet::from_str("R").unwrap();
        assert!(set.excludes('R'));
        assert!(set.excludes('r'));
        assert!(!set.excludes('G'));

        let set = ExclusionSet::from_str("rc").unwrap();
        assert_eq!(set.to_string(), "CR");

        let set = ExclusionSet::from_str("G, E").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![&'E', &'G']);

        assert!(ExclusionSet::from_str("").unwrap().is_empty());
        assert_eq!(
            ExclusionSet::from_str("GX"),
            Err(Error::UnknownConstellation('X'))
        );
        assert_eq!(
            ExclusionSet::from_str("M"),
            Err(Error::MixedConstellation('M'))
        );
    }

    #[test]
    fn glonass_filter() {
        let filter = GnssFilter::new(ExclusionSet::from_str("R").unwrap());
        let mut satellites = SatelliteSet::default();
        let mut epoch = record(
            "> 2023 05 30 00 00  0.0000000  0  4       0.000000000000",
            &[
                "G01  20147683.700   105876316.54807",
                "R01  21345678.123   114213456.12306",
                "E05  23345678.123   122679034.44109",
                "R02  22345678.123   119213456.12306",
            ],
        );
        filter.apply(&mut epoch, &mut satellites);
        assert_eq!(
            epoch.line,
            "> 2023 05 30 00 00  0.0000000  0  2       0.000000000000"
        );
        assert_eq!(epoch.count, 2);
        assert_eq!(epoch.satellites().collect::<Vec<_>>(), vec!["G01", "E05"]);
        assert_eq!(satellites.len(), 2);
        assert!(!satellites.contains("R01"));
    }

    #[test]
    fn passthrough_without_exclusion() {
        let filter = GnssFilter::default();
        let mut satellites = SatelliteSet::default();
        // announced count is not trusted nor corrected
        let mut epoch = record(
            "> 2023 05 30 00 00  0.0000000  0  3",
            &["G01  20147683.700", "R01  21345678.123"],
        );
        let before = epoch.clone();
        filter.apply(&mut epoch, &mut satellites);
        assert_eq!(epoch, before);
        assert_eq!(satellites.len(), 2);
    }

    #[test]
    fn events_are_not_filtered() {
        let filter = GnssFilter::new(ExclusionSet::from_str("R").unwrap());
        let mut satellites = SatelliteSet::default();
        let mut epoch = record(
            "> 2023 05 30 00 01  0.0000000  4  1",
            &["RECEIVER RESET                                              COMMENT"],
        );
        let before = epoch.clone();
        filter.apply(&mut epoch, &mut satellites);
        assert_eq!(epoch, before);
        assert!(satellites.is_empty());
    }

    #[test]
    fn satellites_accumulation() {
        let filter = GnssFilter::new(ExclusionSet::from_str("C").unwrap());
        let mut satellites = SatelliteSet::default();
        for lines in [
            vec!["G01  1", "C11  2"],
            vec!["G01  1", "G02  2", "C12  3"],
        ] {
            let mut epoch = record("> 2023 05 30 00 00  0.0000000  0  3", &lines);
            filter.apply(&mut epoch, &mut satellites);
            assert!(epoch.lines.iter().all(|l| !l.starts_with('C')));
        }
        assert_eq!(satellites.len(), 2);

        let mut other = SatelliteSet::default();
        other.insert("E05");
        other.insert("G01");
        satellites.extend(&other);
        assert_eq!(
            satellites.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            vec!["E05", "G01", "G02"]
        );
    }
}
