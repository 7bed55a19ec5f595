//! RINEX V3 Observation editor.
//!
//! This crate reads RINEX V3 Observation files as they come out of
//! a station archive, and rewrites them:
//!
//! - removing the measurements of one or several GNSS constellations,
//!   both from the header tables and the record,
//! - catenating a daily file sequence into one continuous file,
//! - repairing daily files whose day boundary was drawn at the wrong
//!   instant ("fixmissing"), by catenating the sequence and splitting it
//!   again on the observed UTC midnights.
//!
//! Content is processed line by line and column by column: everything
//! we do not need to modify is passed through as is.
//!
//! ```no_run
//! use rnxedit::prelude::*;
//!
//! let opts = Opts {
//!     inputs: Inputs::Files(vec![
//!         "STAT00AUS_R_20231500000_01D_30S_MO.rnx".to_string(),
//!         "STAT00AUS_R_20231520000_01D_30S_MO.rnx".to_string(),
//!     ]),
//!     catenate: true,
//!     exclusion: "R".parse().unwrap(),
//!     placement: Placement::Output("merged.rnx".into()),
//!     ..Default::default()
//! };
//!
//! let report = rnxedit::editor::run(&opts).unwrap();
//! assert_eq!(report.outputs.len(), 1);
//! ```

extern crate gnss_rs as gnss;

#[macro_use]
extern crate log;

#[macro_use]
extern crate lazy_static;

pub mod catenate;
pub mod compression;
pub mod editor;
pub mod epoch;
pub mod filename;
pub mod filter;
pub mod header;
pub mod opts;
pub mod output;
pub mod rollover;
pub mod scanner;
pub mod scratch;
pub mod sequence;
pub mod version;

mod error;

#[cfg(test)]
mod tests;

/// Package to include all basic structures
pub mod prelude {
    pub use crate::{
        compression::{Algorithm, CompressionJob, CompressionJobs},
        editor::Report,
        epoch::{EpochRecord, Timestamp},
        error::Error,
        filename::{FileName, NamingVersion},
        filter::{ExclusionSet, GnssFilter, SatelliteSet},
        header::{Header, HeaderLine},
        opts::{Inputs, Opts, Placement},
        scanner::EpochScanner,
        sequence::FileSequence,
        version::Version,
    };
    // pub re-export
    pub use gnss::prelude::Constellation;
    pub use hifitime::Epoch;
}

pub use error::Error;

/// Header label terminating the header section.
pub const END_OF_HEADER: &str = "END OF HEADER";

/*
 * reads next line into buf, stripping line termination.
 * returns false at end of input
 */
pub(crate) fn read_line<R: std::io::BufRead>(
    reader: &mut R,
    buf: &mut String,
) -> std::io::Result<bool> {
    buf.clear();
    if reader.read_line(buf)? == 0 {
        return Ok(false);
    }
    while buf.ends_with('\n') || buf.ends_with('\r') {
        buf.pop();
    }
    Ok(true)
}

/*
 * formats one header line: content padded (or truncated) to 60 columns,
 * followed by the marker
 */
pub(crate) fn fmt_rinex(content: &str, marker: &str) -> String {
    let content: String = content.chars().take(60).collect();
    format!("{:<padding$}{}", content, marker, padding = 60)
}

/*
 * generates a comment with standardized formatting
 */
pub(crate) fn fmt_comment(content: &str) -> String {
    fmt_rinex(content, "COMMENT")
}

#[cfg(test)]
mod test {
    use crate::{fmt_comment, fmt_rinex};
    #[test]
    fn fmt_comments_singleline() {
        for desc in [
            "test",
            "just a basic comment",
            "just another lengthy comment blahblabblah",
        ] {
            let comment = fmt_comment(desc);
            assert_eq!(comment.len(), 67, "comments are 60 + marker byte long");
            assert_eq!(
                comment.find("COMMENT"),
                Some(60),
                "comment marker should located @ 60"
            );
            assert!(comment.ends_with("COMMENT"));
        }
    }
    #[test]
    fn fmt_truncates_lengthy_content() {
        let desc = "just trying to form a very lengthy comment that will overflow since it does not fit";
        let line = fmt_rinex(desc, "COMMENT");
        assert_eq!(line.find("COMMENT"), Some(60));
        assert!(line.starts_with(&desc[..60]));
    }
    #[test]
    fn fmt_observables_v3() {
        assert_eq!(
            fmt_rinex(
                "R    9 C1C L1C S1C C2C C2P L2C L2P S2C S2P",
                "SYS / # / OBS TYPES"
            ),
            "R    9 C1C L1C S1C C2C C2P L2C L2P S2C S2P                  SYS / # / OBS TYPES"
        );
    }
}
