//! Observation record scanner.
use crate::{
    epoch::{EpochRecord, Timestamp},
    read_line, Error,
};
use std::io::BufRead;

/// [EpochScanner] iterates the epoch blocks of an Observation record.
/// The [BufRead] it wraps is expected to be positioned right after the
/// header section.
pub struct EpochScanner<R: BufRead> {
    reader: R,
    buf: String,
    previous: Option<Timestamp>,
    done: bool,
}

impl<R: BufRead> EpochScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::with_capacity(128),
            previous: None,
            done: false,
        }
    }

    /*
     * reads the next descriptor line, skipping everything
     * that does not start an epoch block
     */
    fn next_descriptor(&mut self) -> Result<bool, Error> {
        loop {
            if !read_line(&mut self.reader, &mut self.buf)? {
                return Ok(false);
            }
            if EpochRecord::is_new_epoch(&self.buf) {
                return Ok(true);
            }
            if !self.buf.trim().is_empty() {
                debug!("skipping line outside of epoch block: \"{}\"", self.buf);
            }
        }
    }

    fn next_record(&mut self) -> Result<Option<EpochRecord>, Error> {
        if !self.next_descriptor()? {
            return Ok(None);
        }
        let mut record = EpochRecord::parse_after(&self.buf, self.previous.as_ref())?;
        for _ in 0..record.count {
            if !read_line(&mut self.reader, &mut self.buf)? {
                warn!(
                    "{}: truncated epoch block ({}/{} lines)",
                    record.epoch,
                    record.lines.len(),
                    record.count
                );
                break;
            }
            record.lines.push(self.buf.clone());
        }
        self.previous = Some(record.timestamp);
        Ok(Some(record))
    }
}

impl<R: BufRead> Iterator for EpochScanner<R> {
    type Item = Result<EpochRecord, Error>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}
