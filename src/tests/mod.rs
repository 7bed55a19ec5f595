//! integrated tests

mod compression;
mod rollover;
