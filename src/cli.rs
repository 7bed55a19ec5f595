use clap::{Arg, ArgAction, ArgMatches, ColorChoice, Command};
use rnxedit::prelude::*;
use std::path::PathBuf;

pub struct Cli {
    /// arguments passed by user
    pub matches: ArgMatches,
}

impl Cli {
    pub fn new() -> Self {
        Self::from_matches(Self::command().get_matches())
    }
    fn from_matches(matches: ArgMatches) -> Self {
        Self { matches }
    }
    fn command() -> Command {
        Command::new("rnxedit")
            .version(env!("CARGO_PKG_VERSION"))
            .about("RINEX V3 Observation editor: GNSS exclusion, catenation, day rollover repair")
            .arg_required_else_help(true)
            .color(ColorChoice::Always)
            .disable_version_flag(true)
            .arg(
                Arg::new("version")
                    .short('v')
                    .long("version")
                    .action(ArgAction::Version)
                    .help("Print version"),
            )
            .arg(
                Arg::new("debug")
                    .short('d')
                    .long("debug")
                    .action(ArgAction::SetTrue)
                    .help("Activate debug traces."),
            )
            .next_help_heading("Input/Output")
            .arg(
                Arg::new("infile")
                    .num_args(1..)
                    .action(ArgAction::Append)
                    .help("One file, or the first and last files of a daily sequence.
One MJD, or the first and last MJDs of a sequence (requires --template)."),
            )
            .arg(
                Arg::new("template")
                    .long("template")
                    .action(ArgAction::Set)
                    .help("File name template, for MJD inputs. YYYY, YY and DDD are
replaced by the year and day of year, for example STAT00AUS_R_YYYYDDD0000_01D_30S_MO.rnx"),
            )
            .arg(
                Arg::new("obsdir")
                    .long("obsdir")
                    .action(ArgAction::Set)
                    .default_value("./")
                    .help("Directory of input files that come without directory."),
            )
            .arg(
                Arg::new("tmpdir")
                    .long("tmpdir")
                    .action(ArgAction::Set)
                    .default_value("./")
                    .help("Directory for temporary files."),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .action(ArgAction::Set)
                    .conflicts_with("replace")
                    .help("Output file, or directory. Otherwise, results are left in --tmpdir."),
            )
            .arg(
                Arg::new("replace")
                    .short('r')
                    .long("replace")
                    .action(ArgAction::SetTrue)
                    .help("Replace edited files. Catenated results are never replaced."),
            )
            .arg(
                Arg::new("backup")
                    .short('b')
                    .long("backup")
                    .action(ArgAction::SetTrue)
                    .help("Keep a copy of replaced files, with .original suffix.
Has no effect without --replace."),
            )
            .next_help_heading("Edition")
            .arg(
                Arg::new("catenate")
                    .short('c')
                    .long("catenate")
                    .action(ArgAction::SetTrue)
                    .help("Catenate all input files into a single file."),
            )
            .arg(
                Arg::new("excludegnss")
                    .short('x')
                    .long("excludegnss")
                    .action(ArgAction::Set)
                    .help("Constellations to remove, for example \"RC\" to remove Glonass and BeiDou."),
            )
            .arg(
                Arg::new("fixmissing")
                    .short('f')
                    .long("fixmissing")
                    .action(ArgAction::SetTrue)
                    .help("Repair daily files whose epochs spill over the day boundary.
Previous day is added to the sequence, all files are rewritten."),
            )
    }
    pub fn debug(&self) -> bool {
        self.matches.get_flag("debug")
    }
    fn positionals(&self) -> Vec<&String> {
        self.matches
            .get_many::<String>("infile")
            .map(|values| values.collect())
            .unwrap_or_default()
    }
    fn placement(&self) -> Placement {
        if self.matches.get_flag("replace") {
            Placement::Replace {
                backup: self.matches.get_flag("backup"),
            }
        } else if let Some(output) = self.matches.get_one::<String>("output") {
            Placement::Output(PathBuf::from(output))
        } else {
            Placement::Scratch
        }
    }
    fn directory(&self, key: &str) -> PathBuf {
        self.matches
            .get_one::<String>(key)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./"))
    }
    /// Run options described by the command line
    pub fn opts(&self) -> Result<Opts, Error> {
        let exclusion = match self.matches.get_one::<String>("excludegnss") {
            Some(letters) => letters.parse::<ExclusionSet>()?,
            None => ExclusionSet::default(),
        };
        Ok(Opts {
            inputs: Inputs::from_positionals(&self.positionals())?,
            catenate: self.matches.get_flag("catenate"),
            fix_missing: self.matches.get_flag("fixmissing"),
            exclusion,
            template: self.matches.get_one::<String>("template").cloned(),
            obs_dir: self.directory("obsdir"),
            tmp_dir: self.directory("tmpdir"),
            placement: self.placement(),
            ..Default::default()
        })
    }
}
