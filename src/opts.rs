//! Run configuration.
use crate::{
    filename::FileName,
    filter::ExclusionSet,
    sequence::{is_current_dir, FileSequence},
    Error,
};
use std::path::{Path, PathBuf};

/// Default program identification, reported in header comments
pub fn default_program() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// True if this positional argument is an MJD (exactly 5 digits)
pub fn is_mjd(arg: &str) -> bool {
    arg.len() == 5 && arg.chars().all(|c| c.is_ascii_digit())
}

/// Files to process
#[derive(Debug, Clone, PartialEq)]
pub enum Inputs {
    /// One file, or the first and last files of a daily sequence
    Files(Vec<String>),
    /// One day, or a closed range of days, named with a template
    Mjd { start: i32, end: Option<i32> },
}

impl Default for Inputs {
    fn default() -> Self {
        Self::Files(Vec::new())
    }
}

impl Inputs {
    /// Interpretes positional arguments: one or two file names,
    /// or one or two MJDs.
    pub fn from_positionals<S: AsRef<str>>(args: &[S]) -> Result<Self, Error> {
        if args.is_empty() {
            return Err(Error::NoInput);
        }
        if args.len() > 2 {
            return Err(Error::TooManyInputs);
        }
        if args.iter().all(|arg| is_mjd(arg.as_ref())) {
            let mut mjds = args.iter().filter_map(|arg| arg.as_ref().parse::<i32>().ok());
            let start = mjds.next().ok_or(Error::NoInput)?;
            return Ok(Self::Mjd {
                start,
                end: mjds.next(),
            });
        }
        Ok(Self::Files(
            args.iter().map(|arg| arg.as_ref().to_string()).collect(),
        ))
    }
}

/// Where results go
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Placement {
    /// Edited files are replaced, possibly keeping a `.original` backup
    Replace { backup: bool },
    /// Results are copied to this file, or into this directory
    Output(PathBuf),
    /// Results are left in the scratch directory
    #[default]
    Scratch,
}

/// Run options
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Files to process
    pub inputs: Inputs,
    /// Catenate the inputs into a single file
    pub catenate: bool,
    /// Repair day rollovers. Implies catenation.
    pub fix_missing: bool,
    /// Constellations to remove
    pub exclusion: ExclusionSet,
    /// File name template, for MJD inputs
    pub template: Option<String>,
    /// Directory of input files that come without directory
    pub obs_dir: PathBuf,
    /// Scratch directory
    pub tmp_dir: PathBuf,
    /// Where results go
    pub placement: Placement,
    /// Program identification, reported in header comments
    pub program: String,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            inputs: Inputs::default(),
            catenate: false,
            fix_missing: false,
            exclusion: ExclusionSet::default(),
            template: None,
            obs_dir: PathBuf::from("./"),
            tmp_dir: PathBuf::from("./"),
            placement: Placement::default(),
            program: default_program(),
        }
    }
}

impl Opts {
    /// True if inputs are to be catenated
    pub fn catenates(&self) -> bool {
        self.catenate || self.fix_missing
    }

    /// True if at least one edition is requested
    pub fn has_work(&self) -> bool {
        self.catenates() || !self.exclusion.is_empty()
    }

    /// Comments added to every header we produce
    pub fn comments(&self) -> Vec<String> {
        vec![format!("Processed by {}", self.program)]
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match path.parent() {
            Some(parent) if !is_current_dir(parent) => path.to_path_buf(),
            _ => match path.file_name() {
                Some(name) => self.obs_dir.join(name),
                None => path.to_path_buf(),
            },
        }
    }

    /// Input files, in processing order. Fixing rollovers
    /// requires the day preceding the first input.
    pub fn input_paths(&self) -> Result<Vec<PathBuf>, Error> {
        let sequence = match &self.inputs {
            Inputs::Mjd { start, end } => {
                let template = self.template.as_ref().ok_or(Error::MissingTemplate)?;
                FileName::validate_template(template)?;
                FileSequence::from_mjd(*start, end.unwrap_or(*start), template, self.fix_missing)?
            },
            Inputs::Files(files) => match files.as_slice() {
                [] => return Err(Error::NoInput),
                [single] => {
                    if !self.fix_missing {
                        return Ok(vec![self.resolve(single)]);
                    }
                    let name = FileName::parse(single)?;
                    FileSequence::between(&name, &name, true)?
                },
                [first, last] => {
                    let first = FileName::parse(first)?;
                    let last = FileName::parse(last)?;
                    FileSequence::between(&first, &last, self.fix_missing)?
                },
                _ => return Err(Error::TooManyInputs),
            },
        };
        Ok(sequence
            .resolve(&self.obs_dir)
            .into_iter()
            .map(|name| name.path())
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn positionals() {
        assert_eq!(
            Inputs::from_positionals(&["60094"]).unwrap(),
            Inputs::Mjd {
                start: 60094,
                end: None
            }
        );
        assert_eq!(
            Inputs::from_positionals(&["60094", "60096"]).unwrap(),
            Inputs::Mjd {
                start: 60094,
                end: Some(60096)
            }
        );
        assert_eq!(
            Inputs::from_positionals(&["600941"]).unwrap(),
            Inputs::Files(vec!["600941".to_string()])
        );
        assert!(matches!(
            Inputs::from_positionals(&["a", "b", "c"]),
            Err(Error::TooManyInputs)
        ));
        let empty: [&str; 0] = [];
        assert!(matches!(
            Inputs::from_positionals(&empty),
            Err(Error::NoInput)
        ));
    }

    #[test]
    fn work_detection() {
        let mut opts = Opts::default();
        assert!(!opts.has_work());
        opts.fix_missing = true;
        assert!(opts.catenates());
        assert!(opts.has_work());

        let opts = Opts {
            exclusion: "R".parse().unwrap(),
            ..Default::default()
        };
        assert!(opts.has_work());
        assert!(!opts.catenates());
        assert!(opts.comments()[0].starts_with("Processed by rnxedit"));
    }

    #[test]
    fn single_file_inputs() {
        let opts = Opts {
            inputs: Inputs::Files(vec!["anything.rnx".to_string()]),
            obs_dir: PathBuf::from("/data/obs"),
            ..Default::default()
        };
        assert_eq!(
            opts.input_paths().unwrap(),
            vec![PathBuf::from("/data/obs/anything.rnx")]
        );

        let opts = Opts {
            inputs: Inputs::Files(vec!["/archive/anything.rnx".to_string()]),
            obs_dir: PathBuf::from("/data/obs"),
            ..Default::default()
        };
        assert_eq!(
            opts.input_paths().unwrap(),
            vec![PathBuf::from("/archive/anything.rnx")]
        );

        // fixing rollovers requires standard names
        let opts = Opts {
            inputs: Inputs::Files(vec!["anything.rnx".to_string()]),
            fix_missing: true,
            ..Default::default()
        };
        assert!(matches!(
            opts.input_paths(),
            Err(Error::FileNameError(_))
        ));

        let opts = Opts {
            inputs: Inputs::Files(vec!["STAT1500.23O".to_string()]),
            obs_dir: PathBuf::from("/data/obs"),
            fix_missing: true,
            ..Default::default()
        };
        assert_eq!(
            opts.input_paths().unwrap(),
            vec![
                PathBuf::from("/data/obs/STAT1490.23O"),
                PathBuf::from("/data/obs/STAT1500.23O")
            ]
        );
    }

    #[test]
    fn mjd_inputs() {
        let opts = Opts {
            inputs: Inputs::Mjd {
                start: 60094,
                end: None,
            },
            ..Default::default()
        };
        assert!(matches!(opts.input_paths(), Err(Error::MissingTemplate)));

        let opts = Opts {
            inputs: Inputs::Mjd {
                start: 60094,
                end: None,
            },
            template: Some("STAT_DDD.rnx".to_string()),
            ..Default::default()
        };
        assert!(matches!(opts.input_paths(), Err(Error::FileNameError(_))));

        let opts = Opts {
            inputs: Inputs::Mjd {
                start: 60094,
                end: Some(60095),
            },
            template: Some("STAT00AUS_R_YYYYDDD0000_01D_30S_MO.rnx".to_string()),
            obs_dir: PathBuf::from("/data/obs"),
            fix_missing: true,
            ..Default::default()
        };
        let paths = opts.input_paths().unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(
            paths[0],
            PathBuf::from("/data/obs/STAT00AUS_R_20231490000_01D_30S_MO.rnx")
        );
    }

    #[test]
    fn sequence_inputs() {
        let opts = Opts {
            inputs: Inputs::Files(vec![
                "STAT00AUS_R_20231520000_01D_30S_MO.rnx".to_string(),
                "STAT00AUS_R_20231500000_01D_30S_MO.rnx".to_string(),
            ]),
            ..Default::default()
        };
        assert!(matches!(opts.input_paths(), Err(Error::SequenceError(_))));
    }
}
