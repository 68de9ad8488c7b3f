use anyhow::{bail, ensure, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command, ValueHint};
use pepid_core::database::{Builder, Parameters};
use pepid_core::scoring::{ScoringStrategy, SequestScorer, SharedPeakScorer};
use serde::{Deserialize, Serialize};

/// Options shared by every subcommand
fn common_args() -> Vec<Arg> {
    vec![
        Arg::new("sample")
            .required(true)
            .value_parser(clap::builder::NonEmptyStringValueParser::new())
            .value_hint(ValueHint::FilePath),
        Arg::new("parameters")
            .short('p')
            .long("parameters")
            .value_parser(clap::builder::NonEmptyStringValueParser::new())
            .help("Path to configuration parameters (JSON file)")
            .value_hint(ValueHint::FilePath),
        Arg::new("fasta")
            .short('f')
            .long("fasta")
            .value_parser(clap::builder::NonEmptyStringValueParser::new())
            .help(
                "Path to FASTA database. Overrides the FASTA file \
                 specified in the configuration file.",
            )
            .value_hint(ValueHint::FilePath),
        Arg::new("output")
            .short('o')
            .long("output")
            .value_parser(clap::builder::NonEmptyStringValueParser::new())
            .help("Write the ranked table to this file instead of stdout")
            .value_hint(ValueHint::FilePath),
        Arg::new("amount")
            .short('n')
            .long("amount")
            .value_parser(value_parser!(usize))
            .help("Number of best candidates to report (default = 10)")
            .value_hint(ValueHint::Other),
        Arg::new("normalize")
            .long("normalize")
            .action(ArgAction::SetTrue)
            .help("Divide scores by the best score"),
        Arg::new("threads")
            .long("threads")
            .value_parser(value_parser!(u16).range(1..))
            .help("Number of worker threads (default = # of CPUs)")
            .value_hint(ValueHint::Other),
    ]
}

/// Command line definition of the `pepid` binary
pub fn command() -> Command {
    Command::new("pepid")
        .version(clap::crate_version!())
        .about("Identify proteins from MS1 peak lists and peptides from MS2 spectra")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("ms1")
                .about("Peptide mass fingerprinting: rank proteins against an MS1 peak list")
                .args(common_args())
                .mut_arg("sample", |arg| arg.help("Peak list, one mass per line"))
                .arg(
                    Arg::new("tolerance")
                        .long("tolerance")
                        .value_parser(value_parser!(f64))
                        .help("Peak matching tolerance in Da (default = 1.2)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("missed-cleavages")
                        .long("missed-cleavages")
                        .value_parser(value_parser!(u8))
                        .help("Missed cleavages allowed during digestion (default = 0)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("decoy")
                        .long("decoy")
                        .action(ArgAction::SetTrue)
                        .help("Search reversed protein sequences"),
                ),
        )
        .subcommand(
            Command::new("ms2")
                .about("Rank target and decoy peptides against MS2 spectra (MGF)")
                .args(common_args())
                .mut_arg("sample", |arg| arg.help("Spectra in MGF format"))
                .arg(
                    Arg::new("index")
                        .long("index")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Database snapshot. Loaded if it exists, \
                             otherwise the database is built and saved here.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("scorer")
                        .long("scorer")
                        .value_parser(["shared", "sequest"])
                        .help("Scoring function (default = shared)"),
                )
                .arg(
                    Arg::new("max-spectra")
                        .long("max-spectra")
                        .value_parser(value_parser!(usize))
                        .help("Only read this many spectra from the sample")
                        .value_hint(ValueHint::Other),
                ),
        )
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Ms1,
    Ms2,
}

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct Ms1Options {
    tolerance: Option<f64>,
    missed_cleavages: Option<u8>,
    decoy: Option<bool>,
}

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct Ms2Options {
    max_spectra: Option<usize>,
    index: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Ms1Settings {
    pub tolerance: f64,
    pub missed_cleavages: u8,
    pub decoy: bool,
}

impl From<Ms1Options> for Ms1Settings {
    fn from(value: Ms1Options) -> Self {
        let settings = Ms1Settings {
            tolerance: value.tolerance.unwrap_or(1.2),
            missed_cleavages: value.missed_cleavages.unwrap_or(0),
            decoy: value.decoy.unwrap_or(false),
        };
        if settings.tolerance < 0.0 {
            log::warn!("ms1.tolerance is negative, no peak can match");
        }
        settings
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Ms2Settings {
    pub scoring: ScoringStrategy,
    pub max_spectra: Option<usize>,
    pub index: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
/// Actual search parameters - may include overrides or default values not set by user
pub struct Search {
    pub version: String,
    pub level: Level,
    pub sample: String,
    pub fasta: String,
    pub database: Parameters,
    pub ms1: Ms1Settings,
    pub ms2: Ms2Settings,
    pub report: usize,
    pub normalize: bool,

    #[serde(skip_serializing)]
    pub output: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
/// Input search parameters deserialized from JSON file
pub struct Input {
    #[serde(default)]
    database: Builder,
    scoring: Option<ScoringStrategy>,
    report: Option<usize>,
    normalize: Option<bool>,
    output: Option<String>,
    ms1: Option<Ms1Options>,
    ms2: Option<Ms2Options>,

    #[serde(skip)]
    level: Option<Level>,
    #[serde(skip)]
    sample: Option<String>,
}

impl Input {
    pub fn from_arguments(matches: &ArgMatches) -> anyhow::Result<Self> {
        let (level, sub) = match matches.subcommand() {
            Some(("ms1", sub)) => (Level::Ms1, sub),
            Some(("ms2", sub)) => (Level::Ms2, sub),
            _ => bail!("expected one of the `ms1` or `ms2` subcommands"),
        };

        let mut input = match sub.get_one::<String>("parameters") {
            Some(path) => Input::load(path)
                .with_context(|| format!("Failed to read parameters from `{path}`"))?,
            None => Input::default(),
        };
        input.level = Some(level);
        input.sample = sub.get_one::<String>("sample").cloned();

        // Handle JSON configuration overrides
        if let Some(fasta) = sub.get_one::<String>("fasta") {
            log::trace!("overriding `database.fasta` parameter.");
            input.database.update_fasta(fasta.into());
        }
        if let Some(output) = sub.get_one::<String>("output") {
            log::trace!("overriding `output` parameter.");
            input.output = Some(output.into());
        }
        if let Some(amount) = sub.get_one::<usize>("amount") {
            input.report = Some(*amount);
        }
        if sub.get_flag("normalize") {
            input.normalize = Some(true);
        }

        match level {
            Level::Ms1 => {
                let ms1 = input.ms1.get_or_insert_with(Default::default);
                if let Some(tolerance) = sub.get_one::<f64>("tolerance") {
                    ms1.tolerance = Some(*tolerance);
                }
                if let Some(missed_cleavages) = sub.get_one::<u8>("missed-cleavages") {
                    ms1.missed_cleavages = Some(*missed_cleavages);
                }
                if sub.get_flag("decoy") {
                    ms1.decoy = Some(true);
                }
            }
            Level::Ms2 => {
                let ms2 = input.ms2.get_or_insert_with(Default::default);
                if let Some(index) = sub.get_one::<String>("index") {
                    ms2.index = Some(index.into());
                }
                if let Some(max_spectra) = sub.get_one::<usize>("max-spectra") {
                    ms2.max_spectra = Some(*max_spectra);
                }
                if let Some(scorer) = sub.get_one::<String>("scorer") {
                    input.scoring = Some(Self::select_scorer(input.scoring, scorer));
                }
            }
        }

        // avoid to later fail if these parameters are not set (but doesn't check if files exist)
        ensure!(
            input.database.fasta.is_some(),
            "`database.fasta` must be set. For more information try '--help'"
        );

        Ok(input)
    }

    /// Keep the configured scorer parameters when the kind of scorer matches
    fn select_scorer(configured: Option<ScoringStrategy>, name: &str) -> ScoringStrategy {
        match (configured, name) {
            (Some(strategy @ ScoringStrategy::SharedPeaks(_)), "shared") => strategy,
            (Some(strategy @ ScoringStrategy::Sequest(_)), "sequest") => strategy,
            (_, "sequest") => ScoringStrategy::Sequest(SequestScorer::default()),
            _ => ScoringStrategy::SharedPeaks(SharedPeakScorer::default()),
        }
    }

    pub fn load<S: AsRef<str>>(path: S) -> anyhow::Result<Self> {
        pepid_io::read_json(path.as_ref()).map_err(anyhow::Error::from)
    }

    pub fn build(self) -> anyhow::Result<Search> {
        let fasta = self
            .database
            .fasta
            .clone()
            .context("`database.fasta` must be set")?;
        let level = self.level.context("no subcommand selected")?;
        let sample = self.sample.context("no sample given")?;

        let database = self.database.make_parameters();
        database
            .enzyme
            .enzyme()
            .context("Invalid `database.enzyme` parameters")?;
        if database.peptide_tolerance < 0.0 {
            log::warn!("database.peptide_tolerance is negative, no peptide can be a candidate");
        }

        let report = self.report.unwrap_or(10);
        if report == 0 {
            log::warn!("`report` is 0, no candidates will be reported");
        }

        let ms2 = self.ms2.unwrap_or_default();
        Ok(Search {
            version: clap::crate_version!().into(),
            level,
            sample,
            fasta,
            database,
            ms1: self.ms1.unwrap_or_default().into(),
            ms2: Ms2Settings {
                scoring: self.scoring.unwrap_or_default(),
                max_spectra: ms2.max_spectra,
                index: ms2.index,
            },
            report,
            normalize: self.normalize.unwrap_or(false),
            output: self.output,
        })
    }
}
