//! # driftcheck_cli
//!
//! Part of the driftcheck crate family.
//!
//! Command line application rendering run-over-channel drift plots of every detector.
//!
//! ## Use
//!
//! ```bash
//! driftcheck /data/experiment/run --full --dest plots --dets 25 --range 0 8191
//! ```
//!
//! A template configuration can be created with `driftcheck new config.yml` and used with
//! `driftcheck --config config.yml`. Options given on the command line override the file.
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use libdriftcheck::config::{Config, PlotFormat};
use libdriftcheck::error::ConfigError;
use libdriftcheck::process::process;
use libdriftcheck::status::{PipelineStatus, Stage};

const STAGE_TEMPLATE: &str = "{prefix:>18} [{bar:40.cyan/blue}] {pos:>3}% {msg}";

fn make_template_config(path: &Path) -> Result<(), ConfigError> {
    Config::default().write_config_file(path)
}

fn cli() -> Command {
    Command::new("driftcheck")
        .about("Create spectra over run number from GASPware matrices")
        .arg_required_else_help(true)
        .args_conflicts_with_subcommands(true)
        .subcommand_negates_reqs(true)
        .subcommand(
            Command::new("new")
                .about("Make a template configuration yaml file")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the new configuration file"),
                ),
        )
        .arg(
            Arg::new("pattern")
                .value_name("PATTERN")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("config")
                .help("Path to and name pattern of matrices"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("Load settings from a yaml configuration file"),
        )
        .arg(
            Arg::new("full")
                .long("full")
                .action(ArgAction::SetTrue)
                .help("Create .txt files from matrices"),
        )
        .arg(
            Arg::new("write")
                .long("write")
                .action(ArgAction::SetTrue)
                .help("Store raw data of plots in .mat files"),
        )
        .arg(
            Arg::new("clear")
                .long("clear")
                .action(ArgAction::SetTrue)
                .help("Delete created .txt files"),
        )
        .arg(
            Arg::new("dest")
                .long("dest")
                .value_name("DESTINATION")
                .value_parser(value_parser!(PathBuf))
                .help("Path where output is stored (default: current location)"),
        )
        .arg(
            Arg::new("dets")
                .long("dets")
                .value_name("NUM DETS")
                .value_parser(value_parser!(usize))
                .help("Number of detectors (default: 25)"),
        )
        .arg(
            Arg::new("range")
                .long("range")
                .value_names(["LO", "HI"])
                .num_args(2)
                .value_parser(value_parser!(usize))
                .help("Plot range for data axis (default: 0 8191)"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_parser(value_parser!(PlotFormat))
                .help("Image format of the plots, pdf, png or svg (default: pdf)"),
        )
        .arg(
            Arg::new("cmat")
                .long("cmat")
                .value_name("CMD")
                .help("Command used to run cmat (default: cmat)"),
        )
        .arg(
            Arg::new("converter")
                .long("converter")
                .value_name("CMD")
                .help("Command used to convert spectra to ascii (default: mkascii16k)"),
        )
        .arg(
            Arg::new("ignore-tool-status")
                .long("ignore-tool-status")
                .action(ArgAction::SetTrue)
                .help("Do not fail when cmat or the converter exit with an error"),
        )
}

/// Merge the command line over the (optional) configuration file
fn build_config(matches: &ArgMatches) -> Result<Config, ConfigError> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            log::info!("Loading config from {}...", path.to_string_lossy());
            Config::read_config_file(path)?
        }
        None => Config::default(),
    };

    if let Some(pattern) = matches.get_one::<PathBuf>("pattern") {
        config.pattern = pattern.clone();
    }
    if let Some(dest) = matches.get_one::<PathBuf>("dest") {
        config.dest_path = dest.clone();
    }
    if let Some(n_detectors) = matches.get_one::<usize>("dets") {
        config.n_detectors = *n_detectors;
    }
    if let Some(range) = matches.get_many::<usize>("range") {
        let range: Vec<usize> = range.copied().collect();
        config.channel_range = [range[0], range[1]];
    }
    if let Some(format) = matches.get_one::<PlotFormat>("format") {
        config.plot_format = *format;
    }
    if let Some(cmat) = matches.get_one::<String>("cmat") {
        config.cmat_command = cmat.clone();
    }
    if let Some(converter) = matches.get_one::<String>("converter") {
        config.converter_command = converter.clone();
    }
    config.full |= matches.get_flag("full");
    config.write_matrices |= matches.get_flag("write");
    config.clear |= matches.get_flag("clear");
    config.ignore_tool_status |= matches.get_flag("ignore-tool-status");

    config.validate()?;
    Ok(config)
}

/// Keeps one progress bar per pipeline stage
struct StageBars {
    manager: MultiProgress,
    style: ProgressStyle,
    current: Option<(Stage, ProgressBar)>,
}

impl StageBars {
    fn new(manager: MultiProgress) -> Self {
        let style = ProgressStyle::with_template(STAGE_TEMPLATE)
            .expect("Progress bar template is valid")
            .progress_chars("=> ");
        Self {
            manager,
            style,
            current: None,
        }
    }

    fn update(&mut self, status: PipelineStatus) {
        let is_new_stage = !matches!(&self.current, Some((stage, _)) if *stage == status.stage);
        if is_new_stage {
            self.finish();
            let pb = self.manager.add(ProgressBar::new(100));
            pb.set_style(self.style.clone());
            pb.set_prefix(status.stage.to_string());
            self.current = Some((status.stage, pb));
        }
        if let Some((_, pb)) = &self.current {
            pb.set_position((status.progress * 100.0) as u64);
            pb.set_message(status.label);
        }
    }

    fn finish(&mut self) {
        if let Some((_, pb)) = self.current.take() {
            pb.finish();
        }
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    LogWrapper::new(pb_manager.clone(), logger)
        .try_init()
        .expect("Could not create logging/progress!");

    if let Some(("new", sub_matches)) = matches.subcommand() {
        let path = sub_matches
            .get_one::<PathBuf>("path")
            .expect("Path is a required argument");
        log::info!("Making a template config at {}...", path.to_string_lossy());
        return match make_template_config(path) {
            Ok(()) => {
                log::info!("Done.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let config = match build_config(&matches) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Pattern: {}", config.pattern.to_string_lossy());
    log::info!("Destination: {}", config.dest_path.to_string_lossy());
    log::info!(
        "Detectors: {} Channels: {} to {}",
        config.n_detectors,
        config.channel_range[0],
        config.channel_range[1]
    );

    let mut bars = StageBars::new(pb_manager);
    let result = process(&config, |status| bars.update(status));
    bars.finish();

    match result {
        Ok(()) => {
            log::info!("Done.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
