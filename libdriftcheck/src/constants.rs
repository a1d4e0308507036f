// Defaults and fixed names shared by the pipeline stages

/// Name of the cmat command script written into the data directory
pub const SCRIPT_NAME: &str = "split_run.sh";

/// Extension of the raw GASPware matrices
pub const RAW_MATRIX_EXTENSION: &str = "cmat";
/// Extension of the converted ascii spectra
pub const ASCII_EXTENSION: &str = "txt";
/// Extension of persisted detector matrices
pub const MATRIX_EXTENSION: &str = "mat";

pub const DEFAULT_CMAT_COMMAND: &str = "cmat";
pub const DEFAULT_CONVERTER_COMMAND: &str = "mkascii16k";

pub const DEFAULT_N_DETECTORS: usize = 25;
/// Detector suffixes are written with two digits
pub const MAX_DETECTORS: usize = 99;
pub const DEFAULT_CHANNEL_RANGE: [usize; 2] = [0, 8191];

/// Run numbers in matrix file names always carry three digits
pub const RUN_DIGITS: usize = 3;

/// Plot geometry in pixels (a 10x5 inch figure at 100 dpi)
pub const PLOT_WIDTH: u32 = 1000;
pub const PLOT_HEIGHT: u32 = 500;
