use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config has an invalid channel range [{0}, {1}); the lower bound must be below the upper bound")]
    BadChannelRange(usize, usize),
    #[error("Config has an invalid number of detectors {0}; expected 1 to {max}", max=crate::constants::MAX_DETECTORS)]
    BadDetectorCount(usize),
    #[error("Config pattern {0:?} does not contain a file name prefix")]
    BadPattern(PathBuf),
}

#[derive(Debug, Error)]
pub enum NamingError {
    #[error("Could not build a file name pattern: {0}")]
    BadRegex(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to write cmat script due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Failed to write cmat script due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum SplitterError {
    #[error("Found no files matching pattern {tail} in path {path:?}")]
    NoRawMatrices { tail: String, path: PathBuf },
    #[error("Found no runs to split in path {0:?}")]
    NoSplitSpectra(PathBuf),
    #[error("Could not launch external tool {tool}: {source}")]
    ToolLaunch {
        tool: String,
        source: std::io::Error,
    },
    #[error("External tool {tool} exited with {status}")]
    ToolFailed {
        tool: String,
        status: std::process::ExitStatus,
    },
    #[error("External tool command is empty")]
    EmptyCommand,
    #[error("Splitter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Splitter failed due to cmat script error: {0}")]
    ScriptError(#[from] ScriptError),
    #[error("Splitter failed due to naming error: {0}")]
    NamingError(#[from] NamingError),
    #[error("Splitter failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum SpectrumError {
    #[error("Found no ascii spectra in path {0:?}. Maybe run DriftCheck with option --full.")]
    NoAsciiSpectra(PathBuf),
    #[error("Ascii spectrum {path:?} has no second column on line {line}")]
    MissingColumn { path: PathBuf, line: usize },
    #[error("Ascii spectrum {path:?} has a malformed value on line {line}: {source}")]
    BadValue {
        path: PathBuf,
        line: usize,
        source: std::num::ParseFloatError,
    },
    #[error("Ascii spectrum {path:?} holds {found} channels; the channel range needs {expected}")]
    ShortSpectrum {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
    #[error("Matrix file {0:?} has rows of unequal length")]
    RaggedMatrix(PathBuf),
    #[error("Could not shape spectrum data into a matrix: {0}")]
    ShapeError(#[from] ndarray::ShapeError),
    #[error("Spectrum loading failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Spectrum loading failed due to naming error: {0}")]
    NamingError(#[from] NamingError),
    #[error("Spectrum loading failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Plot rendering failed: {0}")]
    DrawingError(String),
    #[error("Cannot plot detector {0} since its matrix is empty")]
    EmptyMatrix(usize),
    #[error("Plotting failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

// plotters errors are generic over the backend error type, so flatten them
impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for PlotError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Self::DrawingError(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Cleanup failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Cleanup failed due to naming error: {0}")]
    NamingError(#[from] NamingError),
    #[error("Cleanup failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Splitter error: {0}")]
    SplitterError(#[from] SplitterError),
    #[error("Processor failed due to Spectrum error: {0}")]
    SpectrumError(#[from] SpectrumError),
    #[error("Processor failed due to Plot error: {0}")]
    PlotError(#[from] PlotError),
    #[error("Processor failed due to Cleanup error: {0}")]
    CleanupError(#[from] CleanupError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
}
