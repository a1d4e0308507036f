use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::{Path, PathBuf};

use super::constants::*;
use super::error::ConfigError;

/// Image format of the rendered drift plots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotFormat {
    #[default]
    Pdf,
    Png,
    Svg,
}

impl PlotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

impl std::str::FromStr for PlotFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            _ => Err(format!("unsupported plot format {s}")),
        }
    }
}

/// Structure representing the application configuration. Contains pathing, detector and
/// channel information along with the flags selecting the optional pipeline stages.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to and name prefix of the matrices, e.g. `/data/run` for `/data/run001.cmat`
    pub pattern: PathBuf,
    pub dest_path: PathBuf,
    pub n_detectors: usize,
    /// Half-open range `[lo, hi)` of channels kept from each spectrum
    pub channel_range: [usize; 2],
    pub full: bool,
    pub write_matrices: bool,
    pub clear: bool,
    pub cmat_command: String,
    pub converter_command: String,
    pub plot_format: PlotFormat,
    pub ignore_tool_status: bool,
}

impl Default for Config {
    /// Generate a new Config object. The pattern will be empty/invalid
    fn default() -> Self {
        Self {
            pattern: PathBuf::from("None"),
            dest_path: PathBuf::from("."),
            n_detectors: DEFAULT_N_DETECTORS,
            channel_range: DEFAULT_CHANNEL_RANGE,
            full: false,
            write_matrices: false,
            clear: false,
            cmat_command: String::from(DEFAULT_CMAT_COMMAND),
            converter_command: String::from(DEFAULT_CONVERTER_COMMAND),
            plot_format: PlotFormat::default(),
            ignore_tool_status: false,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the configuration to a YAML file, overwriting anything already there
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }

    /// Check the detector count, channel range and pattern for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [lo, hi] = self.channel_range;
        if lo >= hi {
            return Err(ConfigError::BadChannelRange(lo, hi));
        }
        if self.n_detectors == 0 || self.n_detectors > MAX_DETECTORS {
            return Err(ConfigError::BadDetectorCount(self.n_detectors));
        }
        self.get_tail()?;
        Ok(())
    }

    /// Absolute path of the directory holding the raw matrices
    pub fn get_head(&self) -> Result<PathBuf, ConfigError> {
        let parent = match self.pattern.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        Ok(std::path::absolute(parent)?)
    }

    /// File name prefix shared by all matrices of the data set
    pub fn get_tail(&self) -> Result<String, ConfigError> {
        match self.pattern.file_name() {
            Some(name) if !name.is_empty() => Ok(name.to_string_lossy().into_owned()),
            _ => Err(ConfigError::BadPattern(self.pattern.clone())),
        }
    }

    /// Absolute path of the directory receiving spectra, matrices and plots
    pub fn get_dest(&self) -> Result<PathBuf, ConfigError> {
        Ok(std::path::absolute(&self.dest_path)?)
    }

    /// The cmat script always lives next to the matrices; cmat cannot handle long paths
    pub fn get_script_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.get_head()?.join(SCRIPT_NAME))
    }

    pub fn channels(&self) -> Range<usize> {
        self.channel_range[0]..self.channel_range[1]
    }

    pub fn channel_count(&self) -> usize {
        self.channel_range[1].saturating_sub(self.channel_range[0])
    }
}
