// The external tools only talk to us through the file system, so every name that
// crosses that boundary is generated or matched here.
use regex::Regex;

use super::config::PlotFormat;
use super::constants::{ASCII_EXTENSION, MATRIX_EXTENSION, RAW_MATRIX_EXTENSION, RUN_DIGITS};
use super::error::NamingError;

/// Compiled file name patterns for one data set (one tail)
#[derive(Debug, Clone)]
pub struct NamePatterns {
    raw_matrix: Regex,
    split_spectrum: Regex,
    ascii_spectrum: Regex,
}

impl NamePatterns {
    /// Build the patterns for a given matrix name prefix
    pub fn new(tail: &str) -> Result<Self, NamingError> {
        let tail = regex::escape(tail);
        Ok(Self {
            raw_matrix: Regex::new(&format!(
                r"^{tail}(\d{{{RUN_DIGITS}}})\.{RAW_MATRIX_EXTENSION}$"
            ))?,
            split_spectrum: Regex::new(&format!(r"^{tail}\d{{{RUN_DIGITS}}}_det\d{{2}}$"))?,
            ascii_spectrum: Regex::new(&format!(
                r"^{tail}(\d{{{RUN_DIGITS}}})_det(\d{{2}})\.{ASCII_EXTENSION}$"
            ))?,
        })
    }

    /// Run number of a raw matrix file, or None if the name does not belong to the data set
    pub fn match_raw_matrix(&self, file_name: &str) -> Option<u32> {
        self.raw_matrix
            .captures(file_name)
            .and_then(|caps| caps[1].parse().ok())
    }

    /// Is this one of the intermediate spectra written by cmat?
    pub fn is_split_spectrum(&self, file_name: &str) -> bool {
        self.split_spectrum.is_match(file_name)
    }

    /// Run number and detector number (1-based) of a converted ascii spectrum
    pub fn match_ascii_spectrum(&self, file_name: &str) -> Option<(u32, usize)> {
        let caps = self.ascii_spectrum.captures(file_name)?;
        let run = caps[1].parse().ok()?;
        let det = caps[2].parse().ok()?;
        Some((run, det))
    }
}

/// Detector indices are 0-based internally, 1-based in every file name
pub fn detector_number(detector: usize) -> usize {
    detector + 1
}

/// Name cmat gives the spectrum of one detector, e.g. `run001_det03`
pub fn split_spectrum_name(run: &str, detector: usize) -> String {
    format!("{run}_det{:02}", detector_number(detector))
}

pub fn ascii_spectrum_name(split_name: &str) -> String {
    format!("{split_name}.{ASCII_EXTENSION}")
}

/// Persisted detector matrix, e.g. `rundet03.mat`
pub fn matrix_file_name(tail: &str, detector: usize) -> String {
    format!("{tail}det{:02}.{MATRIX_EXTENSION}", detector_number(detector))
}

/// Rendered drift plot, e.g. `det3.pdf`
pub fn plot_file_name(detector: usize, format: PlotFormat) -> String {
    format!("det{}.{}", detector_number(detector), format.extension())
}

/// The run identifier cmat is asked to open is the matrix file name minus its extension
pub fn run_name(raw_file_name: &str) -> &str {
    raw_file_name
        .strip_suffix(&format!(".{RAW_MATRIX_EXTENSION}"))
        .unwrap_or(raw_file_name)
}
