use ndarray::{Array1, Array2, Axis};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use super::config::Config;
use super::error::SpectrumError;
use super::naming::{detector_number, matrix_file_name, NamePatterns};

/// The spectra of one detector for every run, stacked into a single matrix.
///
/// Rows are channels (starting at `first_channel`), columns are runs. Column `r` holds
/// run `r + 1`; runs without a spectrum stay zero.
#[derive(Debug, Clone)]
pub struct DetectorMatrix {
    pub detector: usize,
    pub max_run: usize,
    pub first_channel: usize,
    pub data: Array2<f64>,
}

impl DetectorMatrix {
    pub fn n_channels(&self) -> usize {
        self.data.nrows()
    }

    pub fn channels(&self) -> Range<usize> {
        self.first_channel..(self.first_channel + self.n_channels())
    }

    /// Spectrum of a given run (1-based run number)
    pub fn run_spectrum(&self, run_number: usize) -> Option<Array1<f64>> {
        if run_number == 0 || run_number > self.max_run {
            return None;
        }
        Some(self.data.column(run_number - 1).to_owned())
    }
}

/// Read the counts column of an ascii spectrum and keep only the channels in range.
///
/// The file is the two column (channel, counts) output of the converter. Blank lines
/// and lines starting with `#` are skipped.
pub fn read_ascii_spectrum(
    path: &Path,
    range: &Range<usize>,
) -> Result<Array1<f64>, SpectrumError> {
    let contents = std::fs::read_to_string(path)?;
    let mut counts: Vec<f64> = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let value = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| SpectrumError::MissingColumn {
                path: path.to_path_buf(),
                line: idx + 1,
            })?;
        counts.push(value.parse().map_err(|source| SpectrumError::BadValue {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?);
    }

    if counts.len() < range.end {
        return Err(SpectrumError::ShortSpectrum {
            path: path.to_path_buf(),
            expected: range.end,
            found: counts.len(),
        });
    }

    Ok(Array1::from(counts[range.clone()].to_vec()))
}

/// Locate the ascii spectra of a detector in the destination directory, keyed by run number
fn find_ascii_spectra(
    dest: &Path,
    patterns: &NamePatterns,
    detector: usize,
) -> Result<BTreeMap<u32, PathBuf>, SpectrumError> {
    let mut spectra = BTreeMap::new();
    for item in dest.read_dir()? {
        let item_path = item?.path();
        let Some(file_name) = item_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match patterns.match_ascii_spectrum(file_name) {
            Some((run, det)) if det == detector_number(detector) => {
                spectra.insert(run, item_path.clone());
            }
            _ => (),
        }
    }
    Ok(spectra)
}

/// Load all run spectra for a given detector and stack them into a DetectorMatrix.
///
/// Only the configured channel range of each spectrum is kept. Finding no spectra at
/// all for the detector is fatal; the user most likely forgot to split the matrices.
/// If the configuration asks for it the matrix is also written to `<tail>det<NN>.mat`.
pub fn load_spectra(detector: usize, config: &Config) -> Result<DetectorMatrix, SpectrumError> {
    let dest = config.get_dest()?;
    let patterns = NamePatterns::new(&config.get_tail()?)?;
    let spectra = find_ascii_spectra(&dest, &patterns, detector)?;

    let max_run = match spectra.keys().next_back() {
        Some(run) => *run as usize,
        None => return Err(SpectrumError::NoAsciiSpectra(dest)),
    };

    let range = config.channels();
    // One row per run, transposed at the end so that channels run along the rows
    let mut matrix = Array2::<f64>::zeros((max_run, config.channel_count()));
    for (run, path) in spectra.iter() {
        // run 000 has no column to go in
        if *run == 0 {
            log::warn!("Skipping {} as runs start at 1", path.to_string_lossy());
            continue;
        }
        let spectrum = read_ascii_spectrum(path, &range)?;
        matrix.row_mut(*run as usize - 1).assign(&spectrum);
    }

    let detector_matrix = DetectorMatrix {
        detector,
        max_run,
        first_channel: range.start,
        data: matrix.reversed_axes(),
    };

    if config.write_matrices {
        let tail = config.get_tail()?;
        let path = dest.join(matrix_file_name(&tail, detector));
        write_matrix_file(&path, &detector_matrix.data)?;
        log::info!(
            "Wrote matrix of detector {} to {}",
            detector_number(detector),
            path.to_string_lossy()
        );
    }

    Ok(detector_matrix)
}

/// Format a value the way numpy's savetxt does by default (`%.18e`)
fn format_value(value: f64) -> String {
    let formatted = format!("{value:.18e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

/// Write a matrix as plain text, one row per line, values separated by single spaces
pub fn write_matrix_file(path: &Path, matrix: &Array2<f64>) -> Result<(), SpectrumError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for row in matrix.axis_iter(Axis(0)) {
        for (idx, value) in row.iter().enumerate() {
            if idx > 0 {
                write!(writer, " ")?;
            }
            write!(writer, "{}", format_value(*value))?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a matrix written by [`write_matrix_file`] (or numpy's savetxt)
pub fn read_matrix_file(path: &Path) -> Result<Array2<f64>, SpectrumError> {
    let contents = std::fs::read_to_string(path)?;
    let mut values: Vec<f64> = Vec::new();
    let mut n_rows = 0;
    let mut n_cols: Option<usize> = None;
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut count = 0;
        for value in line.split_whitespace() {
            values.push(value.parse().map_err(|source| SpectrumError::BadValue {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?);
            count += 1;
        }
        match n_cols {
            Some(n) if n != count => return Err(SpectrumError::RaggedMatrix(path.to_path_buf())),
            _ => n_cols = Some(count),
        }
        n_rows += 1;
    }
    Ok(Array2::from_shape_vec((n_rows, n_cols.unwrap_or(0)), values)?)
}
