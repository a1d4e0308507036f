use std::path::PathBuf;

use super::cleanup::clear_intermediates;
use super::config::Config;
use super::error::{ConfigError, ProcessorError};
use super::naming::detector_number;
use super::plot::render_detector_plot;
use super::spectrum::load_spectra;
use super::splitter::{find_raw_matrices, Splitter};
use super::status::{PipelineStatus, Stage};

/// Split every raw matrix of the data set into per-detector ascii spectra
///
/// Returns the number of ascii spectra produced
pub fn split_matrices<F: FnMut(PipelineStatus)>(
    config: &Config,
    status: &mut F,
) -> Result<usize, ProcessorError> {
    // Check for matrices before anything is written to disk
    let matrices = find_raw_matrices(config)?;
    let splitter = Splitter::new(config)?;
    let n_matrices = matrices.len();
    log::info!("Splitting {n_matrices} matrices...");

    let mut n_spectra = 0;
    for (idx, matrix) in matrices.iter().enumerate() {
        status(PipelineStatus::new(
            Stage::Splitting,
            idx as f32 / n_matrices as f32,
            matrix.run_name.clone(),
        ));
        n_spectra += splitter.split_run(matrix)?.len();
    }
    status(PipelineStatus::new(Stage::Splitting, 1.0, String::new()));
    Ok(n_spectra)
}

/// Load the spectra of one detector and render its drift plot
pub fn process_detector(detector: usize, config: &Config) -> Result<PathBuf, ProcessorError> {
    let matrix = load_spectra(detector, config)?;
    log::debug!(
        "Detector {} spans {} runs",
        detector_number(detector),
        matrix.max_run
    );
    Ok(render_detector_plot(&matrix, config)?)
}

/// Render the drift plot of every detector
///
/// Returns the paths of the rendered images
pub fn plot_detectors<F: FnMut(PipelineStatus)>(
    config: &Config,
    status: &mut F,
) -> Result<Vec<PathBuf>, ProcessorError> {
    log::info!("Preparing plots...");
    let mut plots = Vec::with_capacity(config.n_detectors);
    for det in 0..config.n_detectors {
        status(PipelineStatus::new(
            Stage::Plotting,
            det as f32 / config.n_detectors as f32,
            format!("Det {}", detector_number(det)),
        ));
        plots.push(process_detector(det, config)?);
    }
    status(PipelineStatus::new(Stage::Plotting, 1.0, String::new()));
    Ok(plots)
}

/// The main loop of driftcheck.
///
/// Optionally splits the raw matrices, then plots every detector, then optionally
/// removes the intermediate files. Progress is reported through `status`. The first
/// error aborts the remaining stages.
pub fn process<F: FnMut(PipelineStatus)>(
    config: &Config,
    mut status: F,
) -> Result<(), ProcessorError> {
    config.validate()?;
    std::fs::create_dir_all(config.get_dest()?).map_err(ConfigError::from)?;

    if config.full {
        let n_spectra = split_matrices(config, &mut status)?;
        log::info!("Produced {n_spectra} ascii spectra.");
    }

    let plots = plot_detectors(config, &mut status)?;
    log::info!("Rendered {} plots.", plots.len());

    if config.clear {
        log::info!("Cleaning up...");
        status(PipelineStatus::new(Stage::Cleaning, 0.0, String::new()));
        clear_intermediates(config)?;
        status(PipelineStatus::new(Stage::Cleaning, 1.0, String::new()));
    }
    Ok(())
}
