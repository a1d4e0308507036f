use approx::assert_relative_eq;
use std::fmt::Write as _;
use std::path::Path;

use libdriftcheck::config::Config;
use libdriftcheck::error::{ProcessorError, SpectrumError, SplitterError};
use libdriftcheck::process::process;
use libdriftcheck::spectrum::{load_spectra, read_matrix_file};

// Helper to write a converter-style two column spectrum
fn write_spectrum(path: &Path, counts: &[f64]) {
    let mut text = String::new();
    for (channel, count) in counts.iter().enumerate() {
        writeln!(text, "{channel}\t{count}").unwrap();
    }
    std::fs::write(path, text).unwrap();
}

fn make_config(data: &Path, dest: &Path) -> Config {
    Config {
        pattern: data.join("run"),
        dest_path: dest.to_path_buf(),
        n_detectors: 1,
        channel_range: [1, 4],
        ..Default::default()
    }
}

#[test]
fn test_missing_runs_stay_empty() {
    let dir = tempfile::tempdir().unwrap();
    write_spectrum(&dir.path().join("run002_det01.txt"), &[9.0, 1.0, 2.0, 3.0, 9.0]);
    write_spectrum(&dir.path().join("run005_det01.txt"), &[9.0, 4.0, 5.0, 6.0, 9.0]);
    // Other detectors must not leak into detector 1
    write_spectrum(&dir.path().join("run007_det02.txt"), &[1.0; 5]);

    let config = make_config(dir.path(), dir.path());
    let matrix = load_spectra(0, &config).unwrap();

    assert_eq!(matrix.max_run, 5);
    assert_eq!(matrix.data.dim(), (3, 5));
    assert_eq!(matrix.channels(), 1..4);
    for run in [1, 3, 4] {
        assert!(matrix.run_spectrum(run).unwrap().iter().all(|v| *v == 0.0));
    }
    assert_eq!(matrix.run_spectrum(2).unwrap().to_vec(), vec![1.0, 2.0, 3.0]);
    assert_eq!(matrix.run_spectrum(5).unwrap().to_vec(), vec![4.0, 5.0, 6.0]);
}

#[test]
fn test_every_spectrum_has_range_length() {
    let dir = tempfile::tempdir().unwrap();
    let counts: Vec<f64> = (0..100).map(|c| c as f64).collect();
    for run in 1..=4 {
        write_spectrum(&dir.path().join(format!("run{run:03}_det01.txt")), &counts);
    }
    let config = Config {
        channel_range: [10, 90],
        ..make_config(dir.path(), dir.path())
    };
    let matrix = load_spectra(0, &config).unwrap();
    for run in 1..=4 {
        let spectrum = matrix.run_spectrum(run).unwrap();
        assert_eq!(spectrum.len(), 80);
        assert_eq!(spectrum[0], 10.0);
    }
}

#[test]
fn test_persisted_matrix_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    write_spectrum(&dir.path().join("run001_det01.txt"), &[0.0, 1.5, 2.25, 3.125]);
    write_spectrum(&dir.path().join("run003_det01.txt"), &[0.0, 1e6, 2e-3, 7.0]);
    let config = Config {
        write_matrices: true,
        ..make_config(dir.path(), dir.path())
    };

    let matrix = load_spectra(0, &config).unwrap();
    let loaded = read_matrix_file(&dir.path().join("rundet01.mat")).unwrap();
    assert_eq!(loaded.dim(), (3, 3));
    for (a, b) in matrix.data.iter().zip(loaded.iter()) {
        assert_relative_eq!(a, b, max_relative = 1e-15);
    }
}

#[test]
fn test_no_spectra_for_detector() {
    let dir = tempfile::tempdir().unwrap();
    write_spectrum(&dir.path().join("run001_det02.txt"), &[1.0; 5]);
    let config = make_config(dir.path(), dir.path());
    assert!(matches!(
        load_spectra(0, &config),
        Err(SpectrumError::NoAsciiSpectra(_))
    ));
}

#[test]
fn test_full_mode_without_matrices() {
    let data = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    let config = Config {
        full: true,
        ..make_config(data.path(), dest.path())
    };

    let result = process(&config, |_| ());
    assert!(matches!(
        result,
        Err(ProcessorError::SplitterError(SplitterError::NoRawMatrices { .. }))
    ));
    assert_eq!(std::fs::read_dir(data.path()).unwrap().count(), 0);
    assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
}

#[test]
fn test_plotting_without_spectra() {
    let data = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    let config = make_config(data.path(), dest.path());

    let mut stages = Vec::new();
    let result = process(&config, |status| stages.push(status.stage));
    assert!(matches!(
        result,
        Err(ProcessorError::SpectrumError(SpectrumError::NoAsciiSpectra(_)))
    ));
    assert!(!dest.path().join("det1.pdf").exists());
    assert_eq!(stages.len(), 1);
}

#[test]
fn test_invalid_config_is_rejected_early() {
    let data = tempfile::tempdir().unwrap();
    let config = Config {
        channel_range: [50, 10],
        ..make_config(data.path(), data.path())
    };
    assert!(matches!(
        process(&config, |_| ()),
        Err(ProcessorError::ConfigError(_))
    ));
}

#[test]
fn test_full_plotting_run_keeps_outputs() {
    let data = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    let counts: Vec<f64> = (0..6).map(|c| (c * c) as f64).collect();
    for run in [1, 2, 4] {
        write_spectrum(&dest.path().join(format!("run{run:03}_det01.txt")), &counts);
    }
    let config = Config {
        write_matrices: true,
        clear: true,
        ..make_config(data.path(), dest.path())
    };

    let mut stages = Vec::new();
    process(&config, |status| stages.push(status.stage)).unwrap();

    assert!(dest.path().join("det1.pdf").exists());
    let matrix = read_matrix_file(&dest.path().join("rundet01.mat")).unwrap();
    assert_eq!(matrix.dim(), (3, 4));
    let leftover: Vec<_> = std::fs::read_dir(dest.path())
        .unwrap()
        .filter_map(|item| item.ok())
        .filter(|item| item.file_name().to_string_lossy().ends_with(".txt"))
        .collect();
    assert!(leftover.is_empty(), "spectra left behind: {leftover:?}");
    assert_eq!(stages.last(), Some(&libdriftcheck::status::Stage::Cleaning));
}
