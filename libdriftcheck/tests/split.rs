#![cfg(unix)]
// These tests stand in for cmat and mkascii16k with small sh scripts
use std::path::Path;

use libdriftcheck::config::Config;
use libdriftcheck::constants::SCRIPT_NAME;
use libdriftcheck::error::{ProcessorError, SplitterError};
use libdriftcheck::process::split_matrices;
use libdriftcheck::spectrum::load_spectra;
use libdriftcheck::status::Stage;

// Creates an empty file for every spectrum the session asks cmat to write
const FAKE_CMAT: &str = r#"
while read -r line; do
    case "$line" in
        *"|l:8") : > "${line%|l:8}" ;;
    esac
done
exit 0
"#;

// Writes eight channels with counts of 10 per channel number
const FAKE_CONVERTER: &str = r#"
i=0
while [ $i -lt 8 ]; do
    echo "$i $((i * 10))"
    i=$((i + 1))
done > "$2"
"#;

fn setup(tools: &Path, data: &Path, dest: &Path) -> Config {
    let cmat = tools.join("fake_cmat");
    let converter = tools.join("fake_mkascii");
    std::fs::write(&cmat, FAKE_CMAT).unwrap();
    std::fs::write(&converter, FAKE_CONVERTER).unwrap();
    Config {
        pattern: data.join("run"),
        dest_path: dest.to_path_buf(),
        n_detectors: 2,
        channel_range: [0, 8],
        full: true,
        cmat_command: format!("sh {}", cmat.display()),
        converter_command: format!("sh {}", converter.display()),
        ..Default::default()
    }
}

#[test]
fn test_split_all_runs() {
    let tools = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    std::fs::write(data.path().join("run001.cmat"), b"").unwrap();
    std::fs::write(data.path().join("run003.cmat"), b"").unwrap();
    let config = setup(tools.path(), data.path(), dest.path());

    let mut statuses = Vec::new();
    let n_spectra = split_matrices(&config, &mut |status| statuses.push(status)).unwrap();
    assert_eq!(n_spectra, 4);

    for name in [
        "run001_det01.txt",
        "run001_det02.txt",
        "run003_det01.txt",
        "run003_det02.txt",
    ] {
        assert!(dest.path().join(name).exists(), "{name} is missing");
    }
    // Binary intermediates are gone, the script stays until cleanup
    assert!(!data.path().join("run001_det01").exists());
    assert!(!data.path().join("run003_det02").exists());
    assert!(data.path().join(SCRIPT_NAME).exists());

    let last = statuses.last().unwrap();
    assert_eq!(last.stage, Stage::Splitting);
    assert_eq!(last.progress, 1.0);

    let matrix = load_spectra(1, &config).unwrap();
    assert_eq!(matrix.max_run, 3);
    assert!(matrix.run_spectrum(2).unwrap().iter().all(|v| *v == 0.0));
    assert_eq!(matrix.run_spectrum(3).unwrap()[7], 70.0);
}

#[test]
fn test_failing_cmat_is_reported() {
    let tools = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    std::fs::write(data.path().join("run001.cmat"), b"").unwrap();
    let config = Config {
        cmat_command: String::from("sh -c false"),
        ..setup(tools.path(), data.path(), dest.path())
    };

    let result = split_matrices(&config, &mut |_| ());
    assert!(matches!(
        result,
        Err(ProcessorError::SplitterError(SplitterError::ToolFailed { .. }))
    ));

    // With the exit status ignored we only notice that nothing was produced
    let lenient = Config {
        ignore_tool_status: true,
        ..config
    };
    let result = split_matrices(&lenient, &mut |_| ());
    assert!(matches!(
        result,
        Err(ProcessorError::SplitterError(SplitterError::NoSplitSpectra(_)))
    ));
}

#[test]
fn test_failed_conversion_removes_intermediate() {
    let tools = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    std::fs::write(data.path().join("run001.cmat"), b"").unwrap();
    let config = Config {
        converter_command: String::from("sh -c false"),
        ..setup(tools.path(), data.path(), dest.path())
    };

    let result = split_matrices(&config, &mut |_| ());
    assert!(matches!(
        result,
        Err(ProcessorError::SplitterError(SplitterError::ToolFailed { .. }))
    ));
    assert!(!data.path().join("run001_det01").exists());
    assert!(!dest.path().join("run001_det01.txt").exists());
}
