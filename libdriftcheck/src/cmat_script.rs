use std::path::{Path, PathBuf};

use super::config::Config;
use super::constants::SCRIPT_NAME;
use super::error::ScriptError;
use super::naming::split_spectrum_name;

/// Build the cmat session which opens a run and gates on each detector individually.
///
/// cmat is driven interactively, so the session is fed through a here-document. For
/// every detector we set a diagonal gate (det, det) and store the projection as a
/// 1d spectrum named `<run>_det<NN>` in 8k-channel long format (`|l:8`).
pub fn build_split_script(run: &str, config: &Config) -> String {
    let mut script = format!("{} -l << echo\n", config.cmat_command);
    script += &format!("o {run}\n");

    for det in 0..config.n_detectors {
        script += "gate\n";
        script += "2\n";
        script += "\n";
        script += &format!("{det} {det}\n");
        script += "\n";
        script += "\n";
        script += &format!("{}|l:8\n", split_spectrum_name(run, det));
    }

    script += "q\necho";
    script
}

/// Write the cmat session for a run into the data directory
///
/// Returns the path of the written script
pub fn write_split_script(run: &str, config: &Config) -> Result<PathBuf, ScriptError> {
    let head = config.get_head()?;
    write_split_script_to(&head, run, config)
}

fn write_split_script_to(head: &Path, run: &str, config: &Config) -> Result<PathBuf, ScriptError> {
    let path = head.join(SCRIPT_NAME);
    std::fs::write(&path, build_split_script(run, config))?;
    log::debug!("Wrote cmat script for {run} to {}", path.to_string_lossy());
    Ok(path)
}
