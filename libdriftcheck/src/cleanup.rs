use std::path::PathBuf;

use super::config::Config;
use super::error::CleanupError;
use super::naming::NamePatterns;

/// Remove the cmat script and every converted ascii spectrum of the data set.
///
/// Persisted matrices and plots are left alone. A missing script (no split in this
/// session) is not an error. Returns the paths which were removed.
pub fn clear_intermediates(config: &Config) -> Result<Vec<PathBuf>, CleanupError> {
    let dest = config.get_dest()?;
    let patterns = NamePatterns::new(&config.get_tail()?)?;
    let mut removed: Vec<PathBuf> = Vec::new();

    let script_path = config.get_script_path()?;
    match std::fs::remove_file(&script_path) {
        Ok(()) => removed.push(script_path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (),
        Err(e) => return Err(CleanupError::IOError(e)),
    }

    for item in dest.read_dir()? {
        let item_path = item?.path();
        let is_spectrum = item_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| patterns.match_ascii_spectrum(name).is_some());
        if is_spectrum {
            std::fs::remove_file(&item_path)?;
            removed.push(item_path);
        }
    }

    log::info!("Removed {} intermediate files", removed.len());
    Ok(removed)
}
