use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::cmat_script::write_split_script;
use super::config::Config;
use super::constants::SCRIPT_NAME;
use super::error::SplitterError;
use super::naming::{ascii_spectrum_name, run_name, NamePatterns};

/// A raw GASPware matrix belonging to the data set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatrix {
    pub run_number: u32,
    /// File name without extension; this is what cmat is asked to open
    pub run_name: String,
}

/// Find all raw matrices in the data directory which match the configured pattern
///
/// Matrices are returned sorted by run number. Finding none is fatal.
pub fn find_raw_matrices(config: &Config) -> Result<Vec<RawMatrix>, SplitterError> {
    let head = config.get_head()?;
    let tail = config.get_tail()?;
    let patterns = NamePatterns::new(&tail)?;

    let mut matrices: Vec<RawMatrix> = Vec::new();
    for item in head.read_dir()? {
        let item_path = item?.path();
        let Some(file_name) = item_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(run_number) = patterns.match_raw_matrix(file_name) {
            matrices.push(RawMatrix {
                run_number,
                run_name: run_name(file_name).to_string(),
            });
        }
    }

    if matrices.is_empty() {
        return Err(SplitterError::NoRawMatrices { tail, path: head });
    }

    matrices.sort_by_key(|m| m.run_number);
    Ok(matrices)
}

/// Splitter drives cmat and the ascii converter for one data set.
///
/// cmat writes its spectra into the data directory (it cannot deal with long paths, so
/// it is always run from there). The splitter then converts each spectrum to ascii in
/// the destination directory and removes the binary intermediate.
#[derive(Debug)]
pub struct Splitter<'a> {
    config: &'a Config,
    head: PathBuf,
    dest: PathBuf,
    patterns: NamePatterns,
}

impl<'a> Splitter<'a> {
    /// Create a new Splitter.
    ///
    /// Creates the destination directory if needed.
    pub fn new(config: &'a Config) -> Result<Self, SplitterError> {
        let head = config.get_head()?;
        let dest = config.get_dest()?;
        let patterns = NamePatterns::new(&config.get_tail()?)?;
        std::fs::create_dir_all(&dest)?;
        Ok(Self {
            config,
            head,
            dest,
            patterns,
        })
    }

    /// Split one run into per-detector ascii spectra
    ///
    /// Returns the paths of the ascii spectra that were produced
    pub fn split_run(&self, matrix: &RawMatrix) -> Result<Vec<PathBuf>, SplitterError> {
        write_split_script(&matrix.run_name, self.config)?;
        self.run_script()?;
        self.harvest()
    }

    /// Execute the cmat script from within the data directory
    fn run_script(&self) -> Result<(), SplitterError> {
        let mut command = Command::new("sh");
        command.arg(SCRIPT_NAME).current_dir(&self.head);
        run_tool(&self.config.cmat_command, &mut command, self.config.ignore_tool_status)
    }

    /// Convert every split spectrum in the data directory and delete the intermediates
    pub fn harvest(&self) -> Result<Vec<PathBuf>, SplitterError> {
        let mut split_files: Vec<String> = Vec::new();
        for item in self.head.read_dir()? {
            let item_path = item?.path();
            if let Some(file_name) = item_path.file_name().and_then(|n| n.to_str()) {
                if self.patterns.is_split_spectrum(file_name) {
                    split_files.push(file_name.to_string());
                }
            }
        }

        if split_files.is_empty() {
            return Err(SplitterError::NoSplitSpectra(self.head.clone()));
        }
        split_files.sort();

        let mut produced: Vec<PathBuf> = Vec::with_capacity(split_files.len());
        let mut total_bytes: u64 = 0;
        for split_name in split_files {
            let split_path = self.head.join(&split_name);
            let ascii_path = self.dest.join(ascii_spectrum_name(&split_name));
            // The intermediate goes either way, or the next harvest would pick it up again
            let converted = self.convert(&split_path, &ascii_path);
            std::fs::remove_file(&split_path)?;
            converted?;
            match ascii_path.metadata() {
                Ok(meta) => total_bytes += meta.len(),
                Err(_) => log::warn!(
                    "Converter did not produce {}",
                    ascii_path.to_string_lossy()
                ),
            }
            produced.push(ascii_path);
        }

        log::info!(
            "Converted {} spectra ({})",
            produced.len(),
            human_bytes::human_bytes(total_bytes as f64)
        );
        Ok(produced)
    }

    fn convert(&self, split_path: &Path, ascii_path: &Path) -> Result<(), SplitterError> {
        let mut command = tool_command(&self.config.converter_command)?;
        command.arg(split_path).arg(ascii_path);
        run_tool(
            &self.config.converter_command,
            &mut command,
            self.config.ignore_tool_status,
        )
    }
}

/// Build a Command from a command line which may carry leading arguments (e.g. `sh mkascii`)
fn tool_command(command_line: &str) -> Result<Command, SplitterError> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next().ok_or(SplitterError::EmptyCommand)?;
    let mut command = Command::new(program);
    command.args(parts);
    Ok(command)
}

/// Run an external tool to completion with its output discarded
fn run_tool(tool: &str, command: &mut Command, ignore_status: bool) -> Result<(), SplitterError> {
    let status = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| SplitterError::ToolLaunch {
            tool: tool.to_string(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else if ignore_status {
        log::warn!("{tool} exited with {status}, continuing anyway");
        Ok(())
    } else {
        Err(SplitterError::ToolFailed {
            tool: tool.to_string(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_raw_matrices() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["run010.cmat", "run002.cmat", "run003.txt", "other001.cmat"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let config = Config {
            pattern: dir.path().join("run"),
            ..Default::default()
        };
        let matrices = find_raw_matrices(&config).unwrap();
        let runs: Vec<(u32, &str)> = matrices
            .iter()
            .map(|m| (m.run_number, m.run_name.as_str()))
            .collect();
        assert_eq!(runs, vec![(2, "run002"), (10, "run010")]);
    }

    #[test]
    fn test_no_raw_matrices() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            pattern: dir.path().join("run"),
            ..Default::default()
        };
        match find_raw_matrices(&config) {
            Err(SplitterError::NoRawMatrices { tail, .. }) => assert_eq!(tail, "run"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_tool_command_with_arguments() {
        let command = tool_command("sh /opt/fake_convert").unwrap();
        assert_eq!(command.get_program(), "sh");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["/opt/fake_convert"]);
        assert!(matches!(tool_command("   "), Err(SplitterError::EmptyCommand)));
    }

    #[test]
    fn test_missing_tool() {
        let mut command = tool_command("definitely-not-a-real-gaspware-tool").unwrap();
        let result = run_tool("definitely-not-a-real-gaspware-tool", &mut command, true);
        assert!(matches!(result, Err(SplitterError::ToolLaunch { .. })));
    }
}
