//! # driftcheck
//!
//! driftcheck is a tool for the visual inspection of detector drifts across the runs of
//! an experiment, for data sorted with GASPware. It splits the combined detector matrices
//! of each run into one spectrum per detector, stacks the spectra of all runs, and renders
//! one run-over-channel heatmap per detector. Gain drifts show up as peaks wandering in
//! channel from run to run; missing runs show up as blank columns.
//!
//! ## Requirements
//!
//! Splitting the matrices needs the GASPware tools `cmat` and `mkascii16k` on the `PATH`
//! (other locations can be configured). Plotting alone only needs the converted ascii
//! spectra.
//!
//! ## Pipeline
//!
//! 1. (`--full`) For every matrix `<tail><RUN>.cmat` next to the pattern, a cmat script
//! (`split_run.sh`) is written which gates on each detector and saves the projection as
//! `<tail><RUN>_det<NN>`. Each of those is converted to `<tail><RUN>_det<NN>.txt` in the
//! destination directory and the binary intermediate is removed.
//! 2. For every detector the ascii spectra are stacked into a channel x run matrix and
//! rendered to `det<N>.pdf` (or `.png` / `.svg`). With `--write` the matrix is also saved as
//! `<tail>det<NN>.mat`.
//! 3. (`--clear`) The cmat script and the ascii spectra are removed.
//!
//! ## Configuration
//!
//! Every option can be given on the command line or in a YAML file. The format of a
//! configuration file is as follows:
//!
//! ```yml
//! pattern: /data/experiment/run
//! dest_path: .
//! n_detectors: 25
//! channel_range:
//! - 0
//! - 8191
//! full: false
//! write_matrices: false
//! clear: false
//! cmat_command: cmat
//! converter_command: mkascii16k
//! plot_format: pdf
//! ignore_tool_status: false
//! ```
pub mod cleanup;
pub mod cmat_script;
pub mod config;
pub mod constants;
pub mod error;
pub mod naming;
pub mod plot;
pub mod process;
pub mod spectrum;
pub mod splitter;
pub mod status;
