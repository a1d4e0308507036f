use ndarray::Array2;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_cairo::CairoBackend;
use std::path::PathBuf;

use super::config::{Config, PlotFormat};
use super::constants::{PLOT_HEIGHT, PLOT_WIDTH};
use super::error::PlotError;
use super::naming::{detector_number, plot_file_name};
use super::spectrum::DetectorMatrix;

/// Color for cells below the log floor, so that empty runs stand out from low counts
const UNDER_COLOR: RGBColor = WHITE;

/// Logarithmic normalization of counts onto [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNorm {
    pub vmin: f64,
    pub vmax: f64,
}

impl LogNorm {
    /// The floor is the smallest count plus one so that it is never zero for count data
    pub fn from_matrix(data: &Array2<f64>) -> Self {
        let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Self {
            vmin: min + 1.0,
            vmax: max,
        }
    }

    /// A norm whose ceiling is below its floor (or a non-positive floor) maps nothing
    pub fn is_degenerate(&self) -> bool {
        self.vmax < self.vmin || self.vmin <= 0.0
    }

    /// Position of a value on the color scale, or None if it falls below the floor
    pub fn normalize(&self, value: f64) -> Option<f64> {
        if self.is_degenerate() || value.is_nan() || value < self.vmin {
            return None;
        }
        if self.vmax <= self.vmin {
            return Some(0.0);
        }
        let t = (value.ln() - self.vmin.ln()) / (self.vmax.ln() - self.vmin.ln());
        Some(t.clamp(0.0, 1.0))
    }

    pub fn color(&self, value: f64) -> RGBColor {
        match self.normalize(value) {
            Some(t) => ViridisRGB.get_color(t),
            None => UNDER_COLOR,
        }
    }
}

/// Render the run-over-channel heatmap of one detector into the destination directory
///
/// Returns the path of the written image
pub fn render_detector_plot(
    matrix: &DetectorMatrix,
    config: &Config,
) -> Result<PathBuf, PlotError> {
    if matrix.max_run == 0 || matrix.n_channels() == 0 {
        return Err(PlotError::EmptyMatrix(detector_number(matrix.detector)));
    }

    let path = config
        .get_dest()?
        .join(plot_file_name(matrix.detector, config.plot_format));

    let norm = LogNorm::from_matrix(&matrix.data);
    if norm.is_degenerate() {
        log::warn!(
            "Detector {} has no counts above the log floor ({} to {}); plot will be blank",
            detector_number(matrix.detector),
            norm.vmin,
            norm.vmax
        );
    }

    match config.plot_format {
        PlotFormat::Pdf => {
            let surface =
                cairo::PdfSurface::new(f64::from(PLOT_WIDTH), f64::from(PLOT_HEIGHT), &path)
                    .map_err(|e| PlotError::DrawingError(format!("{e:?}")))?;
            let context = cairo::Context::new(&surface)
                .map_err(|e| PlotError::DrawingError(format!("{e:?}")))?;
            let backend = CairoBackend::new(&context, (PLOT_WIDTH, PLOT_HEIGHT))
                .map_err(|e| PlotError::DrawingError(format!("{e:?}")))?;
            draw_heatmap(&backend.into_drawing_area(), matrix, &norm)?;
            // The page is only written out once the surface is finished
            surface.finish();
        }
        PlotFormat::Png => {
            let root = BitMapBackend::new(&path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
            draw_heatmap(&root, matrix, &norm)?;
        }
        PlotFormat::Svg => {
            let root = SVGBackend::new(&path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
            draw_heatmap(&root, matrix, &norm)?;
        }
    }

    Ok(path)
}

fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    matrix: &DetectorMatrix,
    norm: &LogNorm,
) -> Result<(), PlotError> {
    root.fill(&WHITE)?;

    let max_run = matrix.max_run as f64;
    let channels = matrix.channels();
    let (lo, hi) = (channels.start as f64, channels.end as f64);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..max_run, lo..hi)?;

    chart.plotting_area().fill(&UNDER_COLOR)?;

    // Under-floor cells are already painted by the background fill
    chart.draw_series(matrix.data.indexed_iter().filter_map(|((channel, run), value)| {
        norm.normalize(*value)?;
        let x = run as f64;
        let y = lo + channel as f64;
        Some(Rectangle::new(
            [(x, y), (x + 1.0, y + 1.0)],
            norm.color(*value).filled(),
        ))
    }))?;

    let label_style = TextStyle::from(("sans-serif", 28).into_font())
        .color(&WHITE)
        .pos(Pos::new(HPos::Right, VPos::Bottom));
    chart.draw_series(std::iter::once(Text::new(
        format!("Det {}", detector_number(matrix.detector)),
        (0.95 * max_run, lo + 0.9 * (hi - lo)),
        label_style,
    )))?;

    // Axes go last so the cells do not cover them
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Run")
        .y_desc("Channel")
        .label_style(("sans-serif", 22))
        .axis_desc_style(("sans-serif", 22))
        .draw()?;

    root.present()?;
    Ok(())
}
