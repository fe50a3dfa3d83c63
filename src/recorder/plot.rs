use std::fmt::Display;
use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::error::TelemetryError;
use crate::recorder::ValueTrace;

/// Image size and smoothing applied to every rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotSettings {
    pub smoothing_window: usize,
    pub width: u32,
    pub height: u32,
}

fn plot_error<E: Display>(path: &Path) -> impl Fn(E) -> TelemetryError + '_ {
    move |e| TelemetryError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Axis ranges covering `count` points and every finite value in `values`.
fn axis_ranges<'a>(
    count: usize,
    values: impl Iterator<Item = &'a f64>,
) -> (Range<f64>, Range<f64>) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let y_range = if lo > hi {
        -1.0..1.0
    } else if lo == hi {
        lo - 1.0..hi + 1.0
    } else {
        let pad = (hi - lo) * 0.05;
        lo - pad..hi + pad
    };
    (0.0..count.max(1) as f64, y_range)
}

fn indexed(values: &[f64]) -> impl Iterator<Item = (f64, f64)> + '_ {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, &v)| (i as f64, v))
}

/// Scatter `values` against their index with `smoothed` drawn over them.
pub fn render_series(
    path: &Path,
    name: &str,
    values: &[f64],
    smoothed: &[f64],
    settings: PlotSettings,
) -> Result<(), TelemetryError> {
    let root = SVGBackend::new(path, (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error(path))?;

    {
        let (x_range, y_range) = axis_ranges(values.len(), values.iter().chain(smoothed));
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(x_range, y_range)
            .map_err(plot_error(path))?;

        chart
            .configure_mesh()
            .x_desc("Updates")
            .y_desc(name)
            .draw()
            .map_err(plot_error(path))?;

        let point_style = BLUE.filled();
        chart
            .draw_series(indexed(values).map(|p| Circle::new(p, 2, point_style)))
            .map_err(plot_error(path))?;
        chart
            .draw_series(LineSeries::new(indexed(smoothed), &RED))
            .map_err(plot_error(path))?;
    }

    root.present().map_err(plot_error(path))?;
    Ok(())
}

/// Mean, max and min value traces as three scatter series.
pub fn render_value_trace(
    path: &Path,
    trace: &ValueTrace,
    settings: PlotSettings,
) -> Result<(), TelemetryError> {
    let root = SVGBackend::new(path, (settings.width, settings.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error(path))?;

    {
        let all = trace.mean.iter().chain(&trace.max).chain(&trace.min);
        let (x_range, y_range) = axis_ranges(trace.len(), all);
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(x_range, y_range)
            .map_err(plot_error(path))?;

        chart
            .configure_mesh()
            .x_desc("Updates")
            .y_desc("V(s)")
            .draw()
            .map_err(plot_error(path))?;

        for (label, series, color) in [
            ("mean", &trace.mean, BLUE),
            ("max", &trace.max, RED),
            ("min", &trace.min, GREEN),
        ] {
            let style = color.filled();
            chart
                .draw_series(indexed(series).map(|p| Circle::new(p, 2, style)))
                .map_err(plot_error(path))?
                .label(label)
                .legend(move |(x, y)| Circle::new((x, y), 3, style));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_error(path))?;
    }

    root.present().map_err(plot_error(path))?;
    Ok(())
}
