//! Chart rendering for a merged results store
//!
//! Four fixed-name PNG files are produced in the output directory: one bar
//! chart per scalar metric and one line chart of memory over time.

use crate::error::{Error, Result};
use crate::model::{ExperimentResult, MemorySample};
use crate::store::ResultsStore;
use charts_rs::{svg_to_png, BarChart, Color, LegendCategory, LineChart, Series};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result files read by default, relative to the working directory
pub const DEFAULT_INPUT_FILES: [&str; 2] = ["results_1.json", "results_3.json"];

pub const DEFAULT_OUTPUT_DIR: &str = "output";

pub const MEMORY_CHART_FILE: &str = "memory_usage_series.png";

/// Approximate number of labelled ticks on the memory chart's x-axis
const LINE_CHART_LABELS: usize = 10;

const THEME: &str = "light";

/// Scalar metric plotted as a bar per experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMetric {
    OpsTime,
    TotalTime,
    FinalMemoryUsage,
}

impl BarMetric {
    pub const ALL: [BarMetric; 3] = [
        BarMetric::OpsTime,
        BarMetric::TotalTime,
        BarMetric::FinalMemoryUsage,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            BarMetric::OpsTime => "ops_time.png",
            BarMetric::TotalTime => "total_time.png",
            BarMetric::FinalMemoryUsage => "final_memory_usage.png",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            BarMetric::OpsTime => "Table operations time",
            BarMetric::TotalTime => "Total execution time (including load and overhead)",
            BarMetric::FinalMemoryUsage => "Final memory usage",
        }
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            BarMetric::OpsTime => "Operations time (s)",
            BarMetric::TotalTime => "Total time (s)",
            BarMetric::FinalMemoryUsage => "Memory (MB)",
        }
    }

    pub fn value(&self, result: &ExperimentResult) -> f64 {
        match self {
            BarMetric::OpsTime => result.ops_time,
            BarMetric::TotalTime => result.total_time,
            BarMetric::FinalMemoryUsage => result.final_memory_usage,
        }
    }

    fn color(&self) -> Color {
        match self {
            // skyblue
            BarMetric::OpsTime => Color { r: 135, g: 206, b: 235, a: 255 },
            // salmon
            BarMetric::TotalTime => Color { r: 250, g: 128, b: 114, a: 255 },
            // lightgreen
            BarMetric::FinalMemoryUsage => Color { r: 144, g: 238, b: 144, a: 255 },
        }
    }
}

/// Categories and values of one bar chart, in ascending key order
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartData {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

pub fn bar_chart_data(store: &ResultsStore, metric: BarMetric) -> BarChartData {
    let (categories, values): (Vec<String>, Vec<f64>) = store
        .iter()
        .map(|(key, result)| (key.clone(), metric.value(result)))
        .unzip();
    BarChartData { categories, values }
}

/// Memory series to plot, one per experiment that has samples
pub fn memory_series(store: &ResultsStore) -> Vec<(String, &[MemorySample])> {
    store
        .iter()
        .filter_map(|(key, result)| {
            if result.memory_usage_over_time.is_empty() {
                warn!(experiment = %key, "no memory_usage_over_time samples, skipping");
                None
            } else {
                Some((key.clone(), result.memory_usage_over_time.as_slice()))
            }
        })
        .collect()
}

/// Memory series aligned on a shared elapsed-seconds axis
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledSeries {
    pub x_axis: Vec<f64>,
    pub series: Vec<(String, Vec<f32>)>,
}

/// Align every series on the sorted union of all sample times.
///
/// Each series keeps its own samples as exact points, so peaks survive; at
/// other series' times it is linearly interpolated, and before its first
/// sample the first value is used. A series ends at its own last sample, so
/// shorter runs produce shorter lines.
pub fn resample(series: &[(String, &[MemorySample])]) -> ResampledSeries {
    let mut x_axis: Vec<f64> = series
        .iter()
        .flat_map(|(_, samples)| samples.iter().map(|s| s.elapsed_secs()))
        .collect();
    x_axis.sort_by(f64::total_cmp);
    x_axis.dedup();

    let series = series
        .iter()
        .map(|(name, samples)| {
            let last_elapsed = samples.last().map(|s| s.elapsed_secs()).unwrap_or(0.0);
            let values = x_axis
                .iter()
                .take_while(|&&x| x <= last_elapsed)
                .map(|&x| interpolate(samples, x) as f32)
                .collect();
            (name.clone(), values)
        })
        .collect();

    ResampledSeries { x_axis, series }
}

fn interpolate(samples: &[MemorySample], x: f64) -> f64 {
    let pos = match samples.iter().position(|s| s.elapsed_secs() >= x) {
        None => return samples.last().map(|s| s.memory_mb()).unwrap_or(0.0),
        Some(0) => return samples[0].memory_mb(),
        Some(pos) => pos,
    };

    let (x1, y1) = (samples[pos - 1].elapsed_secs(), samples[pos - 1].memory_mb());
    let (x2, y2) = (samples[pos].elapsed_secs(), samples[pos].memory_mb());
    if x2 > x1 {
        y1 + (x - x1) / (x2 - x1) * (y2 - y1)
    } else {
        y1
    }
}

/// Writes the report charts into a single output directory
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    output_dir: PathBuf,
}

impl ReportRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render every chart for `store`, returning the paths written.
    ///
    /// All four charts are always written. An empty store gives empty bar
    /// charts and a memory chart without lines.
    pub fn render(&self, store: &ResultsStore) -> Result<Vec<PathBuf>> {
        if store.is_empty() {
            warn!("no experiments loaded, charts will be empty");
        }
        fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::new();
        for metric in BarMetric::ALL {
            written.push(self.render_bar_chart(store, metric)?);
        }
        written.push(self.render_memory_chart(store)?);
        Ok(written)
    }

    pub fn render_bar_chart(&self, store: &ResultsStore, metric: BarMetric) -> Result<PathBuf> {
        let svg = bar_chart_svg(store, metric)?;
        let path = self.output_dir.join(metric.file_name());
        write_png(&path, &svg)?;
        info!(path = %path.display(), "saved plot");
        Ok(path)
    }

    pub fn render_memory_chart(&self, store: &ResultsStore) -> Result<PathBuf> {
        let svg = memory_chart_svg(store)?;
        let path = self.output_dir.join(MEMORY_CHART_FILE);
        write_png(&path, &svg)?;
        info!(path = %path.display(), "saved plot");
        Ok(path)
    }
}

pub fn bar_chart_svg(store: &ResultsStore, metric: BarMetric) -> Result<String> {
    let data = bar_chart_data(store, metric);
    let values = data.values.iter().map(|&v| v as f32).collect();

    let mut chart = BarChart::new_with_theme(
        vec![Series::new(metric.axis_label().to_string(), values)],
        data.categories,
        THEME,
    );
    chart.title_text = format!("{} - {}", metric.title(), metric.axis_label());
    chart.width = 800.0;
    chart.height = 600.0;
    chart.legend_show = Some(false);
    chart.series_colors = vec![metric.color()];

    chart.svg().map_err(|e| Error::Chart(e.to_string()))
}

/// SVG of the memory-over-time chart, one line per experiment with samples
pub fn memory_chart_svg(store: &ResultsStore) -> Result<String> {
    let series = memory_series(store);
    if series.is_empty() {
        warn!("no memory samples in any experiment, memory chart has no lines");
    }

    let resampled = resample(&series);
    let series_list = resampled
        .series
        .into_iter()
        .map(|(name, values)| Series::new(name, values))
        .collect();

    let step = resampled.x_axis.len().div_ceil(LINE_CHART_LABELS).max(1);
    let mut x_axis: Vec<String> = resampled
        .x_axis
        .iter()
        .enumerate()
        .map(|(i, x)| {
            if i % step == 0 {
                format!("{:.1}s", x)
            } else {
                String::new()
            }
        })
        .collect();
    if x_axis.is_empty() {
        x_axis.push(format!("{:.1}s", 0.0));
    }

    let mut chart = LineChart::new_with_theme(series_list, x_axis, THEME);
    chart.title_text = "Memory usage over time - Memory (MB)".to_string();
    chart.width = 1000.0;
    chart.height = 800.0;
    chart.legend_category = LegendCategory::Normal;

    chart.svg().map_err(|e| Error::Chart(e.to_string()))
}

fn write_png(path: &Path, svg: &str) -> Result<()> {
    let png = svg_to_png(svg).map_err(|e| Error::Chart(e.to_string()))?;
    fs::write(path, png)?;
    Ok(())
}
