//! Two-panel SVG line chart of the temperature and humidity series.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::Sink;
use crate::constants::{TEMP_MAX, TEMP_MIN};
use crate::error::SinkError;
use crate::series::Series;

// Layout constants
const WIDTH: usize = 800;
const MARGIN: usize = 50;
const PANEL_HEIGHT: usize = 220;
const PANEL_GAP: usize = 60;
const TITLE_HEIGHT: usize = 40;
const MARKER_RADIUS: usize = 4;
const GRID_LINES: usize = 5;

mod colors {
    pub const TEMPERATURE: &str = "#E53935";
    pub const HUMIDITY: &str = "#1E88E5";
    pub const AXIS: &str = "#9E9E9E";
    pub const GRID: &str = "#EEEEEE";
}

/// One chart panel: a value range and the points to plot in it
struct Panel<'a> {
    label: &'a str,
    color: &'a str,
    min: f64,
    max: f64,
    values: Vec<f64>,
}

/// Render both series as an SVG document
///
/// The x axis spans the series capacity, so a partially filled series draws from the
/// left and the chart does not rescale as points arrive.
#[must_use]
pub fn render_svg(series: &Series, title: &str) -> String {
    let panels = [
        Panel {
            label: "Temperature",
            color: colors::TEMPERATURE,
            min: TEMP_MIN,
            max: TEMP_MAX,
            values: series.temperatures().to_vec(),
        },
        Panel {
            label: "Humidity %",
            color: colors::HUMIDITY,
            min: 0.0,
            max: 100.0,
            values: series.humidities().iter().map(|&h| f64::from(h)).collect(),
        },
    ];

    let height = TITLE_HEIGHT + panels.len() * (PANEL_HEIGHT + PANEL_GAP) + MARGIN;
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" font-family="sans-serif" font-size="11">
  <style>
    .title {{ font-size: 16px; font-weight: bold; fill: #333; }}
    .panel-label {{ font-size: 12px; font-weight: bold; }}
    .tick {{ fill: #666; }}
    .axis {{ stroke: {}; stroke-width: 1; }}
    .grid {{ stroke: {}; stroke-width: 1; }}
  </style>
  <rect width="100%" height="100%" fill="white"/>
  <text x="{MARGIN}" y="26" class="title">{}</text>
"#,
        colors::AXIS,
        colors::GRID,
        escape(title),
    );

    let slots = series.capacity().max(2);
    for (i, panel) in panels.iter().enumerate() {
        let top = TITLE_HEIGHT + i * (PANEL_HEIGHT + PANEL_GAP) + 20;
        render_panel(&mut svg, panel, top, slots);
    }

    svg.push_str("</svg>\n");
    svg
}

fn render_panel(svg: &mut String, panel: &Panel<'_>, top: usize, slots: usize) {
    let left = MARGIN;
    let right = WIDTH - MARGIN;
    let bottom = top + PANEL_HEIGHT;
    let x_step = (right - left) as f64 / (slots - 1) as f64;
    let span = panel.max - panel.min;
    let y_of = |v: f64| bottom as f64 - (v.clamp(panel.min, panel.max) - panel.min) / span * PANEL_HEIGHT as f64;

    // String formatting into a String cannot fail
    let _ = writeln!(
        svg,
        r#"  <text x="{left}" y="{}" class="panel-label" fill="{}">{} ({} samples)</text>"#,
        top - 6,
        panel.color,
        panel.label,
        panel.values.len()
    );

    for g in 0..=GRID_LINES {
        let value = panel.min + span * g as f64 / GRID_LINES as f64;
        let y = y_of(value);
        let _ = writeln!(
            svg,
            r#"  <line x1="{left}" y1="{y:.1}" x2="{right}" y2="{y:.1}" class="grid"/>
  <text x="{}" y="{:.1}" text-anchor="end" class="tick">{value:.0}</text>"#,
            left - 6,
            y + 4.0
        );
    }
    let _ = writeln!(
        svg,
        r#"  <line x1="{left}" y1="{top}" x2="{left}" y2="{bottom}" class="axis"/>
  <line x1="{left}" y1="{bottom}" x2="{right}" y2="{bottom}" class="axis"/>"#
    );

    let points: Vec<(f64, f64)> = panel
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| (left as f64 + i as f64 * x_step, y_of(v)))
        .collect();

    if points.len() > 1 {
        let path: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
        let _ = writeln!(
            svg,
            r#"  <polyline points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
            path.join(" "),
            panel.color
        );
    }
    for ((x, y), value) in points.iter().zip(&panel.values) {
        let _ = writeln!(
            svg,
            r#"  <circle cx="{x:.1}" cy="{y:.1}" r="{MARKER_RADIUS}" fill="{}"><title>{value}</title></circle>"#,
            panel.color
        );
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Sink that draws the series as an SVG chart and writes it on completion
///
/// In live mode the file is also rewritten after every accepted sample, so a viewer
/// that reloads it follows the session.
#[derive(Debug, Clone)]
pub struct SvgChartSink {
    path: PathBuf,
    title: String,
    live: bool,
    frames: usize,
}

impl SvgChartSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            live: false,
            frames: 0,
        }
    }

    #[must_use]
    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of charts rendered so far
    #[must_use]
    pub const fn frames(&self) -> usize {
        self.frames
    }

    fn write(&mut self, series: &Series) -> Result<(), SinkError> {
        let svg = render_svg(series, &self.title);
        self.frames += 1;
        fs::write(&self.path, svg).map_err(|source| SinkError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}

impl Sink for SvgChartSink {
    fn on_sample(&mut self, series: &Series) {
        if !self.live {
            return;
        }
        match self.write(series) {
            Ok(()) => debug!(path = %self.path.display(), samples = series.len(), "chart refreshed"),
            Err(e) => warn!("live chart update failed: {e}"),
        }
    }

    fn on_complete(&mut self, series: &Series) -> Result<(), SinkError> {
        self.write(series)?;
        info!(path = %self.path.display(), samples = series.len(), "chart saved");
        Ok(())
    }
}
