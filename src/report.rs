//! Benchmark comparison chart.
//!
//! Two bars, one per strategy, in a coloured terminal rendering for display
//! and a standalone SVG document for the persisted artifact.

use crate::config::SystemProfile;
use crate::constants::chart::{
    BAR_WIDTH_FRACTION, HEIGHT, PARALLEL_COLOUR, PARALLEL_LABEL, SEQUENTIAL_COLOUR,
    SEQUENTIAL_LABEL, TERMINAL_BAR_WIDTH, WIDTH, Y_AXIS_HEADROOM_SECS,
};
use crate::error::{Result, SigactError};
use crate::processor::BenchmarkRun;

use colored::*;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TARGET_TICKS: f64 = 5.0;

/// Elapsed times of both strategies, ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub parallel_secs: f64,
    pub sequential_secs: f64,
    pub cpu_brand: Option<String>,
}

impl BenchmarkReport {
    pub fn new(parallel: Duration, sequential: Duration) -> Self {
        Self {
            parallel_secs: parallel.as_secs_f64(),
            sequential_secs: sequential.as_secs_f64(),
            cpu_brand: None,
        }
    }

    pub fn from_run(run: &BenchmarkRun, profile: &SystemProfile) -> Self {
        Self::new(run.parallel.elapsed, run.sequential.elapsed)
            .with_cpu_brand(profile.cpu_brand.clone())
    }

    pub fn with_cpu_brand(mut self, cpu_brand: Option<String>) -> Self {
        self.cpu_brand = cpu_brand;
        self
    }

    pub fn title(&self) -> String {
        let cpu = self.cpu_brand.as_deref().unwrap_or("unknown");
        format!(
            "Comparison of execution time: {} vs {} (CPU: {})",
            PARALLEL_LABEL, SEQUENTIAL_LABEL, cpu
        )
    }

    /// Upper bound of the value axis: the slower bar plus fixed headroom
    pub fn y_axis_max(&self) -> f64 {
        self.parallel_secs.max(self.sequential_secs) + Y_AXIS_HEADROOM_SECS
    }

    pub fn speedup(&self) -> Option<f64> {
        (self.parallel_secs > 0.0).then(|| self.sequential_secs / self.parallel_secs)
    }

    fn bars(&self) -> [(&'static str, f64, &'static str); 2] {
        [
            (PARALLEL_LABEL, self.parallel_secs, PARALLEL_COLOUR),
            (SEQUENTIAL_LABEL, self.sequential_secs, SEQUENTIAL_COLOUR),
        ]
    }

    /// Horizontal bar chart for the terminal
    pub fn render_terminal(&self) -> String {
        let slowest = self.parallel_secs.max(self.sequential_secs);
        let label_width = PARALLEL_LABEL.len().max(SEQUENTIAL_LABEL.len());

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title().bright_green().bold());
        for (label, secs, _) in self.bars() {
            let length = if slowest > 0.0 {
                ((secs / slowest) * TERMINAL_BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let bar = "█".repeat(length);
            let bar = if label == PARALLEL_LABEL {
                bar.blue()
            } else {
                bar.truecolor(255, 165, 0)
            };
            let _ = writeln!(
                out,
                "  {:<width$} {} {}",
                label,
                bar,
                format!("{:.2} s", secs).bright_white().bold(),
                width = label_width
            );
        }
        if let Some(speedup) = self.speedup() {
            let _ = writeln!(out, "  Speedup: {}", format!("{:.2}x", speedup).bright_yellow());
        }
        out
    }

    /// Standalone SVG document with a vertical two-bar chart
    pub fn render_svg(&self) -> String {
        let width = f64::from(WIDTH);
        let height = f64::from(HEIGHT);
        let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = height - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + plot_height;
        let y_max = self.y_axis_max();
        let scale = |secs: f64| plot_height * secs / y_max;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = WIDTH,
            h = HEIGHT
        );
        let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="{}" text-anchor="middle" font-size="16">{}</text>"#,
            width / 2.0,
            MARGIN_TOP / 2.0,
            escape_xml(&self.title())
        );

        let step = tick_step(y_max);
        let tick_count = (y_max / step).floor() as usize;
        for index in 0..=tick_count {
            let tick = index as f64 * step;
            let y = baseline - scale(tick);
            let _ = writeln!(
                svg,
                r##"  <line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#dddddd"/>"##,
                MARGIN_LEFT,
                MARGIN_LEFT + plot_width
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{:.1}" y="{:.1}" text-anchor="end" font-size="12">{}</text>"#,
                MARGIN_LEFT - 8.0,
                y + 4.0,
                tick_label(tick, step)
            );
        }

        let slot = plot_width / 2.0;
        let bar_width = slot * BAR_WIDTH_FRACTION;
        for (index, (label, secs, colour)) in self.bars().into_iter().enumerate() {
            let centre = MARGIN_LEFT + slot * (index as f64 + 0.5);
            let bar_height = scale(secs);
            let top = baseline - bar_height;
            let _ = writeln!(
                svg,
                r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                centre - bar_width / 2.0,
                top,
                bar_width,
                bar_height,
                colour
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12">{:.2} s</text>"#,
                centre,
                top - 6.0,
                secs
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="14">{}</text>"#,
                centre,
                baseline + 24.0,
                label
            );
        }

        let _ = writeln!(
            svg,
            r#"  <line x1="{l:.1}" y1="{t:.1}" x2="{l:.1}" y2="{b:.1}" stroke="black"/>"#,
            l = MARGIN_LEFT,
            t = MARGIN_TOP,
            b = baseline
        );
        let _ = writeln!(
            svg,
            r#"  <line x1="{:.1}" y1="{b:.1}" x2="{:.1}" y2="{b:.1}" stroke="black"/>"#,
            MARGIN_LEFT,
            MARGIN_LEFT + plot_width,
            b = baseline
        );
        let _ = writeln!(
            svg,
            r#"  <text x="20" y="{:.1}" text-anchor="middle" font-size="12" transform="rotate(-90 20 {:.1})">Time (s)</text>"#,
            MARGIN_TOP + plot_height / 2.0,
            MARGIN_TOP + plot_height / 2.0
        );
        svg.push_str("</svg>\n");
        svg
    }

    /// Persist the SVG chart, creating parent directories as needed
    pub fn write_svg(&self, path: &Path) -> Result<()> {
        let failure = |reason: String| SigactError::Report {
            path: path.to_path_buf(),
            reason,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| failure(e.to_string()))?;
        }
        fs::write(path, self.render_svg()).map_err(|e| failure(e.to_string()))?;
        info!("Comparison chart written to {}", path.display());
        Ok(())
    }
}

/// Round tick spacing (1, 2 or 5 times a power of ten) giving about five ticks
fn tick_step(max: f64) -> f64 {
    let raw = max / TARGET_TICKS;
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|factor| factor * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude)
}

/// Axis label with as many decimals as the tick spacing needs
fn tick_label(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    format!("{:.*}", decimals, value)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report() -> BenchmarkReport {
        BenchmarkReport::new(Duration::from_millis(12_340), Duration::from_millis(61_005))
    }

    #[test]
    fn test_y_axis_has_headroom_above_slower_bar() {
        assert!((report().y_axis_max() - 111.005).abs() < 1e-9);

        let reversed =
            BenchmarkReport::new(Duration::from_secs(30), Duration::from_secs(10));
        assert!((reversed.y_axis_max() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_speedup() {
        assert!((report().speedup().unwrap() - 61.005 / 12.34).abs() < 1e-9);
        assert!(
            BenchmarkReport::new(Duration::ZERO, Duration::from_secs(1))
                .speedup()
                .is_none()
        );
    }

    #[test]
    fn test_title_names_cpu() {
        let report = report().with_cpu_brand(Some("Test CPU <8 cores>".to_string()));
        assert_eq!(
            report.title(),
            "Comparison of execution time: Parallel vs Sequential (CPU: Test CPU <8 cores>)"
        );
        assert!(report.render_svg().contains("Test CPU &lt;8 cores&gt;"));
    }

    #[test]
    fn test_svg_contains_both_bars() {
        let svg = report().render_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"width="800" height="500""#));
        assert!(svg.contains(">Parallel</text>"));
        assert!(svg.contains(">Sequential</text>"));
        assert!(svg.contains("12.34 s"));
        assert!(svg.contains("61.01 s") || svg.contains("61.00 s"));
        assert!(svg.contains(r#"fill="blue""#));
        assert!(svg.contains(r#"fill="orange""#));
    }

    #[test]
    fn test_terminal_rendering_lists_both_strategies() {
        let text = report().render_terminal();
        assert!(text.contains("Parallel"));
        assert!(text.contains("Sequential"));
        assert!(text.contains("12.34 s"));
        assert!(text.contains("Speedup"));
    }

    #[test]
    fn test_tick_step_is_round() {
        assert_eq!(tick_step(50.0), 10.0);
        assert_eq!(tick_step(111.0), 50.0);
        assert_eq!(tick_step(60.0), 20.0);
        assert_eq!(tick_step(0.0), 1.0);
    }

    #[test]
    fn test_tick_labels_have_no_float_noise() {
        assert_eq!(tick_label(0.1 + 0.2, 0.2), "0.3");
        assert_eq!(tick_label(3.0 * 0.05, 0.05), "0.15");
        assert_eq!(tick_label(40.0, 20.0), "40");

        let svg = report().render_svg();
        assert!(svg.contains(">100</text>"));
        assert!(!svg.contains(".0000"));
    }

    #[test]
    fn test_write_svg_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("charts").join("comparison.svg");

        report().write_svg(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, report().render_svg());
    }
}
