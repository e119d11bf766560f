//! Radar chart rendering.
//!
//! Scores are plotted on a fixed 0–5 radial axis, starting at twelve
//! o'clock and going clockwise in dimension order. The output is a
//! standalone SVG document.

use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::scoring::{clamp_score, Scores, MAX_DIMENSIONS, MIN_DIMENSIONS, SCORE_MAX};

const SIZE: f64 = 480.0;
const CENTER: f64 = SIZE / 2.0;
const RADIUS: f64 = 160.0;
const LABEL_OFFSET: f64 = 24.0;
const LINE_COLOR: &str = "#0288D1";
const FILL_COLOR: &str = "rgba(2, 136, 209, 0.3)";
const GRID_COLOR: &str = "#CCCCCC";

/// A radar chart of derived scores.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarChart {
    title: Option<String>,
    axes: Vec<(String, f64)>,
}

impl RadarChart {
    /// Builds a chart with one axis per score.
    ///
    /// # Errors
    ///
    /// Returns a scoring error unless there are 3 to 5 scores.
    pub fn from_scores(scores: &Scores) -> Result<Self> {
        let n = scores.len();
        if !(MIN_DIMENSIONS..=MAX_DIMENSIONS).contains(&n) {
            return Err(Error::scoring(format!(
                "radar chart needs {MIN_DIMENSIONS} to {MAX_DIMENSIONS} scores, got {n}"
            )));
        }
        Ok(Self {
            title: None,
            axes: scores
                .iter()
                .map(|s| (s.label.clone(), clamp_score(s.value)))
                .collect(),
        })
    }

    /// Sets a title drawn above the chart.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of axes.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Whether the chart has no axes.
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Polygon vertices in SVG coordinates, one per axis.
    pub fn vertices(&self) -> Vec<(f64, f64)> {
        let n = self.axes.len();
        self.axes
            .iter()
            .enumerate()
            .map(|(i, (_, value))| point(i, n, value / SCORE_MAX * RADIUS))
            .collect()
    }

    /// Renders the chart as an SVG document.
    pub fn to_svg(&self) -> String {
        let n = self.axes.len();
        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SIZE}" height="{SIZE}" viewBox="0 0 {SIZE} {SIZE}" font-family="sans-serif" font-size="12">"#
        ));
        svg.push('\n');

        if let Some(title) = &self.title {
            svg.push_str(&format!(
                r#"  <text x="{CENTER}" y="24" text-anchor="middle" font-size="16" font-weight="bold">{}</text>"#,
                escape(title)
            ));
            svg.push('\n');
        }

        // Rings at 1..=5.
        for ring in 1..=SCORE_MAX as usize {
            let r = ring as f64 / SCORE_MAX * RADIUS;
            let ring_points: Vec<(f64, f64)> = (0..n).map(|i| point(i, n, r)).collect();
            svg.push_str(&format!(
                r#"  <polygon class="ring" points="{}" fill="none" stroke="{GRID_COLOR}" stroke-width="1"/>"#,
                points_attr(&ring_points)
            ));
            svg.push('\n');
        }

        for (i, (label, _)) in self.axes.iter().enumerate() {
            let (x, y) = point(i, n, RADIUS);
            svg.push_str(&format!(
                r#"  <line class="spoke" x1="{CENTER}" y1="{CENTER}" x2="{x:.2}" y2="{y:.2}" stroke="{GRID_COLOR}" stroke-width="1"/>"#
            ));
            svg.push('\n');
            svg.push_str(&label_text(i, n, label));
            svg.push('\n');
        }

        let vertices = self.vertices();
        svg.push_str(&format!(
            r#"  <polygon class="scores" points="{}" fill="{FILL_COLOR}" stroke="{LINE_COLOR}" stroke-width="2"/>"#,
            points_attr(&vertices)
        ));
        svg.push('\n');
        for ((x, y), (_, value)) in vertices.iter().zip(&self.axes) {
            svg.push_str(&format!(
                r#"  <circle class="marker" cx="{x:.2}" cy="{y:.2}" r="4" fill="{LINE_COLOR}"><title>{value:.2}</title></circle>"#
            ));
            svg.push('\n');
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn point(index: usize, count: usize, r: f64) -> (f64, f64) {
    let angle = -PI / 2.0 + 2.0 * PI * index as f64 / count as f64;
    (CENTER + r * angle.cos(), CENTER + r * angle.sin())
}

fn points_attr(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn label_text(index: usize, count: usize, label: &str) -> String {
    let (x, y) = point(index, count, RADIUS + LABEL_OFFSET);
    let dx = x - CENTER;
    let anchor = if dx.abs() < 1.0 {
        "middle"
    } else if dx > 0.0 {
        "start"
    } else {
        "end"
    };
    let mut text = format!(r#"  <text class="label" x="{x:.2}" y="{y:.2}" text-anchor="{anchor}">"#);
    for (line_no, line) in label.lines().enumerate() {
        let dy = if line_no == 0 { "0" } else { "1.2em" };
        text.push_str(&format!(
            r#"<tspan x="{x:.2}" dy="{dy}">{}</tspan>"#,
            escape(line)
        ));
    }
    text.push_str("</text>");
    text
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scoring::DerivedScore;

    fn scores(values: &[f64]) -> Scores {
        Scores {
            profile: "test".to_string(),
            scores: values
                .iter()
                .enumerate()
                .map(|(i, v)| DerivedScore {
                    key: format!("d{i}"),
                    label: format!("Dim {i}"),
                    value: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn test_rejects_too_few_or_many() {
        assert!(RadarChart::from_scores(&scores(&[1.0, 2.0])).is_err());
        assert!(RadarChart::from_scores(&scores(&[1.0; 6])).is_err());
        assert_eq!(RadarChart::from_scores(&scores(&[1.0; 5])).unwrap().len(), 5);
    }

    #[test]
    fn test_first_vertex_points_up() {
        let chart = RadarChart::from_scores(&scores(&[5.0, 0.0, 2.5])).unwrap();
        let v = chart.vertices();
        assert!((v[0].0 - CENTER).abs() < 1e-9);
        assert!((v[0].1 - (CENTER - RADIUS)).abs() < 1e-9);
        // A zero score sits on the centre.
        assert!((v[1].0 - CENTER).abs() < 1e-9);
        assert!((v[1].1 - CENTER).abs() < 1e-9);
    }

    #[test]
    fn test_values_are_clamped() {
        let chart = RadarChart::from_scores(&scores(&[9.0, -1.0, 5.0])).unwrap();
        let v = chart.vertices();
        assert!((v[0].1 - (CENTER - RADIUS)).abs() < 1e-9);
        assert!((v[1].0 - CENTER).abs() < 1e-9);
    }

    #[test]
    fn test_svg_structure() {
        let svg = RadarChart::from_scores(&scores(&[1.0, 2.0, 3.0]))
            .unwrap()
            .with_title("Lee Mei")
            .to_svg();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("class=\"ring\"").count(), 5);
        assert_eq!(svg.matches("class=\"spoke\"").count(), 3);
        assert_eq!(svg.matches("class=\"marker\"").count(), 3);
        assert!(svg.contains(LINE_COLOR));
        assert!(svg.contains(FILL_COLOR));
        assert!(svg.contains(">Lee Mei</text>"));
    }

    #[test]
    fn test_labels_escaped_and_split() {
        let mut s = scores(&[1.0, 2.0, 3.0]);
        s.scores[0].label = "Technical & Tactical\n(技術戰術)".to_string();
        s.scores[1].label = "<b>".to_string();
        let svg = RadarChart::from_scores(&s).unwrap().to_svg();
        assert!(svg.contains("Technical &amp; Tactical</tspan>"));
        assert!(svg.contains(r#"dy="1.2em">(技術戰術)</tspan>"#));
        assert!(svg.contains("&lt;b&gt;"));
        assert!(!svg.contains("<b>"));
    }

    #[test]
    fn test_render_is_pure() {
        let chart = RadarChart::from_scores(&scores(&[1.0, 4.0, 2.0, 3.0])).unwrap();
        assert_eq!(chart.to_svg(), chart.to_svg());
    }
}
