use plotters::style::RGBColor;
use report_core::error::{ReportError, Result};
use report_core::models::Metric;
use report_core::settings::MetricStyles;

/// Resolve a colour specification.
///
/// Accepts `#rrggbb`, `#rgb`, the single-letter codes `r g b c m y k w` and a few
/// common names. Matching is case-insensitive.
pub fn parse_color(name: &str) -> Result<RGBColor> {
    let s = name.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| unknown_color(name));
    }

    let rgb = match s.as_str() {
        "b" | "blue" => (0, 0, 255),
        "g" => (0, 128, 0),
        "r" | "red" => (255, 0, 0),
        "c" => (0, 191, 191),
        "m" => (191, 0, 191),
        "y" => (191, 191, 0),
        "k" | "black" => (0, 0, 0),
        "w" | "white" => (255, 255, 255),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "limegreen" => (50, 205, 50),
        "darkgreen" => (0, 100, 0),
        "orange" => (255, 165, 0),
        "gold" => (255, 215, 0),
        "navy" => (0, 0, 128),
        "purple" => (128, 0, 128),
        "cyan" => (0, 255, 255),
        "magenta" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        _ => return Err(unknown_color(name)),
    };
    Ok(RGBColor(rgb.0, rgb.1, rgb.2))
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(RGBColor(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some(RGBColor(digits.next()??, digits.next()??, digits.next()??))
        }
        _ => None,
    }
}

fn unknown_color(name: &str) -> ReportError {
    ReportError::Config(format!("unknown colour {name:?}"))
}

// ── Palette ───────────────────────────────────────────────────────────────────

/// Resolved colours of every metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    lines: [RGBColor; 3],
    averages: [Option<RGBColor>; 3],
}

impl Palette {
    /// Resolve every configured colour, failing on the first unknown one.
    pub fn from_styles(styles: &MetricStyles) -> Result<Self> {
        let mut lines = [RGBColor(0, 0, 0); 3];
        let mut averages = [None; 3];
        for (i, metric) in Metric::ALL.iter().enumerate() {
            let style = styles.get(*metric);
            lines[i] = parse_color(&style.color)?;
            averages[i] = match style.average_color.as_deref() {
                Some(name) if !name.trim().is_empty() => Some(parse_color(name)?),
                _ => None,
            };
        }
        Ok(Self { lines, averages })
    }

    /// Colour of the raw series.
    pub fn line(&self, metric: Metric) -> RGBColor {
        self.lines[Self::slot(metric)]
    }

    /// Colour of the daily-average overlay, if one is configured.
    pub fn average(&self, metric: Metric) -> Option<RGBColor> {
        self.averages[Self::slot(metric)]
    }

    fn slot(metric: Metric) -> usize {
        match metric {
            Metric::Power => 0,
            Metric::EnergyToday => 1,
            Metric::EnergyTotal => 2,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
