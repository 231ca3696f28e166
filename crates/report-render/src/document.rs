//! Page model of the report and the builder that lays it out.

use chrono::NaiveDateTime;
use plotters::style::RGBColor;
use report_core::error::Result;
use report_core::models::{Metric, TimeSeries};
use report_core::settings::ReportConfig;
use report_data::aggregator::daily_average;
use report_data::analysis::ReportData;
use tracing::debug;

use crate::palette::Palette;

/// Font size of the cover page, in points.
pub const COVER_FONT_SIZE: f64 = 24.0;
/// Font size of the overview and monthly section title pages.
pub const SECTION_FONT_SIZE: f64 = 18.0;
/// Font size of the per-month title pages.
pub const MONTH_FONT_SIZE: f64 = 16.0;
/// Font size of a chart page's suptitle.
pub const SUPTITLE_FONT_SIZE: f64 = 16.0;

// ── Model ─────────────────────────────────────────────────────────────────────

/// One sheet of the report.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Title(TitlePage),
    Chart(ChartPage),
}

/// A page showing a single centred line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TitlePage {
    pub text: String,
    /// Size in points.
    pub font_size: f64,
}

/// A page of vertically stacked time-series subplots sharing one x-axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPage {
    pub title: String,
    pub x_label: Option<String>,
    pub subplots: Vec<Subplot>,
}

impl ChartPage {
    /// Earliest and latest timestamp over every line on the page.
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut times = self.subplots.iter().flat_map(|s| {
            let average = s.average.iter().flat_map(|a| a.points.iter());
            s.points.iter().chain(average).map(|(t, _)| *t)
        });
        let first = times.next()?;
        Some(times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

/// One metric's raw line plus its optional daily-average overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Subplot {
    pub metric: Metric,
    pub label: String,
    pub color: RGBColor,
    pub points: Vec<(NaiveDateTime, f64)>,
    pub average: Option<AverageLine>,
}

impl Subplot {
    /// Smallest and largest finite value over the raw line and the overlay.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let average = self.average.iter().flat_map(|a| a.points.iter());
        self.points
            .iter()
            .chain(average)
            .map(|(_, v)| *v)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }
}

/// Dashed line of per-date means, anchored at midnight.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageLine {
    pub label: String,
    pub color: RGBColor,
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// Ordered pages of one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDocument {
    pages: Vec<Page>,
}

impl ReportDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn chart_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| matches!(p, Page::Chart(_)))
            .count()
    }
}

/// Number of pages a report over `months` months will have.
pub fn expected_page_count(months: usize, has_data: bool) -> usize {
    3 + usize::from(has_data) + 2 * months
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Lays out the report pages from analysed data.
#[derive(Debug, Clone)]
pub struct ReportBuilder<'a> {
    config: &'a ReportConfig,
    palette: Palette,
}

impl<'a> ReportBuilder<'a> {
    /// Fails when a configured colour cannot be resolved.
    pub fn new(config: &'a ReportConfig) -> Result<Self> {
        let palette = Palette::from_styles(&config.metrics)?;
        Ok(Self { config, palette })
    }

    pub fn build(&self, data: &ReportData) -> ReportDocument {
        let mut doc = ReportDocument::new();

        doc.push(title(&self.config.title, COVER_FONT_SIZE));
        doc.push(title(&self.config.overview_title, SECTION_FONT_SIZE));
        if !data.series.is_empty() {
            doc.push(Page::Chart(
                self.chart_page(self.config.chart_title.clone(), &data.series),
            ));
        }

        doc.push(title(&self.config.monthly_title, SECTION_FONT_SIZE));
        for month in &data.months {
            debug!("Laying out month {} ({} rows)", month.key, month.series.len());
            doc.push(title(&month.key.to_string(), MONTH_FONT_SIZE));
            doc.push(Page::Chart(self.chart_page(
                format!("{} {}", self.config.chart_title, month.key),
                &month.series,
            )));
        }

        doc
    }

    fn chart_page(&self, title: String, series: &TimeSeries) -> ChartPage {
        let subplots = Metric::ALL
            .iter()
            .map(|&metric| self.subplot(metric, series))
            .collect();
        ChartPage {
            title,
            x_label: self.config.x_label.clone(),
            subplots,
        }
    }

    fn subplot(&self, metric: Metric, series: &TimeSeries) -> Subplot {
        let style = self.config.metrics.get(metric);
        let average = self.palette.average(metric).map(|color| AverageLine {
            label: format!("{} {}", self.config.average_label, style.label),
            color,
            points: daily_average(series.rows(), metric).points(),
        });
        Subplot {
            metric,
            label: style.label.clone(),
            color: self.palette.line(metric),
            points: series.points(metric),
            average,
        }
    }
}

fn title(text: &str, font_size: f64) -> Page {
    Page::Title(TitlePage {
        text: text.to_string(),
        font_size,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::models::MeasurementRow;
    use report_data::analysis::analyze_tables;

    fn row(ts: &str, power: f64) -> MeasurementRow {
        MeasurementRow {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            power,
            energy_today: power / 2.0,
            energy_total: 1000.0 + power,
        }
    }

    fn two_month_data() -> ReportData {
        analyze_tables(vec![
            TimeSeries::from_rows(vec![
                row("2024-09-01 10:00:00", 100.0),
                row("2024-09-01 11:00:00", 110.0),
                row("2024-09-01 12:00:00", 120.0),
            ]),
            TimeSeries::from_rows(vec![row("2024-10-01 12:00:00", 90.0)]),
        ])
    }

    fn titles(doc: &ReportDocument) -> Vec<String> {
        doc.pages()
            .iter()
            .map(|p| match p {
                Page::Title(t) => t.text.clone(),
                Page::Chart(c) => format!("[{}]", c.title),
            })
            .collect()
    }

    #[test]
    fn test_build_page_order() {
        let config = ReportConfig::default();
        let doc = ReportBuilder::new(&config).unwrap().build(&two_month_data());

        assert_eq!(doc.page_count(), 8);
        assert_eq!(doc.page_count(), expected_page_count(2, true));
        assert_eq!(doc.chart_count(), 3);
        assert_eq!(
            titles(&doc),
            vec![
                "PV-Inverter",
                "Yearly Overview",
                "[PV-Inverter]",
                "Monthly Reports",
                "2024-09",
                "[PV-Inverter 2024-09]",
                "2024-10",
                "[PV-Inverter 2024-10]",
            ]
        );
    }

    #[test]
    fn test_build_font_sizes() {
        let config = ReportConfig::default();
        let doc = ReportBuilder::new(&config).unwrap().build(&two_month_data());
        let sizes: Vec<f64> = doc
            .pages()
            .iter()
            .filter_map(|p| match p {
                Page::Title(t) => Some(t.font_size),
                Page::Chart(_) => None,
            })
            .collect();
        assert_eq!(sizes, vec![24.0, 18.0, 18.0, 16.0, 16.0]);
    }

    #[test]
    fn test_build_empty_data_has_title_pages_only() {
        let config = ReportConfig::default();
        let doc = ReportBuilder::new(&config)
            .unwrap()
            .build(&ReportData::default());
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.chart_count(), 0);
        assert_eq!(expected_page_count(0, false), 3);
    }

    #[test]
    fn test_chart_page_has_three_subplots_in_order() {
        let config = ReportConfig::default();
        let doc = ReportBuilder::new(&config).unwrap().build(&two_month_data());
        let Page::Chart(overview) = &doc.pages()[2] else {
            panic!("expected the overview chart");
        };
        let metrics: Vec<Metric> = overview.subplots.iter().map(|s| s.metric).collect();
        assert_eq!(metrics, Metric::ALL.to_vec());
        assert_eq!(overview.subplots[0].label, "Power [W]");
        assert_eq!(overview.subplots[0].color, RGBColor(255, 0, 0));
        assert_eq!(overview.subplots[0].points.len(), 4);
        assert!(overview.subplots.iter().all(|s| s.average.is_none()));
    }

    #[test]
    fn test_average_overlay_only_when_coloured() {
        let mut config = ReportConfig::default();
        config.metrics.power.average_color = Some("b".to_string());
        let doc = ReportBuilder::new(&config).unwrap().build(&two_month_data());

        let Page::Chart(september) = &doc.pages()[5] else {
            panic!("expected the September chart");
        };
        let power = &september.subplots[0];
        let avg = power.average.as_ref().unwrap();
        assert_eq!(avg.label, "Daily average Power [W]");
        assert_eq!(avg.color, RGBColor(0, 0, 255));
        assert_eq!(avg.points.len(), 1);
        assert!((avg.points[0].1 - 110.0).abs() < 1e-9);
        assert!(september.subplots[1].average.is_none());

        let Page::Chart(october) = &doc.pages()[7] else {
            panic!("expected the October chart");
        };
        assert_eq!(october.subplots[0].average.as_ref().unwrap().points[0].1, 90.0);
    }

    #[test]
    fn test_time_range_includes_midnight_average() {
        let mut config = ReportConfig::default();
        config.metrics.power.average_color = Some("k".to_string());
        let doc = ReportBuilder::new(&config).unwrap().build(&two_month_data());
        let Page::Chart(september) = &doc.pages()[5] else {
            panic!("expected the September chart");
        };
        let (start, end) = september.time_range().unwrap();
        assert_eq!(start.to_string(), "2024-09-01 00:00:00");
        assert_eq!(end.to_string(), "2024-09-01 12:00:00");
        assert_eq!(september.subplots[0].value_range(), Some((100.0, 120.0)));
    }

    #[test]
    fn test_builder_rejects_unknown_colour() {
        let mut config = ReportConfig::default();
        config.metrics.energy_today.color = "not-a-colour".to_string();
        assert!(ReportBuilder::new(&config).is_err());
    }
}
