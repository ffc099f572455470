//! Status bar: wall clock plus a few system metrics, refreshed by the
//! foreground clock tick.

use crate::telemetry::{MetricKind, Reading, TelemetrySource};
use chrono::{DateTime, Local};
use qos_core::{Canvas, Color, Point, Rect, TextStyle};

/// Metrics sampled on every clock tick, in display order.
pub const STATUS_METRICS: [MetricKind; 4] = [
    MetricKind::CpuLoad,
    MetricKind::MemoryLoad,
    MetricKind::Battery,
    MetricKind::SignalBars,
];

#[derive(Debug, Clone, Default)]
pub struct StatusBar {
    clock: String,
    date: String,
    metrics: Vec<(MetricKind, Reading)>,
    ticks: u64,
}

impl StatusBar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the clock text and re-sample the status metrics.
    pub fn tick(&mut self, now: DateTime<Local>, source: &mut dyn TelemetrySource) {
        self.clock = now.format("%H:%M:%S").to_string();
        self.date = now.format("%a %d %b").to_string();
        self.metrics = STATUS_METRICS
            .iter()
            .map(|&kind| (kind, source.sample(kind)))
            .collect();
        self.ticks += 1;
    }

    #[must_use]
    pub fn clock(&self) -> &str {
        &self.clock
    }

    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    #[must_use]
    pub fn reading(&self, kind: MetricKind) -> Option<Reading> {
        self.metrics
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, r)| *r)
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// `CPU 42% · MEM 61% · BAT 88% · SIG 4 bars`
    #[must_use]
    pub fn metrics_line(&self) -> String {
        self.metrics
            .iter()
            .map(|(kind, reading)| {
                let tag = match kind {
                    MetricKind::CpuLoad => "CPU",
                    MetricKind::MemoryLoad => "MEM",
                    MetricKind::Battery => "BAT",
                    MetricKind::SignalBars => "SIG",
                    _ => "?",
                };
                match kind.unit() {
                    "%" => format!("{tag} {reading}%"),
                    unit => format!("{tag} {reading} {unit}"),
                }
            })
            .collect::<Vec<_>>()
            .join(" · ")
    }

    /// One row: title on the left, metrics in the middle, clock on the right.
    pub fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect, title: &str, accent: Color) {
        canvas.fill_rect(bounds, Color::SLATE);
        canvas.draw_text(
            title,
            Point::new(bounds.x + 1.0, bounds.y),
            &TextStyle::new(accent).bold(),
        );
        let metrics = self.metrics_line();
        let middle = bounds.x + (bounds.width - metrics.chars().count() as f32) / 2.0;
        canvas.draw_text(
            &metrics,
            Point::new(middle.max(bounds.x + title.chars().count() as f32 + 2.0), bounds.y),
            &TextStyle::new(Color::MUTED),
        );
        let clock = if self.date.is_empty() {
            self.clock.clone()
        } else {
            format!("{} {}", self.date, self.clock)
        };
        let right = bounds.right() - clock.chars().count() as f32 - 1.0;
        canvas.draw_text(
            &clock,
            Point::new(right.max(bounds.x), bounds.y),
            &TextStyle::new(Color::WHITE).bold(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::RandomTelemetrySource;
    use chrono::TimeZone;
    use qos_core::RecordingCanvas;

    fn noon() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 14, 12, 34, 56)
            .single()
            .unwrap()
    }

    #[test]
    fn test_tick_formats_clock() {
        let mut bar = StatusBar::new();
        bar.tick(noon(), &mut RandomTelemetrySource::seeded(1));
        assert_eq!(bar.clock(), "12:34:56");
        assert_eq!(bar.date(), "Thu 14 Mar");
        assert_eq!(bar.ticks(), 1);
    }

    #[test]
    fn test_tick_samples_every_status_metric() {
        let mut bar = StatusBar::new();
        assert!(bar.reading(MetricKind::CpuLoad).is_none());
        bar.tick(noon(), &mut RandomTelemetrySource::seeded(1));
        for kind in STATUS_METRICS {
            let reading = bar.reading(kind).unwrap();
            assert!(kind.domain().contains(&reading));
        }
    }

    #[test]
    fn test_metrics_line_units() {
        let mut bar = StatusBar::new();
        bar.tick(noon(), &mut RandomTelemetrySource::seeded(3));
        let line = bar.metrics_line();
        assert!(line.starts_with("CPU "));
        assert!(line.contains("% · MEM "));
        assert!(line.ends_with(" bars"));
    }

    #[test]
    fn test_paint_includes_title_and_clock() {
        let mut bar = StatusBar::new();
        bar.tick(noon(), &mut RandomTelemetrySource::seeded(3));
        let mut canvas = RecordingCanvas::new();
        bar.paint(&mut canvas, Rect::new(0.0, 0.0, 100.0, 1.0), "Quantum OS", Color::WHITE);
        assert!(canvas.contains_text("Quantum OS"));
        assert!(canvas.contains_text("12:34:56"));
    }
}
