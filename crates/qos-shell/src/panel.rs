//! Home screen widget panels.
//!
//! A single [`WidgetPanel`] type covers every widget; what it shows is
//! decided by the field-set descriptor of its [`PanelKind`].

use crate::telemetry::{MetricKind, Reading, TelemetrySource};
use qos_core::{Canvas, Color, Point, Rect, TextStyle};
use serde::{Deserialize, Serialize};

/// One labelled metric a panel displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub kind: MetricKind,
}

const fn field(label: &'static str, kind: MetricKind) -> FieldSpec {
    FieldSpec { label, kind }
}

/// Widget variants and their field sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Weather,
    Health,
    Finance,
    News,
    System,
    Network,
}

impl PanelKind {
    pub const ALL: [Self; 6] = [
        Self::Weather,
        Self::Health,
        Self::Finance,
        Self::News,
        Self::System,
        Self::Network,
    ];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Weather => "Quantum Weather",
            Self::Health => "Bio Monitor",
            Self::Finance => "Quantum Markets",
            Self::News => "Entangled News",
            Self::System => "System Core",
            Self::Network => "Q-Net",
        }
    }

    /// The declarative field set, in sampling order.
    #[must_use]
    pub const fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Weather => WEATHER_FIELDS,
            Self::Health => HEALTH_FIELDS,
            Self::Finance => FINANCE_FIELDS,
            Self::News => NEWS_FIELDS,
            Self::System => SYSTEM_FIELDS,
            Self::Network => NETWORK_FIELDS,
        }
    }
}

const WEATHER_FIELDS: &[FieldSpec] = &[
    field("Temp", MetricKind::Temperature),
    field("Sky", MetricKind::WeatherCondition),
    field("Pressure", MetricKind::Pressure),
    field("Humidity", MetricKind::Humidity),
];

const HEALTH_FIELDS: &[FieldSpec] = &[
    field("Heart", MetricKind::HeartRate),
    field("Sleep", MetricKind::SleepScore),
    field("Steps", MetricKind::StepCount),
];

const FINANCE_FIELDS: &[FieldSpec] = &[
    field("Index", MetricKind::FinancialIndex),
    field("Trend", MetricKind::MarketTrend),
    field("Outlook", MetricKind::MarketForecast),
];

const NEWS_FIELDS: &[FieldSpec] = &[field("Top", MetricKind::NewsHeadline)];

const SYSTEM_FIELDS: &[FieldSpec] = &[
    field("CPU", MetricKind::CpuLoad),
    field("Memory", MetricKind::MemoryLoad),
    field("Qubits", MetricKind::QubitCoherence),
];

const NETWORK_FIELDS: &[FieldSpec] = &[
    field("Quality", MetricKind::NetworkQuality),
    field("Latency", MetricKind::NetworkLatency),
    field("Bandwidth", MetricKind::Bandwidth),
];

/// A displayed field: its label plus the latest reading, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub spec: FieldSpec,
    pub reading: Option<Reading>,
}

impl FieldValue {
    /// `"Label: value unit"`, or a placeholder before the first refresh.
    #[must_use]
    pub fn line(&self) -> String {
        let unit = self.spec.kind.unit();
        match &self.reading {
            None => format!("{}: --", self.spec.label),
            Some(reading) if unit.is_empty() => format!("{}: {reading}", self.spec.label),
            Some(reading) => format!("{}: {reading} {unit}", self.spec.label),
        }
    }
}

/// The live values of one panel. Replaced as a whole on refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    fields: Vec<FieldValue>,
    generation: u64,
}

impl MetricSnapshot {
    fn placeholder(kind: PanelKind) -> Self {
        Self {
            fields: kind
                .fields()
                .iter()
                .map(|&spec| FieldValue {
                    spec,
                    reading: None,
                })
                .collect(),
            generation: 0,
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Number of refreshes that produced this snapshot.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Reading of the first field sampling `kind`.
    #[must_use]
    pub fn reading(&self, kind: MetricKind) -> Option<Reading> {
        self.fields
            .iter()
            .find(|f| f.spec.kind == kind)
            .and_then(|f| f.reading)
    }
}

/// A self-contained home screen widget.
#[derive(Debug, Clone)]
pub struct WidgetPanel {
    kind: PanelKind,
    snapshot: MetricSnapshot,
}

impl WidgetPanel {
    #[must_use]
    pub fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            snapshot: MetricSnapshot::placeholder(kind),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PanelKind {
        self.kind
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.kind.title()
    }

    #[must_use]
    pub const fn snapshot(&self) -> &MetricSnapshot {
        &self.snapshot
    }

    /// Pull fresh values for every field and swap in the new snapshot.
    ///
    /// The replacement is built completely before it is installed, so a
    /// painter never sees fields from two different refreshes.
    pub fn refresh(&mut self, source: &mut dyn TelemetrySource) {
        let fields = self
            .kind
            .fields()
            .iter()
            .map(|&spec| FieldValue {
                spec,
                reading: Some(source.sample(spec.kind)),
            })
            .collect();
        self.snapshot = MetricSnapshot {
            fields,
            generation: self.snapshot.generation + 1,
        };
    }

    /// Rows needed to paint this panel: border, title and one row per field.
    #[must_use]
    pub fn preferred_height(&self) -> f32 {
        (self.kind.fields().len() + 2) as f32
    }

    /// Paint a bordered box with the title on the top edge.
    pub fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect, accent: Color) {
        if bounds.width < 4.0 || bounds.height < 2.0 {
            return;
        }
        canvas.stroke_rect(bounds, Color::SLATE, 1.0);
        canvas.push_clip(bounds.inset(1.0));
        for (row, value) in self.snapshot.fields.iter().enumerate() {
            let y = bounds.y + 1.0 + row as f32;
            if y >= bounds.bottom() - 1.0 {
                break;
            }
            canvas.draw_text(
                &value.line(),
                Point::new(bounds.x + 2.0, y),
                &TextStyle::new(Color::WHITE),
            );
        }
        canvas.pop_clip();
        canvas.draw_text(
            &format!(" {} ", self.title()),
            Point::new(bounds.x + 2.0, bounds.y),
            &TextStyle::new(accent).bold(),
        );
    }
}
