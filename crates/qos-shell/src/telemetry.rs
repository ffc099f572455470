//! Simulated telemetry.
//!
//! Every number the shell displays comes from a [`TelemetrySource`].
//! [`RandomTelemetrySource`] draws uniformly from each metric's documented
//! closed domain; sampling cannot fail.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every metric the shell can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Temperature,
    WeatherCondition,
    Pressure,
    Humidity,
    CpuLoad,
    MemoryLoad,
    QubitCoherence,
    NetworkQuality,
    NetworkLatency,
    Bandwidth,
    FinancialIndex,
    MarketTrend,
    MarketForecast,
    HeartRate,
    SleepScore,
    StepCount,
    NewsHeadline,
    Battery,
    SignalBars,
}

/// The closed set of values a metric can take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    /// Uniform over `[min, max]`, rounded to `decimals` places.
    Range { min: f64, max: f64, decimals: u8 },
    /// Uniform over a fixed list of labels.
    Choice(&'static [&'static str]),
}

impl Domain {
    /// Whether `reading` is a member of this domain.
    #[must_use]
    pub fn contains(&self, reading: &Reading) -> bool {
        match (self, reading) {
            (Self::Range { min, max, .. }, Reading::Number { value, .. }) => {
                (*min..=*max).contains(value)
            }
            (Self::Choice(labels), Reading::Label(label)) => labels.contains(label),
            _ => false,
        }
    }
}

const WEATHER_CONDITIONS: &[&str] = &[
    "Quantum Sunny",
    "Particle Rain",
    "Entangled Clouds",
    "Superposition Fog",
    "Photon Storm",
];

const MARKET_TRENDS: &[&str] = &["▲ Bullish", "▼ Bearish", "◆ Stable"];

const MARKET_FORECASTS: &[&str] = &[
    "Quantum Growth",
    "Entangled Volatility",
    "Superposed Stability",
];

const HEADLINES: &[&str] = &[
    "Qubit yields hit record coherence",
    "Entanglement link spans two continents",
    "Photon chip ships to early adopters",
    "Error correction passes the threshold",
    "Quantum cloud opens public beta",
];

impl MetricKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::Temperature,
        Self::WeatherCondition,
        Self::Pressure,
        Self::Humidity,
        Self::CpuLoad,
        Self::MemoryLoad,
        Self::QubitCoherence,
        Self::NetworkQuality,
        Self::NetworkLatency,
        Self::Bandwidth,
        Self::FinancialIndex,
        Self::MarketTrend,
        Self::MarketForecast,
        Self::HeartRate,
        Self::SleepScore,
        Self::StepCount,
        Self::NewsHeadline,
        Self::Battery,
        Self::SignalBars,
    ];

    #[must_use]
    pub const fn domain(self) -> Domain {
        const fn int(min: f64, max: f64) -> Domain {
            Domain::Range {
                min,
                max,
                decimals: 0,
            }
        }
        match self {
            Self::Temperature => int(18.0, 32.0),
            Self::WeatherCondition => Domain::Choice(WEATHER_CONDITIONS),
            Self::Pressure => int(990.0, 1030.0),
            Self::Humidity => int(30.0, 80.0),
            Self::CpuLoad => int(5.0, 95.0),
            Self::MemoryLoad => int(20.0, 90.0),
            Self::QubitCoherence => Domain::Range {
                min: 85.0,
                max: 99.9,
                decimals: 1,
            },
            Self::NetworkQuality => int(60.0, 100.0),
            Self::NetworkLatency => int(1.0, 50.0),
            Self::Bandwidth => int(100.0, 1000.0),
            Self::FinancialIndex => Domain::Range {
                min: 1450.0,
                max: 1650.0,
                decimals: 2,
            },
            Self::MarketTrend => Domain::Choice(MARKET_TRENDS),
            Self::MarketForecast => Domain::Choice(MARKET_FORECASTS),
            Self::HeartRate => int(60.0, 100.0),
            Self::SleepScore => int(70.0, 100.0),
            Self::StepCount => int(2000.0, 15000.0),
            Self::NewsHeadline => Domain::Choice(HEADLINES),
            Self::Battery => int(20.0, 100.0),
            Self::SignalBars => int(1.0, 5.0),
        }
    }

    /// Display unit, empty for labels.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Pressure => "hPa",
            Self::Humidity
            | Self::CpuLoad
            | Self::MemoryLoad
            | Self::QubitCoherence
            | Self::NetworkQuality
            | Self::Battery => "%",
            Self::NetworkLatency => "ms",
            Self::Bandwidth => "Mbps",
            Self::FinancialIndex => "pts",
            Self::HeartRate => "bpm",
            Self::SleepScore => "/100",
            Self::StepCount => "steps",
            Self::SignalBars => "bars",
            Self::WeatherCondition
            | Self::MarketTrend
            | Self::MarketForecast
            | Self::NewsHeadline => "",
        }
    }
}

/// One sampled value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// A number already rounded to its display precision.
    Number { value: f64, decimals: u8 },
    /// A label drawn from a choice list.
    Label(&'static str),
}

impl Reading {
    /// The numeric value, if this is a number.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Number { value, .. } => Some(*value),
            Self::Label(_) => None,
        }
    }

    /// The label, if this is a choice.
    #[must_use]
    pub const fn label(&self) -> Option<&'static str> {
        match self {
            Self::Label(label) => Some(label),
            Self::Number { .. } => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number { value, decimals } => {
                write!(f, "{value:.prec$}", prec = usize::from(*decimals))
            }
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Produces a value for any metric on demand.
pub trait TelemetrySource {
    /// Sample `kind`. The result always lies in `kind.domain()`.
    fn sample(&mut self, kind: MetricKind) -> Reading;
}

/// Uniform pseudo-random telemetry backed by a seedable RNG.
#[derive(Debug, Clone)]
pub struct RandomTelemetrySource {
    rng: StdRng,
}

impl RandomTelemetrySource {
    /// Non-reproducible source seeded from the OS.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible source: equal seeds yield equal sequences.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl TelemetrySource for RandomTelemetrySource {
    fn sample(&mut self, kind: MetricKind) -> Reading {
        match kind.domain() {
            Domain::Range { min, max, decimals } => {
                let value = if decimals == 0 {
                    self.rng.gen_range(min as i64..=max as i64) as f64
                } else {
                    let scale = 10f64.powi(i32::from(decimals));
                    let raw: f64 = self.rng.gen_range(min..=max);
                    ((raw * scale).round() / scale).clamp(min, max)
                };
                Reading::Number { value, decimals }
            }
            Domain::Choice(labels) => Reading::Label(labels[self.rng.gen_range(0..labels.len())]),
        }
    }
}
