//! Keyword assistant.
//!
//! An ordered rule table: the first rule whose keywords appear in the
//! input answers, no matter where in the input the keyword sits.

use crate::telemetry::{MetricKind, TelemetrySource};
use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Everything a generated response may look at.
pub struct Context<'a> {
    pub telemetry: &'a mut dyn TelemetrySource,
    pub now: DateTime<Local>,
    pub rng: &'a mut StdRng,
}

/// How a rule answers.
#[derive(Clone, Copy)]
pub enum Response {
    Fixed(&'static str),
    Generated(fn(&mut Context<'_>) -> String),
}

/// One entry of the rule table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    /// Single words match whole words; phrases match as substrings.
    pub keywords: &'static [&'static str],
    pub response: Response,
}

impl Rule {
    fn matches(&self, normalized: &str, words: &[&str]) -> bool {
        self.keywords.iter().any(|kw| {
            if kw.contains(' ') {
                normalized.contains(kw)
            } else {
                words.contains(kw)
            }
        })
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}

const JOKES: &[&str] = &[
    "Why did the qubit break up? It needed space to be itself and not itself.",
    "I'd tell you a quantum joke, but it's both funny and not until you laugh.",
    "Schrödinger's cat walks into a bar. And doesn't.",
];

const FALLBACK: &str =
    "Interesting. My quantum cores are still entangling that one. Try asking about weather, markets or the time.";

/// Rules in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "greeting",
        keywords: &["hello", "hi", "hey", "greetings"],
        response: Response::Fixed("Hello! I'm your quantum assistant. How can I help?"),
    },
    Rule {
        name: "help",
        keywords: &["help", "what can you do", "commands"],
        response: Response::Fixed(
            "Ask me about the time, weather, system status, markets, health, news or quantum physics. I also know jokes.",
        ),
    },
    Rule {
        name: "time",
        keywords: &["time", "date", "clock", "today"],
        response: Response::Generated(|ctx| {
            format!("It is {} on {}.", ctx.now.format("%H:%M"), ctx.now.format("%A, %d %B %Y"))
        }),
    },
    Rule {
        name: "weather",
        keywords: &["weather", "temperature", "rain", "sunny", "forecast"],
        response: Response::Generated(|ctx| {
            let temp = ctx.telemetry.sample(MetricKind::Temperature);
            let sky = ctx.telemetry.sample(MetricKind::WeatherCondition);
            format!("Currently {temp} °C with {sky}.")
        }),
    },
    Rule {
        name: "system",
        keywords: &["system", "cpu", "memory", "status", "performance"],
        response: Response::Generated(|ctx| {
            let cpu = ctx.telemetry.sample(MetricKind::CpuLoad);
            let mem = ctx.telemetry.sample(MetricKind::MemoryLoad);
            let qubits = ctx.telemetry.sample(MetricKind::QubitCoherence);
            format!("CPU at {cpu}%, memory at {mem}%, qubit coherence {qubits}%.")
        }),
    },
    Rule {
        name: "finance",
        keywords: &["finance", "market", "markets", "stock", "stocks", "money", "index"],
        response: Response::Generated(|ctx| {
            let index = ctx.telemetry.sample(MetricKind::FinancialIndex);
            let trend = ctx.telemetry.sample(MetricKind::MarketTrend);
            format!("The quantum index stands at {index} pts, trend {trend}.")
        }),
    },
    Rule {
        name: "health",
        keywords: &["health", "heart", "sleep", "steps", "fitness"],
        response: Response::Generated(|ctx| {
            let heart = ctx.telemetry.sample(MetricKind::HeartRate);
            let steps = ctx.telemetry.sample(MetricKind::StepCount);
            format!("Heart rate {heart} bpm, {steps} steps so far today.")
        }),
    },
    Rule {
        name: "news",
        keywords: &["news", "headline", "headlines"],
        response: Response::Generated(|ctx| {
            let headline = ctx.telemetry.sample(MetricKind::NewsHeadline);
            format!("Top story: {headline}.")
        }),
    },
    Rule {
        name: "quantum",
        keywords: &["quantum", "qubit", "qubits", "entanglement", "superposition"],
        response: Response::Fixed(
            "Qubits hold superpositions of 0 and 1; entangled qubits share a single state no matter the distance.",
        ),
    },
    Rule {
        name: "joke",
        keywords: &["joke", "funny", "laugh"],
        response: Response::Generated(|ctx| JOKES[ctx.rng.gen_range(0..JOKES.len())].to_string()),
    },
];

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub speaker: Speaker,
    pub text: String,
}

/// The answer to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Name of the rule that answered, `"fallback"` if none did.
    pub rule: &'static str,
    pub text: String,
}

/// Rule-table assistant with a bounded transcript.
#[derive(Debug)]
pub struct Assistant {
    rules: &'static [Rule],
    rng: StdRng,
    transcript: VecDeque<ChatLine>,
    history: usize,
}

impl Assistant {
    /// Assistant over [`RULES`], keeping the last `history` lines.
    #[must_use]
    pub fn new(seed: u64, history: usize) -> Self {
        Self {
            rules: RULES,
            rng: StdRng::seed_from_u64(seed),
            transcript: VecDeque::with_capacity(history),
            history: history.max(2),
        }
    }

    /// Match `input` against the rules. Empty input gets no reply.
    pub fn ask(
        &mut self,
        input: &str,
        telemetry: &mut dyn TelemetrySource,
        now: DateTime<Local>,
    ) -> Option<Reply> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = trimmed.to_lowercase();
        let words: Vec<&str> = normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let reply = match self.rules.iter().find(|r| r.matches(&normalized, &words)) {
            Some(rule) => {
                let text = match rule.response {
                    Response::Fixed(text) => text.to_string(),
                    Response::Generated(generate) => generate(&mut Context {
                        telemetry,
                        now,
                        rng: &mut self.rng,
                    }),
                };
                Reply {
                    rule: rule.name,
                    text,
                }
            }
            None => Reply {
                rule: "fallback",
                text: FALLBACK.to_string(),
            },
        };

        self.record(Speaker::User, trimmed.to_string());
        self.record(Speaker::Assistant, reply.text.clone());
        Some(reply)
    }

    fn record(&mut self, speaker: Speaker, text: String) {
        if self.transcript.len() == self.history {
            self.transcript.pop_front();
        }
        self.transcript.push_back(ChatLine { speaker, text });
    }

    pub fn transcript(&self) -> impl DoubleEndedIterator<Item = &ChatLine> + ExactSizeIterator {
        self.transcript.iter()
    }
}
