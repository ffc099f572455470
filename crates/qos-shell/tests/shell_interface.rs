//! Behaviour of the shell as seen by a frontend.

use chrono::Local;
use qos_core::{Rect, RecordingCanvas};
use qos_shell::{
    Activity, AppCatalog, Command, ConfigError, Flow, MetricKind, Overlay, PanelKind, Profile,
    RandomTelemetrySource, Reading, RefreshScheduler, Shell, ShellConfig, ShellError, TelemetrySource, TickError,
};

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn test_catalog_seeding_twice_yields_no_duplicates() {
    let mut catalog = AppCatalog::new();
    let first = catalog.seed_default().unwrap();
    let second = catalog.seed_default().unwrap();
    assert!(first > 0);
    assert_eq!(second, 0);
    let mut ids: Vec<_> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), first);
}

// =============================================================================
// Assistant
// =============================================================================

fn rule_for(question: &str) -> &'static str {
    let mut shell = Shell::new(ShellConfig {
        seed: Some(3),
        ..ShellConfig::desktop()
    })
    .unwrap();
    shell.ask(question, Local::now()).unwrap().rule
}

#[test]
fn test_assistant_priority_is_fixed() {
    // every pair below names a later rule first
    assert_eq!(rule_for("joke please, hey"), "greeting");
    assert_eq!(rule_for("weather help"), "help");
    assert_eq!(rule_for("what's the weather today"), "time");
    assert_eq!(rule_for("cpu temperature"), "weather");
    assert_eq!(rule_for("stocks and system status"), "system");
    assert_eq!(rule_for("health of the market"), "finance");
    assert_eq!(rule_for("news about my heart"), "health");
    assert_eq!(rule_for("quantum headlines"), "news");
    assert_eq!(rule_for("a funny qubit"), "quantum");
    assert_eq!(rule_for("laugh"), "joke");
    assert_eq!(rule_for("xyzzy"), "fallback");
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn test_default_yaml_parses_back_to_defaults() {
    let yaml = ShellConfig::default_yaml().unwrap();
    assert_eq!(ShellConfig::from_yaml(&yaml).unwrap(), ShellConfig::default());
}

#[test]
fn test_mobile_yaml_produces_mobile_shell() {
    let config = ShellConfig::from_yaml("profile: mobile\nseed: 5\n").unwrap();
    assert_eq!(config.profile, Profile::Mobile);
    let shell = Shell::new(config).unwrap();
    assert_eq!(shell.panels().len(), 4);
    assert_eq!(shell.surface().particles().len(), 20);
}

#[test]
fn test_invalid_config_surfaces_as_shell_error() {
    let mut config = ShellConfig::desktop();
    config.accent = "#12".to_string();
    let err = Shell::new(config).unwrap_err();
    assert!(matches!(err, ShellError::Config(ConfigError::Invalid(_))));
}

// =============================================================================
// Frontend flow
// =============================================================================

/// Fixed telemetry: every metric at the bottom of its range.
struct FloorSource;

impl TelemetrySource for FloorSource {
    fn sample(&mut self, kind: MetricKind) -> qos_shell::Reading {
        match kind.domain() {
            qos_shell::Domain::Range { min, decimals, .. } => qos_shell::Reading::Number { value: min, decimals },
            qos_shell::Domain::Choice(labels) => qos_shell::Reading::Label(labels[0]),
        }
    }
}

#[test]
fn test_custom_telemetry_source_drives_panels() {
    let mut shell = Shell::with_telemetry(ShellConfig::desktop(), Box::new(FloorSource)).unwrap();
    shell.refresh_widgets();
    let index = shell
        .panel(PanelKind::Finance)
        .and_then(|p| p.snapshot().reading(MetricKind::FinancialIndex))
        .and_then(|r| r.value());
    assert_eq!(index, Some(1450.0));

    let mut canvas = RecordingCanvas::new();
    shell.paint(&mut canvas, Rect::new(0.0, 0.0, 140.0, 40.0));
    assert!(canvas.contains_text("Index: 1450.00 pts"));
}

/// Source whose sensors are offline.
struct BrokenSource;

impl TelemetrySource for BrokenSource {
    fn sample(&mut self, kind: MetricKind) -> Reading {
        panic!("{kind:?} sensor offline")
    }
}

#[test]
fn test_failed_clock_tick_is_counted_and_cadences_keep_firing() {
    let mut shell = Shell::with_telemetry(ShellConfig::desktop(), Box::new(BrokenSource)).unwrap();
    let mut scheduler = RefreshScheduler::new(16, 1000, 5000);
    let now = Local::now();

    let mut failures = Vec::new();
    for now_ms in [0, 1000] {
        let due = scheduler.update(now_ms);
        assert_eq!(due, vec![Activity::Animation, Activity::Clock]);
        for activity in due {
            if let Err(err) = shell.run_activity(activity, now) {
                failures.push(err);
            }
        }
    }

    assert_eq!(shell.tick_failures(), 2);
    assert_eq!(failures.len(), 2);
    for err in &failures {
        assert!(matches!(
            err,
            TickError::Panicked { activity: "clock", message } if message.contains("sensor offline")
        ));
    }
    // the animation runs on its own cadence regardless
    assert!(shell.run_activity(Activity::Animation, now).is_ok());
    assert_eq!(shell.tick_failures(), 2);
}

#[test]
fn test_session_of_commands() {
    let mut shell = Shell::new(ShellConfig {
        seed: Some(11),
        ..ShellConfig::desktop()
    })
    .unwrap();

    shell.apply(Command::OpenApp(2));
    assert!(matches!(shell.overlay(), Overlay::AppDialog { index: 2 }));
    shell.apply(Command::Submit);
    assert_eq!(shell.overlay(), &Overlay::None);

    shell.apply(Command::OpenAssistant);
    for c in "time?".chars() {
        shell.apply(Command::Input(c));
    }
    shell.apply(Command::Submit);
    let reply = shell.assistant().transcript().last().unwrap();
    assert!(reply.text.starts_with("It is "));

    assert_eq!(shell.apply(Command::Dismiss), Flow::Continue);
    assert_eq!(shell.apply(Command::Quit), Flow::Quit);
}

#[test]
fn test_telemetry_source_is_seed_reproducible() {
    let mut a = RandomTelemetrySource::seeded(99);
    let mut b = RandomTelemetrySource::seeded(99);
    for kind in MetricKind::ALL {
        assert_eq!(a.sample(kind), b.sample(kind));
    }
}
