//! End-to-end widget refresh: background worker → foreground queue → panels.
//!
//! The worker never touches the shell. It only posts `Shell::refresh_widgets`,
//! which the test thread runs, so the finance panel must show exactly the
//! values a replayed telemetry source with the same seed produces.

use qos_shell::{
    spawn_refresh_worker, ForegroundQueue, MetricKind, PanelKind, RandomTelemetrySource, Shell,
    ShellConfig, TelemetrySource,
};
use std::time::{Duration, Instant};

const SEED: u64 = 42;

fn finance_index(shell: &Shell) -> Option<f64> {
    shell
        .panel(PanelKind::Finance)
        .and_then(|p| p.snapshot().reading(MetricKind::FinancialIndex))
        .and_then(|r| r.value())
}

/// Finance index after each of `refreshes` full refreshes of `panels`.
fn replay_finance(panels: &[PanelKind], refreshes: usize) -> Vec<f64> {
    let mut source = RandomTelemetrySource::seeded(SEED);
    let mut values = Vec::new();
    for _ in 0..refreshes {
        for kind in panels {
            for field in kind.fields() {
                let reading = source.sample(field.kind);
                if field.kind == MetricKind::FinancialIndex {
                    values.push(reading.value().unwrap());
                }
            }
        }
    }
    values
}

#[test]
fn test_worker_refreshes_reach_finance_panel() {
    let config = ShellConfig {
        seed: Some(SEED),
        ..ShellConfig::desktop()
    };
    let panels = config.panels.clone();
    let mut shell = Shell::new(config).unwrap();
    assert_eq!(finance_index(&shell), None);

    let queue = ForegroundQueue::<Shell>::bounded(4);
    let worker = spawn_refresh_worker(
        "widget-refresh",
        Duration::from_millis(1),
        queue.poster(),
        Shell::refresh_widgets,
    )
    .unwrap();

    let mut observed = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(10);
    while observed.len() < 3 && Instant::now() < deadline {
        if queue.run_next_timeout(&mut shell, Duration::from_millis(50)) {
            observed.push(finance_index(&shell).unwrap());
        }
    }

    drop(queue);
    worker.join().unwrap();

    assert_eq!(observed.len(), 3, "worker did not post three refreshes");
    assert_eq!(observed, replay_finance(&panels, 3));
    for value in &observed {
        assert!((1450.0..=1650.0).contains(value), "index {value} out of range");
    }
    assert_ne!(observed[0], observed[1]);
    assert_ne!(observed[1], observed[2]);
    assert_eq!(shell.refresh_count(), 3);
}

#[test]
fn test_worker_exits_when_queue_dropped() {
    let queue = ForegroundQueue::<Shell>::bounded(1);
    let worker = spawn_refresh_worker(
        "widget-refresh",
        Duration::from_millis(1),
        queue.poster(),
        Shell::refresh_widgets,
    )
    .unwrap();
    drop(queue);
    worker.join().unwrap();
}

#[test]
fn test_full_queue_drops_refreshes_without_blocking() {
    let queue = ForegroundQueue::<Shell>::bounded(2);
    let poster = queue.poster();
    let mut accepted = 0;
    for _ in 0..10 {
        if poster.post(Shell::refresh_widgets).is_ok() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 2);

    let mut shell = Shell::new(ShellConfig {
        seed: Some(SEED),
        ..ShellConfig::mobile()
    })
    .unwrap();
    assert_eq!(queue.drain(&mut shell), 2);
    assert_eq!(shell.refresh_count(), 2);
}
