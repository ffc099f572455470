//! The Quantum OS shell: a simulated operating-system home screen.
//!
//! Nothing here touches a real system. Metrics come from a
//! [`TelemetrySource`], the background is an [`AnimationSurface`] of
//! particles and waves, and a [`RefreshScheduler`] drives the periodic
//! work. [`Shell`] ties it together and paints through
//! [`qos_core::Canvas`], so any frontend can host it.
//!
//! ```
//! use qos_core::{Rect, RecordingCanvas};
//! use qos_shell::{Shell, ShellConfig};
//!
//! let config = ShellConfig { seed: Some(1), ..ShellConfig::desktop() };
//! let mut shell = Shell::new(config).unwrap();
//! shell.refresh_widgets();
//! shell.tick_animation().unwrap();
//!
//! let mut canvas = RecordingCanvas::new();
//! shell.paint(&mut canvas, Rect::new(0.0, 0.0, 120.0, 40.0));
//! assert!(canvas.contains_text("Quantum Weather"));
//! ```

mod animation;
mod assistant;
mod catalog;
mod config;
mod error;
mod panel;
mod scheduler;
mod shell;
mod status;
mod telemetry;

pub use animation::{
    AnimationSurface, BoundaryMode, Particle, SurfaceConfig, Wave, MAX_SURFACE_EXTENT, MAX_WAVE_SAMPLES,
};
pub use assistant::{Assistant, ChatLine, Context, Reply, Response, Rule, Speaker, RULES};
pub use catalog::{default_entries, AppCatalog, AppEntry, AppKind};
pub use config::{CadenceConfig, Profile, ShellConfig};
pub use error::{CatalogError, ConfigError, PostError, ShellError, TickError};
pub use panel::{FieldSpec, FieldValue, MetricSnapshot, PanelKind, WidgetPanel};
pub use scheduler::{
    run_isolated, spawn_refresh_worker, Activity, Cadence, ForegroundQueue, Poster, RefreshScheduler, Task,
};
pub use shell::{Command, Flow, Overlay, Shell};
pub use status::{StatusBar, STATUS_METRICS};
pub use telemetry::{Domain, MetricKind, RandomTelemetrySource, Reading, TelemetrySource};
