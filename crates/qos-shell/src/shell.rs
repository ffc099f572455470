//! The shell context object.
//!
//! [`Shell`] owns every piece of foreground state: configuration, the
//! telemetry source, widget panels, the animation surface, status bar,
//! app catalog and assistant. Frontends feed it [`Command`]s and ticks and
//! ask it to paint onto a [`Canvas`].

use crate::animation::AnimationSurface;
use crate::assistant::{Assistant, Reply, Speaker};
use crate::catalog::{AppCatalog, AppKind};
use crate::config::ShellConfig;
use crate::error::{ShellError, TickError};
use crate::panel::{PanelKind, WidgetPanel};
use crate::scheduler::{run_isolated, Activity};
use crate::status::StatusBar;
use crate::telemetry::{RandomTelemetrySource, TelemetrySource};
use chrono::{DateTime, Local};
use qos_core::{Canvas, Color, Point, Rect, RecordingCanvas, Size, TextStyle, Transform2D};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

const MAX_INPUT: usize = 200;
const DOCK_SLOTS: usize = 9;

/// Modal layer above the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    /// Description dialog for the dock entry at `index`.
    AppDialog { index: usize },
    /// Chat with the assistant; `input` is the line being typed.
    Assistant { input: String },
}

impl Overlay {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// User intents, already decoded from raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Open the dock entry at this zero-based index.
    OpenApp(usize),
    OpenAssistant,
    Input(char),
    Backspace,
    Submit,
    /// Close the open overlay.
    Dismiss,
    RefreshNow,
    ToggleAnimation,
}

/// Whether the run loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    config: ShellConfig,
    accent: Color,
    telemetry: Box<dyn TelemetrySource>,
    motion_rng: StdRng,
    panels: Vec<WidgetPanel>,
    surface: AnimationSurface,
    /// Last animation frame, in surface coordinates.
    layer: RecordingCanvas,
    status: StatusBar,
    catalog: AppCatalog,
    assistant: Assistant,
    overlay: Overlay,
    animation_paused: bool,
    refresh_count: u64,
    tick_failures: u64,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("profile", &self.config.profile)
            .field("panels", &self.panels.len())
            .field("overlay", &self.overlay)
            .field("refresh_count", &self.refresh_count)
            .field("tick_failures", &self.tick_failures)
            .finish_non_exhaustive()
    }
}

impl Shell {
    /// Shell with random telemetry, seeded from `config.seed` when set.
    pub fn new(config: ShellConfig) -> Result<Self, ShellError> {
        let telemetry = match config.seed {
            Some(seed) => RandomTelemetrySource::seeded(seed),
            None => RandomTelemetrySource::from_entropy(),
        };
        Self::with_telemetry(config, Box::new(telemetry))
    }

    /// Shell reading its metrics from `telemetry`.
    ///
    /// Panels start with placeholders; nothing is sampled until the first
    /// refresh or clock tick.
    pub fn with_telemetry(
        config: ShellConfig,
        telemetry: Box<dyn TelemetrySource>,
    ) -> Result<Self, ShellError> {
        config.validate()?;
        let accent = config.accent_color()?;
        let catalog = AppCatalog::seeded()?;

        let mut motion_rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        let surface = AnimationSurface::new(config.surface.clone(), config.title.clone(), &mut motion_rng);
        let assistant = Assistant::new(motion_rng.gen(), config.chat_history);
        let panels = config.panels.iter().map(|&kind| WidgetPanel::new(kind)).collect();

        info!(
            profile = ?config.profile,
            panels = config.panels.len(),
            particles = config.surface.particle_count,
            apps = catalog.len(),
            "shell initialised"
        );

        Ok(Self {
            config,
            accent,
            telemetry,
            motion_rng,
            panels,
            surface,
            layer: RecordingCanvas::new(),
            status: StatusBar::new(),
            catalog,
            assistant,
            overlay: Overlay::None,
            animation_paused: false,
            refresh_count: 0,
            tick_failures: 0,
        })
    }

    // =========================================================================
    // Ticks
    // =========================================================================

    /// Re-sample every panel, in display order.
    pub fn refresh_widgets(&mut self) {
        for panel in &mut self.panels {
            panel.refresh(self.telemetry.as_mut());
        }
        self.refresh_count += 1;
        debug!(refresh = self.refresh_count, "widgets refreshed");
    }

    pub fn tick_clock(&mut self, now: DateTime<Local>) {
        self.status.tick(now, self.telemetry.as_mut());
    }

    /// Advance the animation one step and record the frame.
    pub fn tick_animation(&mut self) -> Result<(), TickError> {
        if self.animation_paused {
            return Ok(());
        }
        self.layer.clear();
        self.surface.tick(&mut self.motion_rng, &mut self.layer)
    }

    /// Run one due activity with its failures contained.
    pub fn run_activity(&mut self, activity: Activity, now: DateTime<Local>) -> Result<(), TickError> {
        let result = run_isolated(activity.name(), || match activity {
            Activity::Animation => self.tick_animation(),
            Activity::Clock => {
                self.tick_clock(now);
                Ok(())
            }
        });
        if result.is_err() {
            self.tick_failures += 1;
        }
        result
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub fn apply(&mut self, command: Command) -> Flow {
        match command {
            Command::Quit => return Flow::Quit,
            Command::OpenApp(index) => self.open_app(index),
            Command::OpenAssistant => {
                self.overlay = Overlay::Assistant {
                    input: String::new(),
                };
            }
            Command::Input(c) => {
                if let Overlay::Assistant { input } = &mut self.overlay {
                    if input.chars().count() < MAX_INPUT && !c.is_control() {
                        input.push(c);
                    }
                }
            }
            Command::Backspace => {
                if let Overlay::Assistant { input } = &mut self.overlay {
                    input.pop();
                }
            }
            Command::Submit => {
                if let Overlay::Assistant { input } = &mut self.overlay {
                    let question = std::mem::take(input);
                    self.ask(&question, Local::now());
                } else {
                    self.overlay = Overlay::None;
                }
            }
            Command::Dismiss => self.overlay = Overlay::None,
            Command::RefreshNow => self.refresh_widgets(),
            Command::ToggleAnimation => {
                self.animation_paused = !self.animation_paused;
                debug!(paused = self.animation_paused, "animation toggled");
            }
        }
        Flow::Continue
    }

    /// Put a question to the assistant.
    pub fn ask(&mut self, question: &str, now: DateTime<Local>) -> Option<Reply> {
        let reply = self.assistant.ask(question, self.telemetry.as_mut(), now)?;
        debug!(rule = reply.rule, "assistant replied");
        Some(reply)
    }

    fn open_app(&mut self, index: usize) {
        let Some(entry) = self.catalog.at(index) else {
            return;
        };
        info!(app = %entry.id, "opening app");
        self.overlay = match entry.kind {
            AppKind::Assistant => Overlay::Assistant {
                input: String::new(),
            },
            AppKind::Dialog => Overlay::AppDialog { index },
        };
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn config(&self) -> &ShellConfig {
        &self.config
    }

    #[must_use]
    pub fn panels(&self) -> &[WidgetPanel] {
        &self.panels
    }

    /// First panel of `kind`.
    #[must_use]
    pub fn panel(&self, kind: PanelKind) -> Option<&WidgetPanel> {
        self.panels.iter().find(|p| p.kind() == kind)
    }

    #[must_use]
    pub const fn surface(&self) -> &AnimationSurface {
        &self.surface
    }

    #[must_use]
    pub const fn status(&self) -> &StatusBar {
        &self.status
    }

    #[must_use]
    pub const fn catalog(&self) -> &AppCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    #[must_use]
    pub const fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[must_use]
    pub const fn is_animation_paused(&self) -> bool {
        self.animation_paused
    }

    #[must_use]
    pub const fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    #[must_use]
    pub const fn tick_failures(&self) -> u64 {
        self.tick_failures
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Paint the whole screen into `viewport`.
    ///
    /// Rows from the top: status bar, animation, panel grid, dock. The
    /// overlay, if any, is drawn last and centred.
    pub fn paint(&self, canvas: &mut dyn Canvas, viewport: Rect) {
        canvas.fill_rect(viewport, Color::VOID);
        let (status_row, rest) = viewport.split_top(1.0);
        let (body, dock_row) = rest.split_top((rest.height - 1.0).max(0.0));

        self.status.paint(canvas, status_row, &self.config.title, self.accent);

        let columns = self.config.panel_columns.max(1);
        let rows = self.panels.len().div_ceil(columns);
        let row_height = self
            .panels
            .iter()
            .map(WidgetPanel::preferred_height)
            .fold(0.0, f32::max);
        let grid_height = (rows as f32 * row_height).min(body.height * 0.7);
        let (animation, grid) = body.split_top(body.height - grid_height);

        self.paint_animation(canvas, animation);
        self.paint_panels(canvas, grid, columns);
        self.paint_dock(canvas, dock_row);

        match &self.overlay {
            Overlay::None => {}
            Overlay::AppDialog { index } => self.paint_dialog(canvas, viewport, *index),
            Overlay::Assistant { input } => self.paint_chat(canvas, viewport, input),
        }
    }

    fn paint_animation(&self, canvas: &mut dyn Canvas, region: Rect) {
        if region.height < 1.0 {
            return;
        }
        canvas.push_clip(region);
        canvas.push_transform(Transform2D::fit(self.surface.bounds(), region));
        self.layer.replay(canvas);
        canvas.pop_transform();
        canvas.pop_clip();
        if self.animation_paused {
            canvas.draw_text(
                "[paused]",
                Point::new(region.x + 1.0, region.y),
                &TextStyle::new(Color::MUTED),
            );
        }
    }

    fn paint_panels(&self, canvas: &mut dyn Canvas, grid: Rect, columns: usize) {
        if self.panels.is_empty() || grid.height < 2.0 {
            return;
        }
        let rows = self.panels.len().div_ceil(columns);
        let row_height = grid.height / rows as f32;
        for (row, chunk) in self.panels.chunks(columns).enumerate() {
            let row_rect = Rect::new(grid.x, grid.y + row as f32 * row_height, grid.width, row_height);
            for (panel, cell) in chunk.iter().zip(row_rect.columns(columns, 1.0)) {
                panel.paint(canvas, cell, self.accent);
            }
        }
    }

    fn paint_dock(&self, canvas: &mut dyn Canvas, row: Rect) {
        if row.height < 1.0 {
            return;
        }
        canvas.fill_rect(row, Color::SLATE);
        let dock = self
            .catalog
            .entries()
            .iter()
            .take(DOCK_SLOTS)
            .enumerate()
            .map(|(i, app)| format!("[{}] {}", i + 1, app.name))
            .collect::<Vec<_>>()
            .join("  ");
        canvas.draw_text(&dock, Point::new(row.x + 1.0, row.y), &TextStyle::new(Color::WHITE));
    }

    fn paint_dialog(&self, canvas: &mut dyn Canvas, viewport: Rect, index: usize) {
        let Some(app) = self.catalog.at(index) else {
            return;
        };
        let lines = [
            format!("Category: {}", app.category),
            format!("Compatibility: {}%", app.rating),
            String::new(),
            app.description.clone(),
            String::new(),
            "Enter or Esc to close".to_string(),
        ];
        let width = lines
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(app.name.chars().count()))
            .max()
            .unwrap_or(0) as f32
            + 6.0;
        let frame = viewport.centered(Size::new(width, lines.len() as f32 + 2.0));
        self.paint_frame(canvas, frame, &app.name);
        canvas.push_clip(frame.inset(1.0));
        for (row, line) in lines.iter().enumerate() {
            let style = if row + 1 == lines.len() {
                TextStyle::new(Color::MUTED)
            } else {
                TextStyle::new(Color::WHITE)
            };
            canvas.draw_text(line, Point::new(frame.x + 2.0, frame.y + 1.0 + row as f32), &style);
        }
        canvas.pop_clip();
    }

    fn paint_chat(&self, canvas: &mut dyn Canvas, viewport: Rect, input: &str) {
        let height = (self.config.chat_history as f32 + 4.0).min(viewport.height - 2.0);
        let width = 64.0f32.min(viewport.width - 4.0);
        let frame = viewport.centered(Size::new(width, height));
        self.paint_frame(canvas, frame, "Neural Chat");

        let inner = frame.inset(1.0);
        canvas.push_clip(inner);
        let visible = (inner.height - 2.0).max(0.0) as usize;
        let lines = self.assistant.transcript();
        let skip = lines.len().saturating_sub(visible);
        for (row, line) in lines.skip(skip).enumerate() {
            let (prefix, color) = match line.speaker {
                Speaker::User => ("you: ", Color::WHITE),
                Speaker::Assistant => ("q: ", self.accent),
            };
            canvas.draw_text(
                &format!("{prefix}{}", line.text),
                Point::new(inner.x + 1.0, inner.y + row as f32),
                &TextStyle::new(color),
            );
        }
        canvas.draw_text(
            &format!("> {input}_"),
            Point::new(inner.x + 1.0, inner.bottom() - 1.0),
            &TextStyle::new(Color::WHITE).bold(),
        );
        canvas.pop_clip();
    }

    fn paint_frame(&self, canvas: &mut dyn Canvas, frame: Rect, title: &str) {
        canvas.fill_rect(frame, Color::VOID);
        canvas.stroke_rect(frame, self.accent, 1.0);
        canvas.draw_text(
            &format!(" {title} "),
            Point::new(frame.x + 2.0, frame.y),
            &TextStyle::new(self.accent).bold(),
        );
    }
}
