//! Foreground run loop.
//!
//! One thread owns the [`Shell`]. Each loop iteration drains the post
//! queue, runs the due foreground cadences, handles at most one input
//! event and renders when a frame interval has passed. The widget
//! refresh worker only ever talks to the loop through the queue.

use crate::color::ColorMode;
use crate::direct::{CellBuffer, DiffRenderer, DirectTerminalCanvas};
use crate::error::TuiError;
use crate::input::translate;
use chrono::{DateTime, Local};
use crossterm::event::{self, Event};
use crossterm::terminal;
use qos_core::Rect;
use qos_shell::{Activity, Command, Flow, ForegroundQueue, Poster, RefreshScheduler, Shell, ShellConfig};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Upper bound on one frame, about 60 fps.
const FRAME_MS: u64 = 16;

pub struct TerminalApp {
    shell: Shell,
    queue: ForegroundQueue<Shell>,
    scheduler: RefreshScheduler,
    renderer: DiffRenderer,
    buffer: CellBuffer,
}

impl std::fmt::Debug for TerminalApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalApp")
            .field("shell", &self.shell)
            .field("scheduler", &self.scheduler)
            .field("color_mode", &self.renderer.color_mode())
            .finish_non_exhaustive()
    }
}

impl TerminalApp {
    /// Build the shell and sample the widgets once so the first frame
    /// already shows values.
    pub fn new(config: ShellConfig, color_mode: ColorMode) -> Result<Self, TuiError> {
        let cadence = config.cadence;
        let queue = ForegroundQueue::bounded(config.queue_capacity);
        let mut shell = Shell::new(config)?;
        shell.refresh_widgets();

        Ok(Self {
            shell,
            queue,
            scheduler: RefreshScheduler::new(cadence.animation_ms, cadence.clock_ms, cadence.widget_refresh_ms),
            renderer: DiffRenderer::with_color_mode(color_mode),
            buffer: CellBuffer::new(0, 0),
        })
    }

    #[must_use]
    pub const fn shell(&self) -> &Shell {
        &self.shell
    }

    #[must_use]
    pub const fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    #[must_use]
    pub const fn buffer(&self) -> &CellBuffer {
        &self.buffer
    }

    /// Handle for posting work to this loop from another thread.
    #[must_use]
    pub fn poster(&self) -> Poster<Shell> {
        self.queue.poster()
    }

    /// One loop iteration without I/O: run posted tasks, then every
    /// cadence due at `now_ms`. Returns how many posted tasks ran.
    pub fn step(&mut self, now_ms: u64, now: DateTime<Local>) -> usize {
        let ran = self.queue.drain(&mut self.shell);
        for activity in self.scheduler.update(now_ms) {
            // failures are logged and counted by the shell
            let _ = self.shell.run_activity(activity, now);
        }
        ran
    }

    /// Apply a decoded command, keeping the animation cadence in step
    /// with the shell's pause state.
    pub fn apply(&mut self, command: Command) -> Flow {
        let flow = self.shell.apply(command);
        if command == Command::ToggleAnimation {
            if self.shell.is_animation_paused() {
                self.scheduler.pause(Activity::Animation);
            } else {
                self.scheduler.resume(Activity::Animation);
            }
        }
        flow
    }

    /// Resize the back buffer and make the next frame a full repaint.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.buffer.resize(width, height);
        self.scheduler.force(Activity::Animation);
        self.renderer.reset();
    }

    /// Paint the shell into the back buffer.
    pub fn render_frame(&mut self) {
        let viewport = Rect::new(
            0.0,
            0.0,
            f32::from(self.buffer.width()),
            f32::from(self.buffer.height()),
        );
        let mut canvas = DirectTerminalCanvas::new(&mut self.buffer);
        self.shell.paint(&mut canvas, viewport);
    }

    /// Interactive loop on an already prepared terminal. Returns when the
    /// user quits.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<(), TuiError> {
        let _worker = self
            .scheduler
            .spawn_widget_refresh(self.queue.poster(), Shell::refresh_widgets)?;

        let (width, height) = terminal::size()?;
        self.resize(width, height);

        let started = Instant::now();
        let frame = Duration::from_millis(FRAME_MS);
        let mut last_render: Option<Instant> = None;
        info!(width, height, "entering run loop");

        loop {
            let now_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            self.step(now_ms, Local::now());

            let wait = self.scheduler.time_until_next().unwrap_or(FRAME_MS).clamp(1, FRAME_MS);
            if event::poll(Duration::from_millis(wait))? {
                match event::read()? {
                    Event::Key(key) => {
                        if let Some(command) = translate(key, self.shell.overlay()) {
                            debug!(?command, "key");
                            if self.apply(command) == Flow::Quit {
                                break;
                            }
                        }
                    }
                    Event::Resize(width, height) => {
                        debug!(width, height, "terminal resized");
                        self.resize(width, height);
                    }
                    _ => {}
                }
            }

            if last_render.map_or(true, |t| t.elapsed() >= frame) {
                self.render_frame();
                self.renderer.flush(&mut self.buffer, out)?;
                last_render = Some(Instant::now());
            }
        }

        info!(
            refreshes = self.shell.refresh_count(),
            tick_failures = self.shell.tick_failures(),
            "run loop finished"
        );
        Ok(())
    }
}

/// Paint one frame of `shell` at the given size and return it as plain
/// text, one line per row.
#[must_use]
pub fn render_once(shell: &Shell, width: u16, height: u16) -> String {
    let mut buffer = CellBuffer::new(width, height);
    let mut canvas = DirectTerminalCanvas::new(&mut buffer);
    shell.paint(&mut canvas, Rect::new(0.0, 0.0, f32::from(width), f32::from(height)));
    buffer.to_text()
}
