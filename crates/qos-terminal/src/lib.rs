//! Terminal frontend for the Quantum OS shell.
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::cast_lossless)]
//!
//! [`qos_shell::Shell`] paints through [`qos_core::Canvas`]; this crate
//! supplies the canvas that lands in the terminal, using `crossterm`
//! directly:
//!
//! - [`direct::DirectTerminalCanvas`] rasterises draw calls into a
//!   [`direct::CellBuffer`]
//! - [`direct::DiffRenderer`] writes only the cells that changed
//! - [`TerminalApp`] is the foreground loop that owns the shell
//!
//! ```
//! use qos_shell::{Shell, ShellConfig};
//!
//! let shell = Shell::new(ShellConfig { seed: Some(3), ..ShellConfig::desktop() }).unwrap();
//! let frame = qos_terminal::render_once(&shell, 100, 30);
//! assert!(frame.contains("Quantum OS"));
//! ```

mod app;
mod color;
pub mod direct;
mod error;
mod input;

pub use app::{render_once, TerminalApp};
pub use color::ColorMode;
pub use error::TuiError;
pub use input::translate;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `QOS_LOG=qos_shell=debug`.
pub const LOG_ENV: &str = "QOS_LOG";

/// Install the global tracing subscriber.
///
/// Logs go to `log_file` when given, otherwise to stderr when `to_stderr`
/// is set. With neither, nothing is installed: the terminal belongs to
/// the UI. The filter comes from [`LOG_ENV`] and defaults to `info`.
pub fn init_tracing(log_file: Option<&Path>, to_stderr: bool) -> Result<(), TuiError> {
    let filter = || EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None if to_stderr => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .try_init(),
        None => return Ok(()),
    };

    result.map_err(|e| TuiError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_without_target_is_noop() {
        assert!(init_tracing(None, false).is_ok());
        assert!(init_tracing(None, false).is_ok());
    }

    #[test]
    fn test_init_tracing_second_install_is_err() {
        let _ = init_tracing(None, true);
        let result = init_tracing(None, true);
        assert!(matches!(result, Err(TuiError::Logging(_))));
    }

    #[test]
    fn test_init_tracing_bad_log_path_is_io_error() {
        let result = init_tracing(Some(Path::new("/nonexistent-dir/qos/log.txt")), false);
        assert!(matches!(result, Err(TuiError::Io(_))));
    }
}
