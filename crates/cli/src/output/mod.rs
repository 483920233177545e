//! Output formatting
//!
//! Human-readable text or strict JSON, chosen by global flags.

mod formatter;

pub use formatter::Formatter;

/// Output settings shared by every command
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Emit JSON instead of text
    pub json: bool,
    /// Disable ANSI colors
    pub no_color: bool,
    /// Suppress everything except errors
    pub quiet: bool,
}
