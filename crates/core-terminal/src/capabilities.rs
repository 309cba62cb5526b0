//! Terminal capability probing.
//!
//! Detection runs once at startup and is environment-based: the renderer
//! consults it when mapping configured colors, degrading `#rrggbb` values
//! to the 256-color cube on terminals that do not advertise truecolor.
//! The struct is non-exhaustive so further capabilities (synchronized
//! output, kitty keyboard protocol) can be added without breaking
//! downstream code.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TerminalCapabilities {
    /// 24-bit color output is safe to emit.
    pub supports_truecolor: bool,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        Self {
            supports_truecolor: env_reports_truecolor(std::env::var("COLORTERM").ok().as_deref()),
        }
    }

    /// Construction for tests and for callers that probe differently.
    pub fn with_truecolor(supports_truecolor: bool) -> Self {
        Self { supports_truecolor }
    }
}

fn env_reports_truecolor(colorterm: Option<&str>) -> bool {
    matches!(colorterm, Some(v) if v.eq_ignore_ascii_case("truecolor") || v.eq_ignore_ascii_case("24bit"))
}
