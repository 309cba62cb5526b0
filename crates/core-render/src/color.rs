//! Configured color parsing: named colors or `#rrggbb`, degraded to the
//! 256-color cube on terminals without truecolor support.

use core_terminal::TerminalCapabilities;
use crossterm::style::Color;
use tracing::warn;

/// Parse a configured color. Unknown specs return `None`; callers fall
/// back to their default and the mistake is logged once per parse.
pub fn parse_color(spec: &str, caps: &TerminalCapabilities) -> Option<Color> {
    let spec = spec.trim();
    if let Some(hex) = spec.strip_prefix('#') {
        return parse_hex(hex, caps);
    }
    let named = match spec.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "white" => Color::White,
        "red" => Color::Red,
        "green" => Color::Green,
        "blue" => Color::Blue,
        "yellow" => Color::Yellow,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "grey" | "gray" => Color::Grey,
        "darkgrey" | "darkgray" => Color::DarkGrey,
        "darkred" => Color::DarkRed,
        "darkgreen" => Color::DarkGreen,
        "darkblue" => Color::DarkBlue,
        "darkyellow" => Color::DarkYellow,
        "darkmagenta" => Color::DarkMagenta,
        "darkcyan" => Color::DarkCyan,
        _ => {
            warn!(target: "render.color", spec, "unknown_color_spec");
            return None;
        }
    };
    Some(named)
}

fn parse_hex(hex: &str, caps: &TerminalCapabilities) -> Option<Color> {
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        warn!(target: "render.color", hex, "malformed_hex_color");
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    if caps.supports_truecolor {
        Some(Color::Rgb { r, g, b })
    } else {
        Some(Color::AnsiValue(ansi256_from_rgb(r, g, b)))
    }
}

/// Nearest entry in the 6x6x6 xterm color cube (greyscale ramp for
/// near-grey values).
fn ansi256_from_rgb(r: u8, g: u8, b: u8) -> u8 {
    let spread = r.abs_diff(g).max(g.abs_diff(b)).max(r.abs_diff(b));
    if spread < 8 {
        // 24-step greyscale ramp at indices 232..=255.
        let level = u16::from(r);
        if level < 8 {
            return 16; // cube black
        }
        if level > 238 {
            return 231; // cube white
        }
        return 232 + ((level - 8) / 10) as u8;
    }
    let scale = |v: u8| -> u8 { ((u16::from(v) * 5 + 127) / 255) as u8 };
    16 + 36 * scale(r) + 6 * scale(g) + scale(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truecolor() -> TerminalCapabilities {
        TerminalCapabilities::with_truecolor(true)
    }

    fn basic() -> TerminalCapabilities {
        TerminalCapabilities::with_truecolor(false)
    }

    #[test]
    fn named_colors_parse() {
        assert_eq!(parse_color("black", &truecolor()), Some(Color::Black));
        assert_eq!(parse_color("White", &truecolor()), Some(Color::White));
        assert_eq!(parse_color("darkgray", &truecolor()), Some(Color::DarkGrey));
    }

    #[test]
    fn hex_parses_to_rgb_on_truecolor() {
        assert_eq!(
            parse_color("#102030", &truecolor()),
            Some(Color::Rgb {
                r: 0x10,
                g: 0x20,
                b: 0x30
            })
        );
    }

    #[test]
    fn hex_degrades_without_truecolor() {
        let Some(Color::AnsiValue(v)) = parse_color("#ff0000", &basic()) else {
            panic!("expected ansi value");
        };
        assert_eq!(v, 16 + 36 * 5); // pure red corner of the cube
    }

    #[test]
    fn grey_hex_uses_greyscale_ramp() {
        let Some(Color::AnsiValue(v)) = parse_color("#808080", &basic()) else {
            panic!("expected ansi value");
        };
        assert!((232..=255).contains(&v));
    }

    #[test]
    fn malformed_specs_return_none() {
        assert_eq!(parse_color("#12345", &truecolor()), None);
        assert_eq!(parse_color("#nothex", &truecolor()), None);
        assert_eq!(parse_color("chartreuse-ish", &truecolor()), None);
    }
}
