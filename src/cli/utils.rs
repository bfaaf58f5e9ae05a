//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use semwrap::AppState;
use semwrap::render::Color;

/// Persist a string either to a file or stdout when `-` is provided.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a wrap document from disk.
pub fn load_wrap(path: &Path) -> Result<AppState> {
    AppState::load(path)
}

/// Save a wrap document back to disk.
pub fn save_wrap(path: &Path, state: &AppState) -> Result<()> {
    state.save(path)?;
    tracing::info!(path = %path.display(), "wrap saved");
    Ok(())
}

/// Clap parser for 1-based positions; returns the zero-based index.
pub fn parse_position(input: &str) -> Result<usize, String> {
    let value: usize = input
        .trim()
        .parse()
        .map_err(|_| format!("'{input}' is not a position (1, 2, 3, ...)"))?;
    if value == 0 {
        return Err("positions start at 1".to_string());
    }
    Ok(value - 1)
}

/// Clap parser for `#rrggbb` colors.
pub fn parse_color(input: &str) -> Result<String, String> {
    Color::parse_hex(input)
        .map(|_| input.trim().to_string())
        .ok_or_else(|| format!("'{input}' is not a #rrggbb color"))
}

/// Clap parser for preview boxes written as `WIDTHxHEIGHT`.
pub fn parse_preview(input: &str) -> Result<(f64, f64), String> {
    let (w, h) = input
        .split_once(['x', 'X'])
        .ok_or_else(|| "preview box must look like 900x700".to_string())?;
    let parse = |raw: &str| {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| format!("'{raw}' is not a valid preview dimension"))
    };
    Ok((parse(w)?, parse(h)?))
}

/// Round to two decimals for display, dropping a trailing `.0`.
pub fn trim_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn positions_are_one_based() {
        assert_eq!(parse_position("1"), Ok(0));
        assert_eq!(parse_position(" 3 "), Ok(2));
        assert!(parse_position("0").is_err());
        assert!(parse_position("first").is_err());
    }

    #[test]
    fn preview_boxes_parse() {
        assert_eq!(parse_preview("900x700"), Ok((900.0, 700.0)));
        assert_eq!(parse_preview("620X480.5"), Ok((620.0, 480.5)));
        assert!(parse_preview("900").is_err());
        assert!(parse_preview("axb").is_err());
    }

    #[test]
    fn numbers_are_trimmed_for_display() {
        assert_eq!(trim_number(99.99999999999999), "100");
        assert_eq!(trim_number(100.00000000000006), "100");
        assert_eq!(trim_number(33.34), "33.34");
        assert_eq!(trim_number(12.5), "12.5");
    }

    #[test]
    fn colors_are_validated() {
        assert_eq!(parse_color("#112233"), Ok("#112233".to_string()));
        assert!(parse_color("red").is_err());
    }
}
