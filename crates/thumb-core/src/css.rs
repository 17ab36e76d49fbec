//! CSS value parsing for colors and backgrounds.
//!
//! Built on `winnow` 0.7. Accepts the subset the editor produces and the
//! template tables contain: hex colors, `rgb()`/`rgba()`, a few keywords,
//! and `linear-gradient(<angle>, <color> [<pct>], ...)`.

use crate::model::{Background, Color};
use smallvec::SmallVec;
use winnow::ascii::{space0, space1};
use winnow::combinator::{alt, delimited, opt, separated, terminated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CssError {
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    #[error("invalid gradient {0:?}")]
    InvalidGradient(String),
    #[error("gradient needs at least two colors, found {0}")]
    TooFewStops(usize),
    #[error("unknown background type {0:?}")]
    UnknownKind(String),
}

/// Parse a single CSS color.
pub fn parse_color(input: &str) -> Result<Color, CssError> {
    let mut rest = input.trim();
    match color.parse_next(&mut rest) {
        Ok(c) if rest.trim().is_empty() => Ok(c),
        _ => Err(CssError::InvalidColor(input.to_string())),
    }
}

/// Parse `linear-gradient(...)` into its ordered color stops.
///
/// The angle is accepted but not kept: gradients always render on the
/// 135° diagonal.
pub fn parse_gradient(input: &str) -> Result<SmallVec<[Color; 4]>, CssError> {
    let mut rest = input.trim();
    let stops = match linear_gradient.parse_next(&mut rest) {
        Ok(stops) if rest.trim().is_empty() => stops,
        _ => return Err(CssError::InvalidGradient(input.to_string())),
    };
    if stops.len() < 2 {
        return Err(CssError::TooFewStops(stops.len()));
    }
    Ok(stops)
}

/// Build a background from a `(type, value)` pair as stored in template
/// configs: `"color"` or `"gradient"`.
pub fn parse_background(kind: &str, value: &str) -> Result<Background, CssError> {
    match kind {
        "color" => parse_color(value).map(Background::Solid),
        "gradient" => parse_gradient(value).map(Background::Gradient),
        other => Err(CssError::UnknownKind(other.to_string())),
    }
}

/// Parse any CSS background value, detecting gradients by prefix.
pub fn parse_background_value(value: &str) -> Result<Background, CssError> {
    if value.trim_start().starts_with("linear-gradient") {
        parse_background("gradient", value)
    } else {
        parse_background("color", value)
    }
}

// ─── Grammar ─────────────────────────────────────────────────────────────

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

fn color(input: &mut &str) -> ModalResult<Color> {
    alt((hex_color, rgb_function, named_color)).parse_next(input)
}

fn hex_color(input: &mut &str) -> ModalResult<Color> {
    let _ = '#'.parse_next(input)?;
    let digits: &str = take_while(3..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    Color::from_hex(digits).ok_or_else(backtrack)
}

fn rgb_function(input: &mut &str) -> ModalResult<Color> {
    let name = alt(("rgba", "rgb")).parse_next(input)?;
    let args: Vec<f32> = delimited(
        ('(', space0),
        separated(3..=4, number, (space0, ',', space0)),
        (space0, ')'),
    )
    .parse_next(input)?;

    let channel = |v: f32| v.clamp(0.0, 255.0) / 255.0;
    let alpha = match (name, args.get(3)) {
        (_, Some(a)) => a.clamp(0.0, 1.0),
        ("rgba", None) => return Err(backtrack()),
        _ => 1.0,
    };
    Ok(Color::rgba(
        channel(args[0]),
        channel(args[1]),
        channel(args[2]),
        alpha,
    ))
}

fn named_color(input: &mut &str) -> ModalResult<Color> {
    let name: &str = take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)?;
    let color = match name.to_ascii_lowercase().as_str() {
        "white" => Color::WHITE,
        "black" => Color::BLACK,
        "red" => Color::rgba(1.0, 0.0, 0.0, 1.0),
        "transparent" => Color::TRANSPARENT,
        _ => return Err(backtrack()),
    };
    Ok(color)
}

fn number(input: &mut &str) -> ModalResult<f32> {
    let start = *input;
    if input.starts_with('-') {
        *input = &input[1..];
    }
    let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if input.starts_with('.') {
        *input = &input[1..];
        let _ =
            take_while::<_, _, ContextError>(0.., |c: char| c.is_ascii_digit()).parse_next(input);
    }
    let matched = &start[..start.len() - input.len()];
    matched.parse::<f32>().map_err(|_| backtrack())
}

/// `135deg` or `to bottom right`.
fn direction(input: &mut &str) -> ModalResult<()> {
    alt((
        terminated(number, alt(("deg", "turn", "rad"))).void(),
        ("to", space1, take_while(1.., |c: char| c.is_ascii_alphabetic() || c == ' ')).void(),
    ))
    .parse_next(input)
}

/// A color optionally followed by a position (`#fff 40%`).
fn color_stop(input: &mut &str) -> ModalResult<Color> {
    let c = color.parse_next(input)?;
    let _ = opt((space1, number, '%')).parse_next(input)?;
    Ok(c)
}

fn linear_gradient(input: &mut &str) -> ModalResult<SmallVec<[Color; 4]>> {
    let _ = ("linear-gradient", space0, '(', space0).parse_next(input)?;
    let _ = opt(terminated(direction, (space0, ',', space0))).parse_next(input)?;
    let stops: Vec<Color> = separated(1.., color_stop, (space0, ',', space0)).parse_next(input)?;
    let _ = (space0, ')').parse_next(input)?;
    Ok(stops.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_hex_forms() {
        assert_eq!(parse_color("#FF0000").unwrap().to_hex(), "#FF0000");
        assert_eq!(parse_color("  #abc ").unwrap().to_hex(), "#AABBCC");
        assert!(parse_color("#GG0000").is_err());
    }

    #[test]
    fn parse_rgb_functions() {
        assert_eq!(parse_color("rgb(255, 204, 0)").unwrap().to_hex(), "#FFCC00");
        let c = parse_color("rgba(0,0,0,0.5)").unwrap();
        assert_eq!(c.to_rgba8(), [0, 0, 0, 128]);
        assert!(parse_color("rgba(0,0,0)").is_err());
    }

    #[test]
    fn parse_keywords() {
        assert_eq!(parse_color("white").unwrap(), Color::WHITE);
        assert!(parse_color("chartreuse").is_err());
    }

    #[test]
    fn parse_two_stop_gradient() {
        let stops = parse_gradient("linear-gradient(135deg, #FF0000, #990000)").unwrap();
        let hex: Vec<String> = stops.iter().map(Color::to_hex).collect();
        assert_eq!(hex, vec!["#FF0000", "#990000"]);
    }

    #[test]
    fn parse_three_stop_gradient_with_positions() {
        let stops =
            parse_gradient("linear-gradient(to bottom right, #0f2027 0%, #203a43 50%, #2c5364 100%)")
                .unwrap();
        assert_eq!(stops.len(), 3);
        assert_eq!(stops[1].to_hex(), "#203A43");
    }

    #[test]
    fn single_stop_gradient_rejected() {
        assert_eq!(
            parse_gradient("linear-gradient(135deg, #FF0000)"),
            Err(CssError::TooFewStops(1))
        );
    }

    #[test]
    fn background_by_kind() {
        assert!(matches!(
            parse_background("color", "#000000"),
            Ok(Background::Solid(_))
        ));
        assert!(matches!(
            parse_background_value("linear-gradient(135deg, #000428, #004e92)"),
            Ok(Background::Gradient(_))
        ));
        assert!(parse_background("pattern", "#000").is_err());
    }
}
