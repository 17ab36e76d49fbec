//! Single-line text fitting.
//!
//! Text elements never wrap. When a line is wider than the frame allows,
//! its font size is stepped down until it fits. Width comes from a
//! [`TextMeasure`], the same facility the renderer draws glyphs with, so a
//! line that fits in the editor also fits in the exported image.

use crate::model::{FontStyle, FontWeight, TextElement};

/// Horizontal room kept free next to a fitted line, in frame pixels.
pub const FIT_MARGIN: f32 = 40.0;

/// Fitting never shrinks text below this size.
pub const FIT_FLOOR: f32 = 12.0;

/// Text metrics source shared by layout, fitting and rendering.
pub trait TextMeasure {
    /// Advance width of `text` laid out on one line.
    fn measure(&self, text: &str, size: f32, weight: FontWeight, style: FontStyle) -> f32;

    /// Height of one line box at `size`.
    fn line_height(&self, size: f32) -> f32 {
        size * 1.2
    }
}

/// Font-independent metrics derived from character classes.
///
/// Used when no font face is available and in tests, where results must
/// not depend on which fonts are installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl EstimatedMetrics {
    /// Approximate advance of `c` in ems for a sans-serif face.
    pub fn advance_em(c: char) -> f32 {
        match c {
            ' ' => 0.28,
            'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 0.28,
            'f' | 't' | 'r' | 'I' | '(' | ')' | '-' => 0.36,
            'm' | 'w' => 0.83,
            'M' | 'W' => 0.9,
            c if c.is_ascii_uppercase() => 0.67,
            c if c.is_ascii_digit() => 0.56,
            c if c.is_ascii() => 0.52,
            // Emoji and other wide glyphs.
            c if (c as u32) >= 0x2000 => 1.0,
            _ => 0.6,
        }
    }
}

impl TextMeasure for EstimatedMetrics {
    fn measure(&self, text: &str, size: f32, weight: FontWeight, _style: FontStyle) -> f32 {
        let ems: f32 = text
            .chars()
            // Variation selectors and joiners take no room.
            .filter(|c| !matches!(*c as u32, 0xFE0E | 0xFE0F | 0x200D))
            .map(Self::advance_em)
            .sum();
        let bold = match weight {
            FontWeight::Bold => 1.08,
            FontWeight::Normal => 1.0,
        };
        ems * size * bold
    }
}

/// Shrink `text` in 1px steps until it fits `frame_width - FIT_MARGIN`.
///
/// Starts from the current size and stops at the first size that fits or
/// at [`FIT_FLOOR`]. Never grows text, never pushes it below the floor, and
/// leaves blank content alone. Returns whether the size changed.
pub fn fit_single_line(text: &mut TextElement, frame_width: f32, measure: &dyn TextMeasure) -> bool {
    if text.content.trim().is_empty() {
        return false;
    }
    let max = frame_width - FIT_MARGIN;
    let width = |size: f32| measure.measure(&text.content, size, text.weight, text.style);

    let start = text.font_size;
    let mut size = start;
    while size > FIT_FLOOR && width(size) > max {
        size = (size - 1.0).max(FIT_FLOOR);
    }

    if size != start {
        log::trace!("fit {:?}: {start} -> {size}", text.content);
        text.font_size = size;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;
    use pretty_assertions::assert_eq;

    fn text(content: &str, size: f32) -> TextElement {
        TextElement::new(content, size, Color::WHITE)
    }

    #[test]
    fn fitting_text_is_untouched() {
        let mut t = text("Hello", 32.0);
        assert!(!fit_single_line(&mut t, 1280.0, &EstimatedMetrics));
        assert_eq!(t.font_size, 32.0);
    }

    #[test]
    fn wide_text_shrinks_until_it_fits() {
        let mut t = text("Hello World", 32.0);
        assert!(fit_single_line(&mut t, 200.0, &EstimatedMetrics));
        let w = EstimatedMetrics.measure("Hello World", t.font_size, t.weight, t.style);
        assert!(w <= 160.0, "width {w} at size {}", t.font_size);
        let one_up = EstimatedMetrics.measure("Hello World", t.font_size + 1.0, t.weight, t.style);
        assert!(one_up > 160.0);
    }

    #[test]
    fn never_below_floor() {
        let mut t = text("A very long line that cannot possibly fit", 40.0);
        fit_single_line(&mut t, 60.0, &EstimatedMetrics);
        assert_eq!(t.font_size, FIT_FLOOR);
    }

    #[test]
    fn fractional_start_lands_on_floor() {
        let mut t = text("A very long line that cannot possibly fit", 14.4);
        fit_single_line(&mut t, 60.0, &EstimatedMetrics);
        assert_eq!(t.font_size, FIT_FLOOR);
    }

    #[test]
    fn blank_content_is_skipped() {
        let mut t = text("   ", 80.0);
        assert!(!fit_single_line(&mut t, 50.0, &EstimatedMetrics));
        assert_eq!(t.font_size, 80.0);
    }

    #[test]
    fn bold_measures_wider() {
        let normal = EstimatedMetrics.measure("Title", 48.0, FontWeight::Normal, FontStyle::Normal);
        let bold = EstimatedMetrics.measure("Title", 48.0, FontWeight::Bold, FontStyle::Normal);
        assert!(bold > normal);
    }
}
