//! Static icon and shape sets offered by the pickers.

use serde::{Serialize, Serializer};

pub use crate::model::ShapeKind;

/// One entry of the fixed icon set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconKey {
    #[default]
    Star,
    Heart,
    ThumbsUp,
    Check,
    Play,
    ArrowRight,
    Bell,
    Camera,
    Comment,
    Envelope,
    Flag,
    Gift,
    Home,
    Image,
    Key,
    Lightbulb,
    MapMarker,
    Paperclip,
    Question,
    Share,
}

/// `(variant, key, emoji, monochrome fallback)`, in picker order.
const ICON_TABLE: [(IconKey, &str, &str, &str); 20] = [
    (IconKey::Star, "fa-star", "⭐", "★"),
    (IconKey::Heart, "fa-heart", "❤️", "♥"),
    (IconKey::ThumbsUp, "fa-thumbs-up", "👍", "☝"),
    (IconKey::Check, "fa-check", "✓", "✓"),
    (IconKey::Play, "fa-play", "▶️", "▶"),
    (IconKey::ArrowRight, "fa-arrow-right", "→", "→"),
    (IconKey::Bell, "fa-bell", "🔔", "♪"),
    (IconKey::Camera, "fa-camera", "📷", "◙"),
    (IconKey::Comment, "fa-comment", "💬", "❝"),
    (IconKey::Envelope, "fa-envelope", "✉️", "✉"),
    (IconKey::Flag, "fa-flag", "🏳️", "⚑"),
    (IconKey::Gift, "fa-gift", "🎁", "❖"),
    (IconKey::Home, "fa-home", "🏠", "⌂"),
    (IconKey::Image, "fa-image", "🖼️", "▣"),
    (IconKey::Key, "fa-key", "🔑", "⚿"),
    (IconKey::Lightbulb, "fa-lightbulb", "💡", "✹"),
    (IconKey::MapMarker, "fa-map-marker", "📍", "⌖"),
    (IconKey::Paperclip, "fa-paperclip", "📎", "⎘"),
    (IconKey::Question, "fa-question", "❓", "?"),
    (IconKey::Share, "fa-share", "↗️", "↗"),
];

impl IconKey {
    pub fn all() -> impl Iterator<Item = IconKey> {
        ICON_TABLE.iter().map(|row| row.0)
    }

    fn row(self) -> &'static (IconKey, &'static str, &'static str, &'static str) {
        // The table lists every variant in declaration order.
        &ICON_TABLE[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.row().1
    }

    /// Picker label: the key without its `fa-` prefix.
    pub fn label(self) -> &'static str {
        self.key().trim_start_matches("fa-")
    }

    /// Color emoji shown for the icon.
    pub fn emoji(self) -> &'static str {
        self.row().2
    }

    /// Single-codepoint glyph for faces without emoji coverage.
    pub fn fallback_glyph(self) -> &'static str {
        self.row().3
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ICON_TABLE
            .iter()
            .find(|(_, k, _, _)| *k == key)
            .map(|row| row.0)
    }

    /// Like [`IconKey::from_key`], but unknown keys resolve to the default icon.
    pub fn resolve(key: &str) -> Self {
        Self::from_key(key).unwrap_or_else(|| {
            log::warn!("unknown icon key {key:?}; using default");
            Self::default()
        })
    }
}

impl Serialize for IconKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Shapes in picker order with their labels.
pub fn shapes() -> impl Iterator<Item = (&'static str, &'static str)> {
    ShapeKind::ALL.into_iter().map(|k| (k.key(), k.label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_declaration_order() {
        for (i, key) in IconKey::all().enumerate() {
            assert_eq!(key as usize, i);
        }
        assert_eq!(IconKey::all().count(), 20);
    }

    #[test]
    fn lookup_by_key() {
        assert_eq!(IconKey::from_key("fa-bell"), Some(IconKey::Bell));
        assert_eq!(IconKey::Bell.emoji(), "🔔");
        assert_eq!(IconKey::MapMarker.label(), "map-marker");
    }

    #[test]
    fn unknown_key_falls_back_to_star() {
        assert_eq!(IconKey::resolve("fa-unicorn"), IconKey::Star);
        assert_eq!(IconKey::resolve("fa-unicorn").emoji(), "⭐");
    }

    #[test]
    fn shape_registry_keys() {
        let keys: Vec<&str> = shapes().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["rectangle", "circle", "oval", "rounded", "parallelogram", "rhombus"]
        );
        assert_eq!(ShapeKind::from_key("rounded"), Some(ShapeKind::RoundedRectangle));
    }
}
