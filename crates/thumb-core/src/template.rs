//! Canned background templates.

use crate::css::{self, CssError};
use crate::model::{
    Background, Color, DEFAULT_SUBTITLE, DEFAULT_TITLE, SceneElement, SceneGraph,
};
use serde::{Deserialize, Serialize};

/// Background kind of a template value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Color,
    Gradient,
}

/// A template as consumed by [`apply_template`]: `{background, type}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub background: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: TemplateKind,
}

fn default_kind() -> TemplateKind {
    TemplateKind::Color
}

impl TemplateConfig {
    pub fn new(background: impl Into<String>, kind: TemplateKind) -> Self {
        Self {
            background: background.into(),
            kind,
        }
    }

    pub fn parse_background(&self) -> Result<Background, CssError> {
        match self.kind {
            TemplateKind::Color => css::parse_background("color", &self.background),
            TemplateKind::Gradient => css::parse_background("gradient", &self.background),
        }
    }

    /// Text color that stays readable on this background: black on bright
    /// solid colors, white on dark colors and on every gradient.
    pub fn contrast_color(&self) -> Color {
        match self.kind {
            TemplateKind::Gradient => Color::WHITE,
            TemplateKind::Color => match css::parse_color(&self.background) {
                Ok(c) if c.brightness() > 128.0 => Color::BLACK,
                _ => Color::WHITE,
            },
        }
    }
}

/// Replace the background, drop every free element, reset Title and
/// Subtitle to their default text in the contrast color, and clear the
/// selection. A background that does not parse leaves the scene untouched.
pub fn apply_template(scene: &mut SceneGraph, template: &TemplateConfig) -> Result<(), CssError> {
    let background = template.parse_background()?;
    let text_color = template.contrast_color();

    scene.clear_free_elements();
    scene.set_background(background);
    reset_text(scene.title_mut(), DEFAULT_TITLE, text_color);
    reset_text(scene.subtitle_mut(), DEFAULT_SUBTITLE, text_color);
    scene.set_selected(None);
    log::debug!("applied template {:?}", template.background);
    Ok(())
}

fn reset_text(el: &mut SceneElement, content: &str, color: Color) {
    if let Some(text) = el.as_text_mut() {
        text.content = content.to_string();
        text.color = color;
    }
}

// ─── Registries ──────────────────────────────────────────────────────────

/// An entry of the template gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryTemplate {
    pub name: &'static str,
    pub background: &'static str,
    pub kind: TemplateKind,
}

impl GalleryTemplate {
    pub fn config(&self) -> TemplateConfig {
        TemplateConfig::new(self.background, self.kind)
    }
}

const fn gradient(name: &'static str, background: &'static str) -> GalleryTemplate {
    GalleryTemplate {
        name,
        background,
        kind: TemplateKind::Gradient,
    }
}

const fn solid(name: &'static str, background: &'static str) -> GalleryTemplate {
    GalleryTemplate {
        name,
        background,
        kind: TemplateKind::Color,
    }
}

pub const GALLERY: [GalleryTemplate; 20] = [
    gradient("Red Gradient", "linear-gradient(135deg, #FF0000, #990000)"),
    gradient("Dark Professional", "linear-gradient(135deg, #000000, #333333)"),
    gradient("Bright Yellow", "linear-gradient(135deg, #FFCC00, #FF9900)"),
    gradient("Blue Ocean", "linear-gradient(135deg, #0077b6, #00b4d8)"),
    gradient("Green Nature", "linear-gradient(135deg, #2a9d8f, #e9c46a)"),
    solid("Pure Red", "#FF0000"),
    solid("Deep Black", "#000000"),
    solid("Clean White", "#FFFFFF"),
    solid("Royal Blue", "#0066FF"),
    solid("Vibrant Green", "#00CC66"),
    gradient("Premium Gradient", "linear-gradient(135deg, #667eea, #764ba2)"),
    gradient("Dark Elegant", "linear-gradient(135deg, #434343, #000000)"),
    gradient("Summer Vibes", "linear-gradient(135deg, #43cea2, #185a9d)"),
    gradient("Sunset", "linear-gradient(135deg, #ff7e5f, #feb47b)"),
    gradient("Ocean Blue", "linear-gradient(135deg, #00c6fb, #005bea)"),
    gradient("Tech Dark", "linear-gradient(135deg, #0f2027, #203a43, #2c5364)"),
    gradient("Warm Sunset", "linear-gradient(135deg, #f12711, #f5af19)"),
    gradient("Cool Mint", "linear-gradient(135deg, #a1ffce, #faffd1)"),
    gradient("Purple Haze", "linear-gradient(135deg, #7b4397, #dc2430)"),
    gradient("Deep Space", "linear-gradient(135deg, #000428, #004e92)"),
];

/// A template addressable by key from the start-up location, with its own
/// title and subtitle colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub background: &'static str,
    pub kind: TemplateKind,
    pub title_color: &'static str,
    pub subtitle_color: &'static str,
}

impl NamedTemplate {
    pub fn config(&self) -> TemplateConfig {
        TemplateConfig::new(self.background, self.kind)
    }

    pub fn lookup(key: &str) -> Option<&'static NamedTemplate> {
        NAMED_TEMPLATES.iter().find(|t| t.key == key)
    }
}

pub const NAMED_TEMPLATES: [NamedTemplate; 4] = [
    NamedTemplate {
        key: "bold-red",
        name: "Bold Red",
        background: "linear-gradient(135deg, #FF0000, #990000)",
        kind: TemplateKind::Gradient,
        title_color: "#FFFFFF",
        subtitle_color: "#FFFFFF",
    },
    NamedTemplate {
        key: "dark-professional",
        name: "Dark Professional",
        background: "linear-gradient(135deg, #000000, #333333)",
        kind: TemplateKind::Gradient,
        title_color: "#FFFFFF",
        subtitle_color: "#CCCCCC",
    },
    NamedTemplate {
        key: "bright-yellow",
        name: "Bright Yellow",
        background: "linear-gradient(135deg, #FFCC00, #FF9900)",
        kind: TemplateKind::Gradient,
        title_color: "#000000",
        subtitle_color: "#333333",
    },
    NamedTemplate {
        key: "golden-energy",
        name: "Golden Energy",
        background: "linear-gradient(135deg, #FFD700, #FF8C00)",
        kind: TemplateKind::Gradient,
        title_color: "#000000",
        subtitle_color: "#333333",
    },
];

/// Apply a named template, then recolor Title and Subtitle with the
/// template's own colors.
pub fn apply_named_template(scene: &mut SceneGraph, template: &NamedTemplate) -> Result<(), CssError> {
    apply_template(scene, &template.config())?;
    let title = css::parse_color(template.title_color)?;
    let subtitle = css::parse_color(template.subtitle_color)?;
    if let Some(t) = scene.title_mut().as_text_mut() {
        t.color = title;
    }
    if let Some(t) = scene.subtitle_mut().as_text_mut() {
        t.color = subtitle;
    }
    Ok(())
}
