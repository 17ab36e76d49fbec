//! Simple-mode boundary: the form submitted to the upload endpoint and the
//! handling of its response. Rendering for this mode happens server-side.

use crate::template::{NamedTemplate, TemplateKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Path the simple-mode form is posted to.
pub const GENERATE_ENDPOINT: &str = "/generate-thumbnail";

/// Download name for a simple-mode result.
pub const SIMPLE_DOWNLOAD_NAME: &str = "youtube-thumbnail.png";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimpleModeError {
    #[error("server responded {0}")]
    Status(u16),
    #[error("server returned an empty image")]
    EmptyPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Color,
    Image,
}

/// Uploaded background image for the form.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Arc<[u8]>,
}

/// Fields of the simple-mode form, with the endpoint's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleForm {
    pub title: String,
    pub subtitle: String,
    pub title_size: u32,
    pub subtitle_size: u32,
    pub bg_color: String,
    pub text_color: String,
    /// Any of `bold`, `italic`, `underline`.
    pub text_styles: Vec<String>,
    pub shadow_enabled: bool,
    pub shadow_color: String,
    pub shadow_offset_x: i32,
    pub shadow_offset_y: i32,
    pub bg_type: BackgroundType,
    #[serde(skip)]
    pub bg_image: Option<UploadFile>,
}

impl Default for SimpleForm {
    fn default() -> Self {
        Self {
            title: "Your Title".into(),
            subtitle: "Your Subtitle".into(),
            title_size: 48,
            subtitle_size: 24,
            bg_color: "#FF0000".into(),
            text_color: "#FFFFFF".into(),
            text_styles: Vec::new(),
            shadow_enabled: false,
            shadow_color: "#000000".into(),
            shadow_offset_x: 2,
            shadow_offset_y: 2,
            bg_type: BackgroundType::Color,
            bg_image: None,
        }
    }
}

/// One multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text { name: &'static str, value: String },
    File { name: &'static str, file: UploadFile },
}

impl SimpleForm {
    /// Preset the form from a named template: the gradient's first color
    /// goes to the color picker, the title color to the text color, and any
    /// uploaded background is dropped.
    pub fn apply_template(&mut self, template: &NamedTemplate) {
        let color = match template.kind {
            TemplateKind::Gradient => first_hex(template.background),
            TemplateKind::Color => Some(template.background),
        };
        if let Some(c) = color {
            self.bg_color = c.to_string();
        }
        self.text_color = template.title_color.to_string();
        self.bg_type = BackgroundType::Color;
        self.bg_image = None;
    }

    /// Multipart fields in form order. Unchecked checkboxes are omitted, as
    /// a browser would.
    pub fn parts(&self) -> Vec<FormPart> {
        let text = |name, value: String| FormPart::Text { name, value };
        let mut parts = vec![
            text("title", self.title.clone()),
            text("subtitle", self.subtitle.clone()),
            text("title_size", self.title_size.to_string()),
            text("subtitle_size", self.subtitle_size.to_string()),
            text("bg_color", self.bg_color.clone()),
            text("text_color", self.text_color.clone()),
            text("text_styles", self.text_styles.join(",")),
        ];
        if self.shadow_enabled {
            parts.push(text("shadow_enabled", "on".into()));
        }
        parts.extend([
            text("shadow_color", self.shadow_color.clone()),
            text("shadow_offset_x", self.shadow_offset_x.to_string()),
            text("shadow_offset_y", self.shadow_offset_y.to_string()),
            text(
                "bg_type",
                match self.bg_type {
                    BackgroundType::Color => "color",
                    BackgroundType::Image => "image",
                }
                .into(),
            ),
        ]);
        if let (BackgroundType::Image, Some(file)) = (self.bg_type, &self.bg_image) {
            parts.push(FormPart::File {
                name: "bg_image",
                file: file.clone(),
            });
        }
        parts
    }
}

/// The first `#RRGGBB` in a CSS value.
fn first_hex(value: &str) -> Option<&str> {
    value.match_indices('#').find_map(|(i, _)| {
        let candidate = value.get(i..i + 7)?;
        candidate[1..]
            .chars()
            .all(|c| c.is_ascii_hexdigit())
            .then_some(candidate)
    })
}

/// Turn the endpoint's response into image bytes.
pub fn interpret_response(status: u16, body: Vec<u8>) -> Result<Vec<u8>, SimpleModeError> {
    if !(200..300).contains(&status) {
        log::warn!("thumbnail generation failed with status {status}");
        return Err(SimpleModeError::Status(status));
    }
    if body.is_empty() {
        return Err(SimpleModeError::EmptyPayload);
    }
    Ok(body)
}
