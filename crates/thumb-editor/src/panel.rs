//! Properties panel binder.
//!
//! [`build_panel`] describes a form for the selected element: one field
//! per mutable attribute of its variant, in panel order, with the current
//! value. The host renders the form and reports each input back through
//! [`set_property`], which parses, clamps and writes the value straight
//! into the element.

use serde::Serialize;
use thumb_core::css::parse_color;
use thumb_core::{
    Color, ElementId, ElementKind, FontStyle, FontWeight, ICON_FONT_RANGE, IconElement, IconKey,
    ImageElement, SceneElement, SceneGraph, ShapeElement, TextElement, TextMeasure,
    fit_single_line,
};

pub const PLACEHOLDER: &str = "Select an element to edit its properties";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    #[error("no element is selected")]
    NoSelection,
    #[error("{kind} elements have no property {key:?}")]
    UnknownProperty { kind: &'static str, key: String },
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
    #[error("{0} cannot be deleted")]
    FixedElement(ElementId),
    #[error("{0} is not an image")]
    NotAnImage(ElementId),
}

/// Buttons under the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelAction {
    Delete,
    MakeFullScreen,
    SetAsBackground,
}

impl PanelAction {
    pub fn key(self) -> &'static str {
        match self {
            PanelAction::Delete => "delete",
            PanelAction::MakeFullScreen => "make-full-screen",
            PanelAction::SetAsBackground => "set-as-background",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        [
            PanelAction::Delete,
            PanelAction::MakeFullScreen,
            PanelAction::SetAsBackground,
        ]
        .into_iter()
        .find(|a| a.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Control {
    Text,
    Range {
        min: f32,
        max: f32,
        unit: &'static str,
    },
    Color,
    Select {
        options: Vec<SelectOption>,
    },
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub control: Control,
    pub value: String,
    /// Shadow sub-fields hide while the shadow is off.
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelForm {
    pub element: Option<ElementId>,
    pub heading: &'static str,
    pub placeholder: Option<&'static str>,
    pub fields: Vec<FieldSpec>,
    pub actions: Vec<PanelAction>,
}

impl PanelForm {
    pub fn placeholder() -> Self {
        Self {
            element: None,
            heading: "",
            placeholder: Some(PLACEHOLDER),
            fields: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.element.is_none()
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

// ─── Field construction ──────────────────────────────────────────────────

fn field(key: &'static str, label: &'static str, control: Control, value: String) -> FieldSpec {
    FieldSpec {
        key,
        label,
        control,
        value,
        visible: true,
    }
}

fn range(min: f32, max: f32, unit: &'static str) -> Control {
    Control::Range { min, max, unit }
}

fn select(options: &[(&'static str, &'static str)]) -> Control {
    Control::Select {
        options: options
            .iter()
            .map(|&(value, label)| SelectOption { value, label })
            .collect(),
    }
}

/// Slider value as the panel shows it: whole pixels.
fn whole(v: f32) -> String {
    format!("{}", v.round())
}

/// Form for the current selection, or the placeholder.
pub fn build_panel(scene: &SceneGraph) -> PanelForm {
    let Some(el) = scene.selected_element() else {
        return PanelForm::placeholder();
    };

    let (heading, fields) = match &el.kind {
        ElementKind::Text(t) => ("Text Properties", text_fields(t)),
        ElementKind::Shape(s) => ("Shape Properties", shape_fields(s)),
        ElementKind::Icon(i) => ("Icon Properties", icon_fields(i)),
        ElementKind::Image(i) => ("Image Properties", image_fields(i)),
    };

    let mut actions = Vec::new();
    if matches!(el.kind, ElementKind::Image(_)) {
        actions.extend([PanelAction::MakeFullScreen, PanelAction::SetAsBackground]);
    }
    if !el.is_fixed() {
        actions.push(PanelAction::Delete);
    }

    PanelForm {
        element: Some(el.id),
        heading,
        placeholder: None,
        fields,
        actions,
    }
}

fn text_fields(t: &TextElement) -> Vec<FieldSpec> {
    let shadow = t.shadow;
    let sub = |mut f: FieldSpec| {
        f.visible = shadow.enabled;
        f
    };
    vec![
        field("content", "Text", Control::Text, t.content.clone()),
        field("fontSize", "Font Size (px)", range(12.0, 160.0, "px"), whole(t.font_size)),
        field("color", "Color", Control::Color, t.color.to_hex()),
        field(
            "fontWeight",
            "Weight",
            select(&[("normal", "Normal"), ("bold", "Bold")]),
            weight_key(t.weight).into(),
        ),
        field(
            "fontStyle",
            "Style",
            select(&[("normal", "Normal"), ("italic", "Italic")]),
            style_key(t.style).into(),
        ),
        field("shadowEnabled", "Shadow", Control::Checkbox, shadow.enabled.to_string()),
        sub(field("shadowColor", "Shadow Color", Control::Color, shadow.color.to_hex())),
        sub(field("shadowX", "Shadow X", range(-20.0, 20.0, "px"), whole(shadow.offset_x))),
        sub(field("shadowY", "Shadow Y", range(-20.0, 20.0, "px"), whole(shadow.offset_y))),
        sub(field("shadowBlur", "Shadow Blur", range(0.0, 20.0, "px"), whole(shadow.blur))),
    ]
}

fn shape_fields(s: &ShapeElement) -> Vec<FieldSpec> {
    vec![
        field(
            "label",
            "Shape Text",
            Control::Text,
            s.label.clone().unwrap_or_default(),
        ),
        field("fill", "Fill Color", Control::Color, s.fill.to_hex()),
        field("width", "Width (px)", range(40.0, 1000.0, "px"), whole(s.width)),
        field("height", "Height (px)", range(40.0, 800.0, "px"), whole(s.height)),
        field("labelColor", "Text Color", Control::Color, s.label_color.to_hex()),
        field("labelSize", "Text Size", range(10.0, 120.0, "px"), whole(s.label_size)),
    ]
}

/// Icons have no width or height of their own. The size slider is the
/// only dimension, and a resize-handle drag writes the dragged height into
/// it, clamped to the same range.
fn icon_fields(i: &IconElement) -> Vec<FieldSpec> {
    let (lo, hi) = ICON_FONT_RANGE;
    let options = IconKey::all()
        .map(|k| SelectOption {
            value: k.key(),
            label: k.label(),
        })
        .collect();
    vec![
        field("icon", "Icon", Control::Select { options }, i.icon.key().into()),
        field("color", "Color", Control::Color, i.color.to_hex()),
        field("fontSize", "Size (px)", range(lo, hi, "px"), whole(i.font_size)),
    ]
}

fn image_fields(i: &ImageElement) -> Vec<FieldSpec> {
    vec![
        field("opacity", "Opacity", range(0.0, 100.0, "%"), whole(i.opacity * 100.0)),
        field("width", "Width (px)", range(50.0, 1280.0, "px"), whole(i.width)),
        field("height", "Height (px)", range(50.0, 720.0, "px"), whole(i.height)),
    ]
}

fn weight_key(w: FontWeight) -> &'static str {
    match w {
        FontWeight::Normal => "normal",
        FontWeight::Bold => "bold",
    }
}

fn style_key(s: FontStyle) -> &'static str {
    match s {
        FontStyle::Normal => "normal",
        FontStyle::Italic => "italic",
    }
}

// ─── Writes ──────────────────────────────────────────────────────────────

struct Input<'a> {
    key: &'a str,
    value: &'a str,
}

impl Input<'_> {
    fn invalid(&self) -> PanelError {
        PanelError::InvalidValue {
            key: self.key.to_string(),
            value: self.value.to_string(),
        }
    }

    fn number(&self, min: f32, max: f32) -> Result<f32, PanelError> {
        let v: f32 = self.value.trim().parse().map_err(|_| self.invalid())?;
        if !v.is_finite() {
            return Err(self.invalid());
        }
        Ok(v.clamp(min, max))
    }

    fn color(&self) -> Result<Color, PanelError> {
        parse_color(self.value).map_err(|_| self.invalid())
    }

    fn flag(&self) -> Result<bool, PanelError> {
        match self.value.trim() {
            "true" | "on" | "1" => Ok(true),
            "false" | "off" | "0" | "" => Ok(false),
            _ => Err(self.invalid()),
        }
    }
}

/// Write one panel input into `el`.
///
/// Text edits that can change the line width re-run the single-line fit
/// against `frame_width`.
pub fn set_property(
    el: &mut SceneElement,
    key: &str,
    value: &str,
    frame_width: f32,
    measure: &dyn TextMeasure,
) -> Result<(), PanelError> {
    let input = Input { key, value };
    let kind = el.kind.name();
    let unknown = || PanelError::UnknownProperty {
        kind,
        key: key.to_string(),
    };

    match &mut el.kind {
        ElementKind::Text(t) => {
            let refit = set_text_property(t, &input).ok_or_else(unknown)??;
            if refit {
                fit_single_line(t, frame_width, measure);
            }
        }
        ElementKind::Shape(s) => set_shape_property(s, &input).ok_or_else(unknown)??,
        ElementKind::Icon(i) => set_icon_property(i, &input).ok_or_else(unknown)??,
        ElementKind::Image(i) => set_image_property(i, &input).ok_or_else(unknown)??,
    }
    log::trace!("{}.{key} = {value:?}", el.id);
    Ok(())
}

/// `None` for keys the variant lacks; `Some(Ok(true))` when the line
/// needs refitting.
fn set_text_property(t: &mut TextElement, input: &Input) -> Option<Result<bool, PanelError>> {
    let result = match input.key {
        "content" => {
            t.content = input.value.to_string();
            Ok(true)
        }
        "fontSize" => input.number(12.0, 160.0).map(|v| {
            t.font_size = v;
            true
        }),
        "color" => input.color().map(|c| {
            t.color = c;
            true
        }),
        "fontWeight" => match input.value {
            "normal" => Ok(FontWeight::Normal),
            "bold" => Ok(FontWeight::Bold),
            _ => Err(input.invalid()),
        }
        .map(|w| {
            t.weight = w;
            true
        }),
        "fontStyle" => match input.value {
            "normal" => Ok(FontStyle::Normal),
            "italic" => Ok(FontStyle::Italic),
            _ => Err(input.invalid()),
        }
        .map(|s| {
            t.style = s;
            true
        }),
        "shadowEnabled" => input.flag().map(|on| {
            t.shadow.enabled = on;
            false
        }),
        "shadowColor" => input.color().map(|c| {
            t.shadow.color = c;
            false
        }),
        "shadowX" => input.number(-20.0, 20.0).map(|v| {
            t.shadow.offset_x = v;
            false
        }),
        "shadowY" => input.number(-20.0, 20.0).map(|v| {
            t.shadow.offset_y = v;
            false
        }),
        "shadowBlur" => input.number(0.0, 20.0).map(|v| {
            t.shadow.blur = v;
            false
        }),
        _ => return None,
    };
    Some(result)
}

fn set_shape_property(s: &mut ShapeElement, input: &Input) -> Option<Result<(), PanelError>> {
    let result = match input.key {
        "label" => {
            s.label = Some(input.value.to_string());
            Ok(())
        }
        "fill" => input.color().map(|c| s.fill = c),
        "width" => input.number(40.0, 1000.0).map(|v| s.width = v),
        "height" => input.number(40.0, 800.0).map(|v| s.height = v),
        "labelColor" => input.color().map(|c| s.label_color = c),
        "labelSize" => input.number(10.0, 120.0).map(|v| s.label_size = v),
        _ => return None,
    };
    Some(result)
}

fn set_icon_property(i: &mut IconElement, input: &Input) -> Option<Result<(), PanelError>> {
    let result = match input.key {
        "icon" => {
            i.icon = IconKey::resolve(input.value);
            Ok(())
        }
        "color" => input.color().map(|c| i.color = c),
        "fontSize" => input.number(ICON_FONT_RANGE.0, ICON_FONT_RANGE.1).map(|v| i.font_size = v),
        _ => return None,
    };
    Some(result)
}

fn set_image_property(i: &mut ImageElement, input: &Input) -> Option<Result<(), PanelError>> {
    let result = match input.key {
        "opacity" => input.number(0.0, 100.0).map(|v| i.opacity = v / 100.0),
        "width" => input.number(50.0, 1280.0).map(|v| i.width = v),
        "height" => input.number(50.0, 720.0).map(|v| i.height = v),
        _ => return None,
    };
    Some(result)
}
