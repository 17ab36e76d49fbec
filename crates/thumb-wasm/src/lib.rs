//! WASM bridge for Thumbnail Studio: exposes the editing session to
//! JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page projects
//! [`ThumbEditor::get_layout_json`] into the DOM, forwards pointer, touch
//! and keyboard events, and turns [`ThumbEditor::export_png`] into a
//! download.

mod projection;

use js_sys::{Object, Reflect, Uint8Array};
use thumb_core::registry::shapes;
use thumb_core::simple::FormPart;
use thumb_core::template::{GALLERY, NAMED_TEMPLATES};
use thumb_core::{
    Background, EditorMode, ElementId, ElementKind, IconKey, ShapeKind, SimpleForm,
    TemplateConfig, interpret_response,
};
use thumb_editor::{
    EditorConfig, EditorSession, InputEvent, InputOutcome, PanelAction, TouchPhase, TouchPoint,
};
use thumb_render::bitmap::resolve_source;
use thumb_render::export::to_straight_rgba;
use thumb_render::FontBook;
use wasm_bindgen::prelude::*;

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn outcome_json(outcome: &InputOutcome) -> String {
    serde_json::to_string(outcome).unwrap_or_else(|_| r#"{"changed":false,"effects":[]}"#.into())
}

/// The WASM-facing editor. One instance per editor surface.
#[wasm_bindgen]
pub struct ThumbEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl ThumbEditor {
    /// Create an editor from a JSON `EditorConfig`. Missing fields (or an
    /// empty string) take their defaults. Text uses the bundled faces until
    /// [`load_font`](Self::load_font) supplies another.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<ThumbEditor, JsValue> {
        console_error_panic_hook_setup();

        let config: EditorConfig = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(to_js)?
        };
        Ok(Self {
            session: EditorSession::new(config, FontBook::bundled()),
        })
    }

    /// Measure and draw text with the given font file (TTF/OTF bytes).
    /// Glyphs it lacks come from the bundled faces. Returns `false` if the
    /// font could not be parsed.
    pub fn load_font(&mut self, data: &[u8]) -> bool {
        match FontBook::from_font_data(data.to_vec()) {
            Ok(fonts) => {
                self.session.set_fonts(fonts);
                true
            }
            Err(e) => {
                log::warn!("font rejected: {e}");
                false
            }
        }
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// First layout. Returns `false` if already initialized.
    pub fn initialize(&mut self, viewport_width: f32) -> bool {
        self.session.initialize(viewport_width)
    }

    /// Viewport width changed.
    pub fn resize(&mut self, viewport_width: f32) {
        self.session.on_viewport_resize(viewport_width);
    }

    // ─── Input ───────────────────────────────────────────────────────────
    //
    // Every handler returns the `InputOutcome` as JSON:
    // `{"changed":bool,"effects":[{"effect":"...", ...}]}`.

    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::from_pointer_down(x, y))
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::from_pointer_move(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::from_pointer_up(x, y))
    }

    /// Touch event. `phase` is `"start"`, `"move"` or `"end"`; `coords`
    /// holds the touches as flat `x, y` pairs, first touch first.
    pub fn handle_touch(&mut self, phase: &str, coords: &[f32]) -> String {
        let phase = match phase {
            "start" => TouchPhase::Start,
            "move" => TouchPhase::Move,
            "end" => TouchPhase::End,
            other => {
                log::warn!("unknown touch phase {other:?}");
                return outcome_json(&InputOutcome::default());
            }
        };
        let touches: Vec<TouchPoint> = coords
            .chunks_exact(2)
            .map(|p| TouchPoint { x: p[0], y: p[1] })
            .collect();
        match InputEvent::from_touches(phase, &touches) {
            Some(event) => self.dispatch(event),
            None => outcome_json(&InputOutcome::default()),
        }
    }

    /// A finished tap; two on the same element within the double-tap
    /// window act as a double click.
    pub fn handle_tap(&mut self, x: f32, y: f32, time_ms: f64) -> String {
        self.dispatch(InputEvent::Tap { x, y, time_ms })
    }

    pub fn handle_double_click(&mut self, x: f32, y: f32) -> String {
        self.dispatch(InputEvent::DoubleActivate { x, y })
    }

    /// Content of the element being edited in place changed.
    pub fn handle_text_input(&mut self, content: &str) -> String {
        self.dispatch(InputEvent::TextInput {
            content: content.to_string(),
        })
    }

    pub fn handle_focus_lost(&mut self) -> String {
        self.dispatch(InputEvent::FocusLost)
    }

    /// The label prompt closed. `undefined` means it was cancelled.
    pub fn resolve_modal(&mut self, value: Option<String>) -> String {
        self.dispatch(InputEvent::ModalResolved { value })
    }

    fn dispatch(&mut self, event: InputEvent) -> String {
        outcome_json(&self.session.handle_input(event))
    }

    // ─── Projection and panel ────────────────────────────────────────────

    /// Frame, background and every element's display box and style.
    pub fn get_layout_json(&self) -> String {
        projection::project(&self.session).to_string()
    }

    /// Form descriptor for the current selection (or the placeholder).
    pub fn get_panel_json(&self) -> String {
        serde_json::to_string(&self.session.panel()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Write a panel input into the selected element.
    /// Returns `false` if the key or value was rejected.
    pub fn set_property(&mut self, key: &str, value: &str) -> bool {
        match self.session.set_property(key, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{key} = {value:?} rejected: {e}");
                false
            }
        }
    }

    /// Run a panel button: `"delete"`, `"make-full-screen"` or
    /// `"set-as-background"`.
    pub fn panel_action(&mut self, action: &str) -> Result<(), JsValue> {
        let action = PanelAction::from_key(action)
            .ok_or_else(|| to_js(format!("unknown panel action {action:?}")))?;
        self.session.panel_action(action).map_err(to_js)
    }

    /// Select an element by id; an empty id clears the selection.
    /// Returns `true` if the selection now matches the request.
    pub fn select_by_id(&mut self, element_id: &str) -> bool {
        if element_id.is_empty() {
            self.session.select(None);
            return true;
        }
        match ElementId::lookup(element_id).filter(|id| self.session.scene().contains(*id)) {
            Some(id) => {
                self.session.select(Some(id));
                true
            }
            None => false,
        }
    }

    pub fn selected_id(&self) -> Option<String> {
        self.session.scene().selected().map(|id| id.as_str().to_string())
    }

    // ─── Adding elements ─────────────────────────────────────────────────

    /// Returns the new element's id.
    pub fn add_text(&mut self) -> String {
        self.session.add_text().as_str().to_string()
    }

    /// `shape` is a shape registry key such as `"rectangle"`.
    pub fn add_shape(&mut self, shape: &str) -> Result<String, JsValue> {
        let kind = ShapeKind::from_key(shape).ok_or_else(|| to_js(format!("unknown shape {shape:?}")))?;
        Ok(self.session.add_shape(kind).as_str().to_string())
    }

    /// Unknown icon keys fall back to the default icon.
    pub fn add_icon(&mut self, icon: &str) -> String {
        self.session.add_icon(IconKey::resolve(icon)).as_str().to_string()
    }

    /// Add an uploaded image. Errors leave the scene unchanged.
    pub fn add_image(&mut self, bytes: &[u8]) -> Result<String, JsValue> {
        let id = self.session.add_image_bytes(bytes).map_err(to_js)?;
        Ok(id.as_str().to_string())
    }

    // ─── Background and templates ────────────────────────────────────────

    /// `kind` is `"color"` or `"gradient"`.
    pub fn set_background(&mut self, kind: &str, value: &str) -> Result<(), JsValue> {
        self.session.set_background_css(kind, value).map_err(to_js)
    }

    pub fn set_background_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.session.set_background_image_bytes(bytes).map_err(to_js)
    }

    /// Apply `{"background": "...", "type": "color" | "gradient"}`.
    pub fn apply_template_json(&mut self, json: &str) -> Result<(), JsValue> {
        let template: TemplateConfig = serde_json::from_str(json).map_err(to_js)?;
        self.session.apply_template(&template).map_err(to_js)
    }

    /// Apply a template by URL key or gallery name. Returns `false` for
    /// unknown names.
    pub fn apply_template(&mut self, key: &str) -> bool {
        match self.session.apply_template_key(key) {
            Ok(applied) => applied,
            Err(e) => {
                log::warn!("template {key:?} not applied: {e}");
                false
            }
        }
    }

    /// Consume the start-up parameters in `location` (the full page URL).
    /// Returns `{"mode": "simple" | "advanced", "template": key | null,
    /// "cleanedLocation": path | null}`, or `{}` if the URL did not parse.
    pub fn apply_startup(&mut self, location: &str) -> String {
        let Some(params) = self.session.apply_startup(location) else {
            return "{}".to_string();
        };
        let mode = match params.mode {
            EditorMode::Simple => "simple",
            EditorMode::Advanced => "advanced",
        };
        serde_json::json!({
            "mode": mode,
            "template": params.template.map(|t| t.key),
            "cleanedLocation": params.cleaned_location,
        })
        .to_string()
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Render and encode the export. Resolves to
    /// `{bytes: Uint8Array, fileName, mime, width, height}`.
    pub fn export_png(&self) -> Result<Object, JsValue> {
        let exported = self.session.export().map_err(to_js)?;
        let out = Object::new();
        Reflect::set(&out, &"bytes".into(), &Uint8Array::from(exported.bytes.as_slice()))?;
        Reflect::set(&out, &"fileName".into(), &exported.file_name.into())?;
        Reflect::set(&out, &"mime".into(), &exported.mime.into())?;
        Reflect::set(&out, &"width".into(), &exported.width.into())?;
        Reflect::set(&out, &"height".into(), &exported.height.into())?;
        Ok(out)
    }

    pub fn is_exporting(&self) -> bool {
        self.session.is_exporting()
    }

    /// Straight-alpha RGBA of the rendered frame, for an `ImageData` preview.
    pub fn render_rgba(&self) -> Result<Uint8Array, JsValue> {
        let pixmap = self.session.render().map_err(to_js)?;
        Ok(Uint8Array::from(to_straight_rgba(&pixmap).as_slice()))
    }

    /// Pixels of an image element, straight RGBA at natural size.
    pub fn image_rgba(&self, element_id: &str) -> Option<Uint8Array> {
        let id = ElementId::lookup(element_id)?;
        match &self.session.scene().get(id)?.kind {
            ElementKind::Image(img) => bitmap_rgba(&img.source),
            _ => None,
        }
    }

    /// Pixels of an image background, straight RGBA at natural size.
    pub fn background_rgba(&self) -> Option<Uint8Array> {
        match self.session.scene().background() {
            Background::Image(source) => bitmap_rgba(source),
            _ => None,
        }
    }
}

fn bitmap_rgba(source: &thumb_core::ImageSource) -> Option<Uint8Array> {
    match resolve_source(source) {
        Ok(bitmap) => Some(Uint8Array::from(&bitmap.pixels[..])),
        Err(e) => {
            log::warn!("image not available: {e}");
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    fn console_error(msg: &str);
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                console_error(&format!("Thumbnail Studio WASM panic: {info}"));
            }));
        });
    }
}

// ─── Standalone registry functions (no editor needed) ────────────────────

/// Template gallery: `[{"name", "background", "type"}]`.
#[wasm_bindgen]
pub fn gallery_json() -> String {
    let entries: Vec<serde_json::Value> = GALLERY
        .iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "background": t.background,
                "type": t.kind,
            })
        })
        .collect();
    serde_json::Value::Array(entries).to_string()
}

/// URL-addressable templates with their text colors.
#[wasm_bindgen]
pub fn named_templates_json() -> String {
    let entries: Vec<serde_json::Value> = NAMED_TEMPLATES
        .iter()
        .map(|t| {
            serde_json::json!({
                "key": t.key,
                "name": t.name,
                "background": t.background,
                "type": t.kind,
                "titleColor": t.title_color,
                "subtitleColor": t.subtitle_color,
            })
        })
        .collect();
    serde_json::Value::Array(entries).to_string()
}

/// Icon picker entries: `[{"key", "label", "glyph"}]`.
#[wasm_bindgen]
pub fn icons_json() -> String {
    let entries: Vec<serde_json::Value> = IconKey::all()
        .map(|icon| {
            serde_json::json!({
                "key": icon.key(),
                "label": icon.label(),
                "glyph": icon.emoji(),
            })
        })
        .collect();
    serde_json::Value::Array(entries).to_string()
}

/// Shape picker entries: `[{"key", "label"}]`.
#[wasm_bindgen]
pub fn shapes_json() -> String {
    let entries: Vec<serde_json::Value> = shapes()
        .map(|(key, label)| serde_json::json!({ "key": key, "label": label }))
        .collect();
    serde_json::Value::Array(entries).to_string()
}

// ─── Simple mode ─────────────────────────────────────────────────────────

/// Text fields of the simple-mode upload form, in submission order, as
/// `[{"name", "value"}]`. `form_json` holds any subset of the form's
/// fields; `template_key` (may be empty) presets colors from a named
/// template first. The host appends the background file itself.
#[wasm_bindgen]
pub fn simple_form_fields(form_json: &str, template_key: &str) -> Result<String, JsValue> {
    let mut form: SimpleForm = if form_json.trim().is_empty() {
        SimpleForm::default()
    } else {
        serde_json::from_str(form_json).map_err(to_js)?
    };
    if let Some(template) = thumb_core::template::NamedTemplate::lookup(template_key) {
        form.apply_template(template);
    }
    let fields: Vec<serde_json::Value> = form
        .parts()
        .into_iter()
        .filter_map(|part| match part {
            FormPart::Text { name, value } => Some(serde_json::json!({ "name": name, "value": value })),
            FormPart::File { .. } => None,
        })
        .collect();
    Ok(serde_json::Value::Array(fields).to_string())
}

/// Check the upload endpoint's response; yields the PNG to download.
#[wasm_bindgen]
pub fn simple_mode_result(status: u16, body: Vec<u8>) -> Result<Uint8Array, JsValue> {
    let bytes = interpret_response(status, body).map_err(to_js)?;
    Ok(Uint8Array::from(bytes.as_slice()))
}

#[wasm_bindgen]
pub fn simple_download_name() -> String {
    thumb_core::simple::SIMPLE_DOWNLOAD_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> serde_json::Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn registries_serialize() {
        assert_eq!(parse(&gallery_json()).as_array().unwrap().len(), 20);
        assert_eq!(parse(&named_templates_json())[0]["key"], "bold-red");
        assert_eq!(parse(&shapes_json())[0]["key"], "rectangle");
        assert!(!parse(&icons_json()).as_array().unwrap().is_empty());
    }

    #[test]
    fn gallery_entries_are_valid_templates() {
        for entry in parse(&gallery_json()).as_array().unwrap() {
            let config: TemplateConfig = serde_json::from_value(entry.clone()).unwrap();
            assert!(config.parse_background().is_ok(), "{}", config.background);
        }
    }

    #[test]
    fn simple_form_takes_template_colors() {
        let fields = parse(&simple_form_fields(r#"{"title":"Hi"}"#, "bright-yellow").unwrap());
        let value = |name: &str| {
            fields
                .as_array()
                .unwrap()
                .iter()
                .find(|f| f["name"] == name)
                .map(|f| f["value"].clone())
        };
        assert_eq!(value("title"), Some("Hi".into()));
        assert_eq!(value("bg_color"), Some("#FFCC00".into()));
        assert_eq!(value("text_color"), Some("#000000".into()));
        assert_eq!(value("shadow_enabled"), None);
    }

    #[test]
    fn editor_round_trip_through_json() {
        let mut editor = ThumbEditor::new(r#"{"rescaleMode":"compounding"}"#).unwrap();
        assert!(editor.initialize(1280.0));
        let id = editor.add_shape("rhombus").unwrap();
        assert_eq!(editor.selected_id(), Some(id.clone()));

        let panel = parse(&editor.get_panel_json());
        assert_eq!(panel["element"], id.as_str());
        assert!(editor.set_property("width", "300"));
        assert!(!editor.set_property("nope", "1"));

        let outcome = parse(&editor.handle_pointer_down(1200.0, 650.0));
        assert_eq!(outcome["changed"], false);
        let outcome = parse(&editor.handle_pointer_up(1200.0, 650.0));
        assert_eq!(outcome["effects"][0]["effect"], "clear-panel");
        assert_eq!(editor.selected_id(), None);

        assert!(editor.select_by_id(&id));
        assert!(!editor.select_by_id("shape_missing"));
        assert!(editor.select_by_id(""));
    }
}
