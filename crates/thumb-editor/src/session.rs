//! Editing session: the single context object behind one editor.
//!
//! The session owns the scene, the current frame and applied scale, the
//! interaction controller, and the font book that text fitting, layout
//! and rendering all measure with. The host forwards input and panel
//! edits; the controller turns gestures into [`SceneMutation`]s and the
//! session applies them.

use crate::controller::{Effect, InteractionController, SceneMutation, SceneView};
use crate::input::{EmulatedMouseFilter, InputEvent, TapTracker};
use crate::panel::{self, PanelAction, PanelError, PanelForm};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use thumb_core::css::{parse_background, parse_color};
use thumb_core::scale::{apply_fixed_text, initial_icon, initial_image, initial_shape, initial_text, rescale_free_elements};
use thumb_core::template::{GALLERY, NamedTemplate, apply_named_template};
use thumb_core::{
    Background, CanvasFrame, Color, CssError, DisplayLayout, ElementId, ElementKind, IconElement,
    IconKey, ImageElement, ImageSource, RemoveOutcome, RescaleMode, SceneElement, SceneGraph,
    ShapeElement, ShapeKind, Size, StartupParams, TemplateConfig, TextElement, TextMeasure,
    apply_template, canvas_frame, fit_single_line, resolve_layout, scale_factor,
    ICON_FONT_RANGE, SHAPE_LABEL_FONT_RANGE,
};
use thumb_render::export::PNG_MIME;
use thumb_render::{
    DecodeError, FontBook, HitTarget, Pixmap, RenderError, decode_bitmap, encode_png,
    export_file_name, hit_test, render_scene,
};

/// Content of a freshly added text element.
pub const NEW_TEXT: &str = "Double click to edit";
/// Label of a freshly added shape.
pub const NEW_SHAPE_LABEL: &str = "Text";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("image could not be decoded: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Background(#[from] CssError),
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error("an export is already running")]
    ExportBusy,
}

/// Session settings. Every field has a default, so any subset can be
/// given as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub rescale_mode: RescaleMode,
    pub text_color: String,
    pub shape_fill: String,
    pub icon_color: String,
    pub font_family: String,
    pub double_tap_ms: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            rescale_mode: RescaleMode::default(),
            text_color: "#FFFFFF".into(),
            shape_fill: "#FF0000".into(),
            icon_color: "#FFCC00".into(),
            font_family: thumb_render::fonts::DEFAULT_FAMILY.into(),
            double_tap_ms: crate::input::DOUBLE_TAP_MS,
        }
    }
}

fn config_color(value: &str, fallback: Color) -> Color {
    parse_color(value).unwrap_or_else(|e| {
        log::warn!("{e}; using {}", fallback.to_hex());
        fallback
    })
}

/// Result of one input event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputOutcome {
    /// The scene changed and needs re-projecting.
    pub changed: bool,
    pub effects: Vec<Effect>,
}

/// A finished export, ready to hand to the user as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub mime: &'static str,
}

/// Raises the export flag for its lifetime, however the export ends.
struct BusyGuard<'a>(&'a Cell<bool>);

impl<'a> BusyGuard<'a> {
    fn engage(flag: &'a Cell<bool>) -> Option<Self> {
        (!flag.replace(true)).then_some(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct EditorSession {
    scene: SceneGraph,
    frame: CanvasFrame,
    /// Scale at which stored free-element geometry is expressed.
    applied_scale: f32,
    initialized: bool,
    controller: InteractionController,
    taps: TapTracker,
    emulated_mouse: EmulatedMouseFilter,
    fonts: FontBook,
    config: EditorConfig,
    exporting: Cell<bool>,
}

impl EditorSession {
    pub fn new(config: EditorConfig, fonts: FontBook) -> Self {
        Self {
            scene: SceneGraph::new(),
            frame: CanvasFrame::default(),
            applied_scale: 1.0,
            initialized: false,
            controller: InteractionController::new(),
            taps: TapTracker::new(config.double_tap_ms),
            emulated_mouse: EmulatedMouseFilter::default(),
            fonts,
            config,
            exporting: Cell::new(false),
        }
    }

    /// A session measuring with the configured system font family, or the
    /// bundled faces when the host has none.
    pub fn with_system_fonts(config: EditorConfig) -> Self {
        let fonts = FontBook::system(&config.font_family);
        Self::new(config, fonts)
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn frame(&self) -> CanvasFrame {
        self.frame
    }

    pub fn scale(&self) -> f32 {
        self.applied_scale
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Swap the measurer. Existing text keeps its size until next refit.
    pub fn set_fonts(&mut self, fonts: FontBook) {
        self.fonts = fonts;
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.get()
    }

    fn measure(&self) -> &dyn TextMeasure {
        &self.fonts
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// First layout for `viewport_width`. Only the first call does
    /// anything; returns whether this was it.
    pub fn initialize(&mut self, viewport_width: f32) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        let s = scale_factor(viewport_width);
        self.frame = canvas_frame(viewport_width);
        apply_fixed_text(&mut self.scene, self.frame, s);
        let factor = self.config.rescale_mode.factor(self.applied_scale, s);
        rescale_free_elements(&mut self.scene, factor);
        self.applied_scale = s;
        log::debug!(
            "initialized at {viewport_width}px: frame {}x{}, scale {s}",
            self.frame.width,
            self.frame.height
        );
        true
    }

    /// Re-fit the frame, re-place the fixed text and rescale every other
    /// element for a new viewport width.
    pub fn on_viewport_resize(&mut self, viewport_width: f32) {
        if self.initialize(viewport_width) {
            return;
        }
        let s = scale_factor(viewport_width);
        self.frame = canvas_frame(viewport_width);
        apply_fixed_text(&mut self.scene, self.frame, s);
        let factor = self.config.rescale_mode.factor(self.applied_scale, s);
        rescale_free_elements(&mut self.scene, factor);
        self.applied_scale = s;
        log::debug!("viewport {viewport_width}px: scale {s}, factor {factor}");
    }

    // ─── Adding elements ─────────────────────────────────────────────────

    /// Add a text element sized for the current scale and select it.
    pub fn add_text(&mut self) -> ElementId {
        let (size, pos) = initial_text(self.applied_scale);
        let color = config_color(&self.config.text_color, Color::WHITE);
        let mut text = TextElement::new(NEW_TEXT, size, color);
        fit_single_line(&mut text, self.frame.width, self.measure());
        self.add_selected(ElementKind::Text(text), pos, pos)
    }

    pub fn add_shape(&mut self, shape: ShapeKind) -> ElementId {
        let (pos, size) = initial_shape(shape, self.applied_scale);
        let (lo, hi) = SHAPE_LABEL_FONT_RANGE;
        let kind = ElementKind::Shape(ShapeElement {
            shape,
            width: size.width,
            height: size.height,
            fill: config_color(&self.config.shape_fill, Color::rgba(1.0, 0.0, 0.0, 1.0)),
            label: Some(NEW_SHAPE_LABEL.into()),
            label_color: Color::WHITE,
            label_size: 24.0_f32.clamp(lo, hi),
        });
        self.add_selected(kind, pos, pos)
    }

    pub fn add_icon(&mut self, icon: IconKey) -> ElementId {
        let (size, pos) = initial_icon(self.applied_scale);
        let kind = ElementKind::Icon(IconElement {
            icon,
            color: config_color(&self.config.icon_color, Color::rgba(1.0, 0.8, 0.0, 1.0)),
            font_size: size,
        });
        self.add_selected(kind, pos, pos)
    }

    /// Decode an uploaded image and add it. A decode failure leaves the
    /// scene unchanged.
    pub fn add_image_bytes(&mut self, bytes: &[u8]) -> Result<ElementId, SessionError> {
        let bitmap = decode_bitmap(bytes)?;
        let (pos, size) = initial_image(bitmap.width, bitmap.height, self.applied_scale);
        let kind = ElementKind::Image(ImageElement {
            source: ImageSource::Bitmap(bitmap),
            width: size.width,
            height: size.height,
            opacity: 1.0,
        });
        Ok(self.add_selected(kind, pos, pos))
    }

    fn add_selected(&mut self, kind: ElementKind, x: f32, y: f32) -> ElementId {
        let id = self.scene.add_element(SceneElement::free(kind, x, y));
        self.scene.set_selected(Some(id));
        id
    }

    /// Replace the content of a text element, refitting it.
    pub fn set_text_content(&mut self, id: ElementId, content: &str) -> bool {
        self.apply_mutation(SceneMutation::SetText {
            id,
            content: content.to_string(),
        })
    }

    pub fn select(&mut self, id: Option<ElementId>) -> Option<ElementId> {
        self.scene.set_selected(id)
    }

    // ─── Background and templates ────────────────────────────────────────

    pub fn set_background(&mut self, background: Background) {
        self.scene.set_background(background);
    }

    /// `kind` is `"color"` or `"gradient"`. An invalid value leaves the
    /// background as it was.
    pub fn set_background_css(&mut self, kind: &str, value: &str) -> Result<(), SessionError> {
        let background = parse_background(kind, value)?;
        self.scene.set_background(background);
        Ok(())
    }

    pub fn set_background_image_bytes(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let bitmap = decode_bitmap(bytes)?;
        self.scene
            .set_background(Background::Image(ImageSource::Bitmap(bitmap)));
        Ok(())
    }

    pub fn apply_template(&mut self, template: &TemplateConfig) -> Result<(), SessionError> {
        apply_template(&mut self.scene, template)?;
        self.after_clear();
        Ok(())
    }

    /// Apply a template by URL key or gallery name. Unknown keys are
    /// ignored; returns whether a template was applied.
    pub fn apply_template_key(&mut self, key: &str) -> Result<bool, SessionError> {
        if let Some(named) = NamedTemplate::lookup(key) {
            apply_named_template(&mut self.scene, named)?;
        } else if let Some(entry) = GALLERY.iter().find(|t| t.name.eq_ignore_ascii_case(key)) {
            apply_template(&mut self.scene, &entry.config())?;
        } else {
            log::warn!("ignoring unknown template {key:?}");
            return Ok(false);
        }
        self.after_clear();
        Ok(true)
    }

    /// Consume the start-up parameters of `location`, applying the
    /// requested template. An unparsable location is ignored. Gesture and
    /// tap state is only reset when a template replaced the scene.
    pub fn apply_startup(&mut self, location: &str) -> Option<StartupParams> {
        let params = match StartupParams::from_location(location) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("ignoring start-up location {location:?}: {e}");
                return None;
            }
        };
        if let Some(template) = params.template {
            match apply_named_template(&mut self.scene, template) {
                Ok(()) => self.after_clear(),
                Err(e) => log::warn!("template {} not applied: {e}", template.key),
            }
        }
        Some(params)
    }

    /// Gestures on removed elements cannot continue.
    fn after_clear(&mut self) {
        self.controller = InteractionController::new();
        self.taps.reset();
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn layout(&self) -> DisplayLayout {
        resolve_layout(&self.scene, self.frame, self.measure())
    }

    pub fn hit_test(&self, x: f32, y: f32) -> HitTarget {
        hit_test(&self.scene, &self.layout(), x, y)
    }

    /// Feed one input event through the controller and apply the result.
    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        if !self.emulated_mouse.admit(&event) {
            log::trace!("dropped emulated mouse event {event:?}");
            return InputOutcome::default();
        }
        let layout = self.layout();
        let hit = event
            .position()
            .map(|(x, y)| hit_test(&self.scene, &layout, x, y))
            .unwrap_or(HitTarget::Canvas);

        let event = match event {
            InputEvent::Tap { x, y, time_ms } => match hit.element() {
                Some(id) if self.taps.tap(id, time_ms) => InputEvent::DoubleActivate { x, y },
                Some(_) => return InputOutcome::default(),
                None => {
                    self.taps.reset();
                    return InputOutcome::default();
                }
            },
            other => other,
        };

        let view = SceneView {
            scene: &self.scene,
            geometry: &layout,
        };
        let reaction = self.controller.handle(&event, hit, &view);

        let mut changed = false;
        for mutation in reaction.mutations {
            changed |= self.apply_mutation(mutation);
        }
        InputOutcome {
            changed,
            effects: reaction.effects,
        }
    }

    /// Write one controller mutation into the scene.
    fn apply_mutation(&mut self, mutation: SceneMutation) -> bool {
        let frame_width = self.frame.width;
        let measure: &dyn TextMeasure = &self.fonts;

        match mutation {
            SceneMutation::Select(id) => {
                self.scene.set_selected(id);
                true
            }
            SceneMutation::MoveTo { id, x, y } => match self.scene.get_mut(id) {
                Some(el) => {
                    el.x = x;
                    el.y = y;
                    true
                }
                None => false,
            },
            SceneMutation::Resize { id, width, height } => {
                let Some(el) = self.scene.get_mut(id) else {
                    return false;
                };
                match &mut el.kind {
                    ElementKind::Shape(s) => {
                        s.width = width;
                        s.height = height;
                        s.label_size = width.min(height) / 3.0;
                    }
                    ElementKind::Image(i) => {
                        i.width = width;
                        i.height = height;
                    }
                    ElementKind::Text(t) => {
                        t.box_size = Some(Size { width, height });
                        fit_single_line(t, frame_width, measure);
                    }
                    ElementKind::Icon(i) => {
                        // Icons have no box: the drag height becomes the line
                        // height and the width is ignored.
                        let (lo, hi) = ICON_FONT_RANGE;
                        i.font_size = (height / measure.line_height(1.0)).clamp(lo, hi);
                    }
                }
                true
            }
            SceneMutation::SetText { id, content } => {
                let Some(t) = self.scene.get_mut(id).and_then(|el| el.as_text_mut()) else {
                    return false;
                };
                t.content = content;
                fit_single_line(t, frame_width, measure);
                true
            }
            SceneMutation::SetLabel { id, label } => match self.scene.get_mut(id).map(|el| &mut el.kind) {
                Some(ElementKind::Shape(s)) => {
                    s.label = Some(label);
                    true
                }
                _ => false,
            },
        }
    }

    // ─── Properties panel ────────────────────────────────────────────────

    pub fn panel(&self) -> PanelForm {
        panel::build_panel(&self.scene)
    }

    /// Write a panel input into the selected element.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let id = self.scene.selected().ok_or(PanelError::NoSelection)?;
        let frame_width = self.frame.width;
        let measure: &dyn TextMeasure = &self.fonts;
        let el = self.scene.get_mut(id).ok_or(PanelError::NoSelection)?;
        panel::set_property(el, key, value, frame_width, measure)?;
        Ok(())
    }

    pub fn panel_action(&mut self, action: PanelAction) -> Result<(), SessionError> {
        let id = self.scene.selected().ok_or(PanelError::NoSelection)?;
        match action {
            PanelAction::Delete => match self.scene.remove_element(id) {
                RemoveOutcome::Removed => {
                    self.controller.forget(id);
                    Ok(())
                }
                RemoveOutcome::Fixed => Err(PanelError::FixedElement(id).into()),
                RemoveOutcome::Missing => Err(PanelError::NoSelection.into()),
            },
            PanelAction::MakeFullScreen => {
                let frame = self.frame;
                let Some(el) = self.scene.get_mut(id) else {
                    return Err(PanelError::NoSelection.into());
                };
                let ElementKind::Image(img) = &mut el.kind else {
                    return Err(PanelError::NotAnImage(id).into());
                };
                img.width = frame.width;
                img.height = frame.height;
                el.x = 0.0;
                el.y = 0.0;
                Ok(())
            }
            PanelAction::SetAsBackground => {
                let source = match self.scene.get(id).map(|el| &el.kind) {
                    Some(ElementKind::Image(img)) => img.source.clone(),
                    _ => return Err(PanelError::NotAnImage(id).into()),
                };
                self.scene.set_background(Background::Image(source));
                self.scene.remove_element(id);
                self.controller.forget(id);
                Ok(())
            }
        }
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Rasterise the scene at the current frame.
    pub fn render(&self) -> Result<Pixmap, RenderError> {
        render_scene(&self.scene, self.frame, &self.layout(), &self.fonts)
    }

    /// Render and encode a PNG download. Broken images are left out
    /// rather than failing the export.
    pub fn export(&self) -> Result<ExportedImage, SessionError> {
        let _busy = BusyGuard::engage(&self.exporting).ok_or(SessionError::ExportBusy)?;
        let pixmap = self.render()?;
        let bytes = encode_png(&pixmap)?;
        let (width, height) = (pixmap.width(), pixmap.height());
        log::debug!("exported {width}x{height}, {} bytes", bytes.len());
        Ok(ExportedImage {
            bytes,
            width,
            height,
            file_name: export_file_name(width, height),
            mime: PNG_MIME,
        })
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default(), FontBook::bundled())
    }
}
