//! Interaction controller: pointer gestures → scene mutations.
//!
//! The controller is a state machine over [`InputEvent`]s. It reads the
//! scene and the display layout but never writes to them; every change is
//! returned as a [`SceneMutation`] for the session to apply, alongside the
//! [`Effect`]s the host has to carry out (prompting, panel refreshes).
//!
//! | State                | Left by                                   |
//! |----------------------|-------------------------------------------|
//! | `Idle`               | pointer-down on an element or a handle    |
//! | `Dragging`           | pointer-up                                |
//! | `Resizing`           | pointer-up                                |
//! | `Editing`            | focus lost, pointer-down elsewhere        |
//! | `AwaitingModalInput` | the prompt resolving                      |

use crate::input::InputEvent;
use serde::Serialize;
use thumb_core::{ElementId, ElementKind, MeasuredGeometry, SceneGraph, Size};
use thumb_render::HitTarget;

/// Smallest side a resize-handle drag can produce.
pub const MIN_RESIZE: f32 = 30.0;

/// A change to apply to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneMutation {
    Select(Option<ElementId>),
    /// Set the stored position (centre x for Title/Subtitle).
    MoveTo { id: ElementId, x: f32, y: f32 },
    /// New box from a resize-handle drag.
    Resize {
        id: ElementId,
        width: f32,
        height: f32,
    },
    SetText { id: ElementId, content: String },
    SetLabel { id: ElementId, label: String },
}

/// Something the host must do in response to input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum Effect {
    /// Ask for a replacement shape label; answer with
    /// [`InputEvent::ModalResolved`].
    PromptShapeLabel {
        element: ElementId,
        current_label: String,
    },
    /// Make the text element editable in place and focus it.
    BeginTextEdit { element: ElementId },
    RefreshPanel,
    ClearPanel,
}

/// What one event produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    pub mutations: Vec<SceneMutation>,
    pub effects: Vec<Effect>,
}

impl Reaction {
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty() && self.effects.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Dragging {
        element: ElementId,
        pointer_origin: (f32, f32),
        element_origin: (f32, f32),
    },
    Resizing {
        element: ElementId,
        pointer_origin: (f32, f32),
        start_size: Size,
    },
    Editing {
        element: ElementId,
    },
    AwaitingModalInput {
        element: ElementId,
        current_label: String,
    },
}

/// Read-only view of the scene the controller decides against.
pub struct SceneView<'a> {
    pub scene: &'a SceneGraph,
    pub geometry: &'a dyn MeasuredGeometry,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: ControllerState,
    /// Pointer went down on the empty canvas and has not come up yet.
    canvas_press: bool,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// True while a drag, resize or prompt owns the input.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            ControllerState::Dragging { .. }
                | ControllerState::Resizing { .. }
                | ControllerState::AwaitingModalInput { .. }
        )
    }

    /// Drop any state tied to `id` (after it left the scene).
    pub fn forget(&mut self, id: ElementId) {
        let owned = match &self.state {
            ControllerState::Idle => false,
            ControllerState::Dragging { element, .. }
            | ControllerState::Resizing { element, .. }
            | ControllerState::Editing { element }
            | ControllerState::AwaitingModalInput { element, .. } => *element == id,
        };
        if owned {
            self.state = ControllerState::Idle;
        }
    }

    /// Handle one event. `hit` is what lies under the event position.
    pub fn handle(&mut self, event: &InputEvent, hit: HitTarget, view: &SceneView) -> Reaction {
        let mut out = Reaction::default();

        if let ControllerState::AwaitingModalInput { element, .. } = self.state {
            // The prompt is modal: nothing else gets through.
            if let InputEvent::ModalResolved { value } = event {
                if let Some(label) = value {
                    out.mutations.push(SceneMutation::SetLabel {
                        id: element,
                        label: label.clone(),
                    });
                    out.effects.push(Effect::RefreshPanel);
                }
                self.state = ControllerState::Idle;
            }
            return out;
        }

        match event {
            InputEvent::PointerDown { x, y, .. } => self.pointer_down((*x, *y), hit, view, &mut out),
            InputEvent::PointerMove { x, y, .. } => self.pointer_move((*x, *y), &mut out),
            InputEvent::PointerUp { .. } => self.pointer_up(hit, &mut out),
            InputEvent::DoubleActivate { .. } => self.double_activate(hit, view, &mut out),
            InputEvent::TextInput { content } => {
                if let ControllerState::Editing { element } = self.state {
                    out.mutations.push(SceneMutation::SetText {
                        id: element,
                        content: content.clone(),
                    });
                }
            }
            InputEvent::FocusLost => {
                if let ControllerState::Editing { .. } = self.state {
                    self.state = ControllerState::Idle;
                    out.effects.push(Effect::RefreshPanel);
                }
            }
            // Taps are paired by the session before reaching here.
            InputEvent::Tap { .. } | InputEvent::ModalResolved { .. } => {}
        }
        out
    }

    fn pointer_down(&mut self, at: (f32, f32), hit: HitTarget, view: &SceneView, out: &mut Reaction) {
        match self.state {
            ControllerState::Idle => {}
            ControllerState::Editing { element } => {
                if hit.element() == Some(element) {
                    // Caret placement inside the field being edited.
                    return;
                }
                self.state = ControllerState::Idle;
                out.effects.push(Effect::RefreshPanel);
            }
            // Exclusive until pointer-up.
            _ => return,
        }

        self.canvas_press = false;
        match hit {
            HitTarget::ResizeHandle(id) => {
                let Some(start_size) = current_size(id, view) else {
                    return;
                };
                log::trace!("resize {id} from {}x{}", start_size.width, start_size.height);
                self.state = ControllerState::Resizing {
                    element: id,
                    pointer_origin: at,
                    start_size,
                };
            }
            HitTarget::Element(id) => {
                let Some(el) = view.scene.get(id) else {
                    return;
                };
                log::trace!("drag {id} from ({}, {})", el.x, el.y);
                self.state = ControllerState::Dragging {
                    element: id,
                    pointer_origin: at,
                    element_origin: (el.x, el.y),
                };
                out.mutations.push(SceneMutation::Select(Some(id)));
                out.effects.push(Effect::RefreshPanel);
            }
            HitTarget::Canvas => self.canvas_press = true,
        }
    }

    fn pointer_move(&mut self, at: (f32, f32), out: &mut Reaction) {
        match self.state {
            ControllerState::Dragging {
                element,
                pointer_origin: (px, py),
                element_origin: (ex, ey),
            } => {
                // No clamping: elements may leave the frame.
                out.mutations.push(SceneMutation::MoveTo {
                    id: element,
                    x: ex + (at.0 - px),
                    y: ey + (at.1 - py),
                });
            }
            ControllerState::Resizing {
                element,
                pointer_origin: (px, py),
                start_size,
            } => {
                out.mutations.push(SceneMutation::Resize {
                    id: element,
                    width: (start_size.width + (at.0 - px)).max(MIN_RESIZE),
                    height: (start_size.height + (at.1 - py)).max(MIN_RESIZE),
                });
                out.effects.push(Effect::RefreshPanel);
            }
            _ => {}
        }
    }

    fn pointer_up(&mut self, hit: HitTarget, out: &mut Reaction) {
        match self.state {
            ControllerState::Dragging { .. } | ControllerState::Resizing { .. } => {
                // The release ends the gesture; it is never an empty-canvas click.
                self.state = ControllerState::Idle;
            }
            ControllerState::Idle if self.canvas_press && hit == HitTarget::Canvas => {
                out.mutations.push(SceneMutation::Select(None));
                out.effects.push(Effect::ClearPanel);
            }
            _ => {}
        }
        self.canvas_press = false;
    }

    fn double_activate(&mut self, hit: HitTarget, view: &SceneView, out: &mut Reaction) {
        if !matches!(self.state, ControllerState::Idle) {
            return;
        }
        let Some(el) = hit.element().and_then(|id| view.scene.get(id)) else {
            return;
        };
        match &el.kind {
            ElementKind::Text(_) => {
                self.state = ControllerState::Editing { element: el.id };
                out.mutations.push(SceneMutation::Select(Some(el.id)));
                out.effects.push(Effect::BeginTextEdit { element: el.id });
                out.effects.push(Effect::RefreshPanel);
            }
            ElementKind::Shape(s) => {
                let current_label = s.label.clone().unwrap_or_default();
                self.state = ControllerState::AwaitingModalInput {
                    element: el.id,
                    current_label: current_label.clone(),
                };
                out.effects.push(Effect::PromptShapeLabel {
                    element: el.id,
                    current_label,
                });
            }
            ElementKind::Icon(_) | ElementKind::Image(_) => {}
        }
    }
}

/// Stored box if the element has one, else its display box.
fn current_size(id: ElementId, view: &SceneView) -> Option<Size> {
    let el = view.scene.get(id)?;
    el.stored_size().or_else(|| {
        view.geometry.bounds_of(id).map(|b| Size {
            width: b.width,
            height: b.height,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerSource;
    use pretty_assertions::assert_eq;
    use thumb_core::{
        CanvasFrame, Color, DisplayLayout, EstimatedMetrics, SceneElement, ShapeElement, ShapeKind,
        TextElement, resolve_layout,
    };

    fn scene_with_shape() -> (SceneGraph, ElementId) {
        let mut scene = SceneGraph::new();
        let id = scene.add_element(SceneElement::free(
            ElementKind::Shape(ShapeElement {
                shape: ShapeKind::Rectangle,
                width: 180.0,
                height: 120.0,
                fill: Color::BLACK,
                label: Some("Text".into()),
                label_color: Color::WHITE,
                label_size: 24.0,
            }),
            140.0,
            140.0,
        ));
        (scene, id)
    }

    fn layout(scene: &SceneGraph) -> DisplayLayout {
        resolve_layout(scene, CanvasFrame::default(), &EstimatedMetrics)
    }

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerDown {
            x,
            y,
            source: PointerSource::Mouse,
        }
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMove {
            x,
            y,
            source: PointerSource::Mouse,
        }
    }

    fn up(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerUp {
            x,
            y,
            source: PointerSource::Mouse,
        }
    }

    // ─── Drag ────────────────────────────────────────────────────────────

    #[test]
    fn drag_moves_by_pointer_delta() {
        let (scene, id) = scene_with_shape();
        let geometry = layout(&scene);
        let view = SceneView {
            scene: &scene,
            geometry: &geometry,
        };
        let mut ctl = InteractionController::new();

        let r = ctl.handle(&down(150.0, 150.0), HitTarget::Element(id), &view);
        assert_eq!(r.mutations, vec![SceneMutation::Select(Some(id))]);
        assert!(ctl.is_busy());

        // Deltas are from the gesture start, not the previous move.
        ctl.handle(&moved(160.0, 155.0), HitTarget::Element(id), &view);
        let r = ctl.handle(&moved(2000.0, 150.0), HitTarget::Canvas, &view);
        assert_eq!(
            r.mutations,
            vec![SceneMutation::MoveTo {
                id,
                x: 1990.0,
                y: 140.0
            }]
        );

        let r = ctl.handle(&up(2000.0, 150.0), HitTarget::Canvas, &view);
        assert!(r.is_empty(), "end of drag is not a canvas click");
        assert_eq!(ctl.state(), &ControllerState::Idle);
    }

    #[test]
    fn pointer_down_during_drag_is_ignored() {
        let (mut scene, a) = scene_with_shape();
        let b = scene.add_element(SceneElement::free(
            ElementKind::Text(TextElement::new("b", 20.0, Color::WHITE)),
            600.0,
            600.0,
        ));
        let geometry = layout(&scene);
        let view = SceneView {
            scene: &scene,
            geometry: &geometry,
        };
        let mut ctl = InteractionController::new();
        ctl.handle(&down(150.0, 150.0), HitTarget::Element(a), &view);
        let r = ctl.handle(&down(610.0, 610.0), HitTarget::Element(b), &view);
        assert!(r.is_empty());
        assert!(matches!(ctl.state(), ControllerState::Dragging { element, .. } if *element == a));
    }

    // ─── Resize ──────────────────────────────────────────────────────────

    #[test]
    fn resize_clamps_to_floor() {
        let (scene, id) = scene_with_shape();
        let geometry = layout(&scene);
        let view = SceneView {
            scene: &scene,
            geometry: &geometry,
        };
        let mut ctl = InteractionController::new();

        let r = ctl.handle(&down(315.0, 255.0), HitTarget::ResizeHandle(id), &view);
        assert!(r.mutations.is_empty(), "resizing does not select");

        let r = ctl.handle(&moved(335.0, 275.0), HitTarget::Canvas, &view);
        assert_eq!(
            r.mutations,
            vec![SceneMutation::Resize {
                id,
                width: 200.0,
                height: 140.0
            }]
        );

        let r = ctl.handle(&moved(0.0, 0.0), HitTarget::Canvas, &view);
        assert_eq!(
            r.mutations,
            vec![SceneMutation::Resize {
                id,
                width: MIN_RESIZE,
                height: MIN_RESIZE
            }]
        );
    }

    // ─── Canvas clicks ───────────────────────────────────────────────────

    #[test]
    fn canvas_click_clears_selection() {
        let (scene, _) = scene_with_shape();
        let geometry = layout(&scene);
        let view = SceneView {
            scene: &scene,
            geometry: &geometry,
        };
        let mut ctl = InteractionController::new();
        ctl.handle(&down(1200.0, 700.0), HitTarget::Canvas, &view);
        let r = ctl.handle(&up(1200.0, 700.0), HitTarget::Canvas, &view);
        assert_eq!(r.mutations, vec![SceneMutation::Select(None)]);
        assert_eq!(r.effects, vec![Effect::ClearPanel]);
    }

    #[test]
    fn release_over_canvas_after_element_press_keeps_selection() {
        let (scene, id) = scene_with_shape();
        let geometry = layout(&scene);
        let view = SceneView {
            scene: &scene,
            geometry: &geometry,
        };
        let mut ctl = InteractionController::new();
        ctl.handle(&down(150.0, 150.0), HitTarget::Element(id), &view);
        ctl.handle(&up(150.0, 150.0), HitTarget::Element(id), &view);
        let r = ctl.handle(&up(1200.0, 700.0), HitTarget::Canvas, &view);
        assert!(r.is_empty());
    }

    // ─── Editing and prompts ─────────────────────────────────────────────

    #[test]
    fn double_click_text_enters_editing() {
        let scene = SceneGraph::new();
        let geometry = layout(&scene);
        let view = SceneView {
            scene: &scene,
            geometry: &geometry,
        };
        let title = ElementId::title();
        let mut ctl = InteractionController::new();

        let r = ctl.handle(
            &InputEvent::DoubleActivate { x: 640.0, y: 210.0 },
            HitTarget::Element(title),
            &view,
        );
        assert_eq!(r.mutations, vec![SceneMutation::Select(Some(title))]);
        assert!(r.effects.contains(&Effect::BeginTextEdit { element: title }));

        let r = ctl.handle(
            &InputEvent::TextInput {
                content: "NEW".into(),
            },
            HitTarget::Canvas,
            &view,
        );
        assert_eq!(
            r.mutations,
            vec![SceneMutation::SetText {
                id: title,
                content: "NEW".into()
            }]
        );

        let r = ctl.handle(&InputEvent::FocusLost, HitTarget::Canvas, &view);
        assert_eq!(r.effects, vec![Effect::RefreshPanel]);
        assert_eq!(ctl.state(), &ControllerState::Idle);
    }

    #[test]
    fn shape_prompt_is_modal() {
        let (scene, id) = scene_with_shape();
        let geometry = layout(&scene);
        let view = SceneView {
            scene: &scene,
            geometry: &geometry,
        };
        let mut ctl = InteractionController::new();

        let r = ctl.handle(
            &InputEvent::DoubleActivate { x: 150.0, y: 150.0 },
            HitTarget::Element(id),
            &view,
        );
        assert_eq!(
            r.effects,
            vec![Effect::PromptShapeLabel {
                element: id,
                current_label: "Text".into()
            }]
        );

        // Blocked while the prompt is open.
        assert!(ctl.handle(&down(150.0, 150.0), HitTarget::Element(id), &view).is_empty());

        let r = ctl.handle(
            &InputEvent::ModalResolved {
                value: Some(String::new()),
            },
            HitTarget::Canvas,
            &view,
        );
        assert_eq!(
            r.mutations,
            vec![SceneMutation::SetLabel {
                id,
                label: String::new()
            }]
        );
        assert_eq!(ctl.state(), &ControllerState::Idle);
    }

    #[test]
    fn cancelled_prompt_changes_nothing() {
        let (scene, id) = scene_with_shape();
        let geometry = layout(&scene);
        let view = SceneView {
            scene: &scene,
            geometry: &geometry,
        };
        let mut ctl = InteractionController::new();
        ctl.handle(
            &InputEvent::DoubleActivate { x: 150.0, y: 150.0 },
            HitTarget::Element(id),
            &view,
        );
        let r = ctl.handle(
            &InputEvent::ModalResolved { value: None },
            HitTarget::Canvas,
            &view,
        );
        assert!(r.is_empty());
        assert!(!ctl.is_busy());
    }
}
