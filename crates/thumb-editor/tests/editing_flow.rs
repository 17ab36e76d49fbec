//! Integration tests: input → controller → session → scene.
//!
//! Drives an `EditorSession` the way the browser host does and checks the
//! resulting scene, panel and export.

use pretty_assertions::assert_eq;
use thumb_core::{
    Background, Color, EditorMode, ElementId, ElementKind, RescaleMode, ShapeKind,
};
use thumb_editor::{
    EditorConfig, EditorSession, Effect, InputEvent, PanelAction, PanelError, PointerSource,
    SessionError,
};
use thumb_render::{Pixmap, encode_png};

fn session() -> EditorSession {
    let mut s = EditorSession::default();
    s.initialize(1280.0);
    s
}

fn session_with(mode: RescaleMode) -> EditorSession {
    let config = EditorConfig {
        rescale_mode: mode,
        ..EditorConfig::default()
    };
    let mut s = EditorSession::new(config, thumb_render::FontBook::bundled());
    s.initialize(1280.0);
    s
}

fn press(s: &mut EditorSession, x: f32, y: f32) {
    s.handle_input(InputEvent::from_pointer_down(x, y));
}

fn drag_to(s: &mut EditorSession, x: f32, y: f32) {
    s.handle_input(InputEvent::from_pointer_move(x, y));
}

fn release(s: &mut EditorSession, x: f32, y: f32) {
    s.handle_input(InputEvent::from_pointer_up(x, y));
}

fn shape_of(s: &EditorSession, id: ElementId) -> thumb_core::ShapeElement {
    match &s.scene().get(id).unwrap().kind {
        ElementKind::Shape(shape) => shape.clone(),
        other => panic!("expected shape, got {}", other.name()),
    }
}

// ─── Gestures ────────────────────────────────────────────────────────────

#[test]
fn drag_moves_shape_without_clamping() {
    let mut s = session();
    let id = s.add_shape(ShapeKind::Rectangle);
    s.select(None);

    press(&mut s, 200.0, 200.0);
    assert_eq!(s.scene().selected(), Some(id));
    drag_to(&mut s, 1500.0, 250.0);
    release(&mut s, 1500.0, 250.0);

    let el = s.scene().get(id).unwrap();
    assert_eq!((el.x, el.y), (1440.0, 190.0));
    // The release landed on empty canvas but ended a drag.
    assert_eq!(s.scene().selected(), Some(id));
}

#[test]
fn resize_handle_sets_label_size_from_box() {
    let mut s = session();
    let id = s.add_shape(ShapeKind::Rectangle);

    // 180x120 at (140, 140): handle covers (306..320, 246..260).
    press(&mut s, 313.0, 253.0);
    drag_to(&mut s, 413.0, 353.0);
    release(&mut s, 413.0, 353.0);

    let shape = shape_of(&s, id);
    assert_eq!((shape.width, shape.height), (280.0, 220.0));
    assert_eq!(shape.label_size, 220.0 / 3.0);
}

#[test]
fn canvas_click_clears_selection_and_panel() {
    let mut s = session();
    s.add_shape(ShapeKind::Oval);
    press(&mut s, 1200.0, 650.0);
    let outcome = s.handle_input(InputEvent::from_pointer_up(1200.0, 650.0));

    assert_eq!(s.scene().selected(), None);
    assert_eq!(outcome.effects, vec![Effect::ClearPanel]);
    assert!(s.panel().is_placeholder());
}

#[test]
fn double_tap_on_shape_prompts_for_label() {
    let mut s = session();
    let id = s.add_shape(ShapeKind::Rectangle);

    let first = s.handle_input(InputEvent::Tap {
        x: 200.0,
        y: 200.0,
        time_ms: 1000.0,
    });
    assert!(first.effects.is_empty());
    let second = s.handle_input(InputEvent::Tap {
        x: 200.0,
        y: 200.0,
        time_ms: 1200.0,
    });
    assert_eq!(
        second.effects,
        vec![Effect::PromptShapeLabel {
            element: id,
            current_label: "Text".into()
        }]
    );

    // Everything else waits for the prompt.
    press(&mut s, 200.0, 200.0);
    drag_to(&mut s, 400.0, 400.0);
    assert_eq!(s.scene().get(id).unwrap().x, 140.0);

    let outcome = s.handle_input(InputEvent::ModalResolved {
        value: Some("GO".into()),
    });
    assert!(outcome.changed);
    assert_eq!(shape_of(&s, id).label.as_deref(), Some("GO"));
}

#[test]
fn touch_drag_uses_first_touch() {
    use thumb_editor::{TouchPhase, TouchPoint};
    let mut s = session();
    let id = s.add_icon(thumb_core::IconKey::Heart);
    s.select(None);

    let at = |x, y| [TouchPoint { x, y }, TouchPoint { x: 0.0, y: 0.0 }];
    for (phase, (x, y)) in [
        (TouchPhase::Start, (170.0, 170.0)),
        (TouchPhase::Move, (190.0, 200.0)),
        (TouchPhase::End, (190.0, 200.0)),
    ] {
        let event = InputEvent::from_touches(phase, &at(x, y)).unwrap();
        if let InputEvent::PointerDown { source, .. } = &event {
            assert_eq!(*source, PointerSource::Touch);
        }
        s.handle_input(event);
    }
    let el = s.scene().get(id).unwrap();
    assert_eq!((el.x, el.y), (180.0, 190.0));
}

#[test]
fn mouse_echo_of_a_touch_is_ignored() {
    use thumb_editor::{TouchPhase, TouchPoint};
    let mut s = session();
    let id = s.add_shape(ShapeKind::Rectangle);
    s.select(None);

    for (phase, x, y) in [
        (TouchPhase::Start, 200.0, 200.0),
        (TouchPhase::Move, 220.0, 210.0),
        (TouchPhase::End, 220.0, 210.0),
    ] {
        s.handle_input(InputEvent::from_touches(phase, &[TouchPoint { x, y }]).unwrap());
    }
    assert_eq!(s.scene().get(id).unwrap().x, 160.0);
    s.select(None);

    let echoed = s.handle_input(InputEvent::from_pointer_down(220.0, 210.0));
    assert!(!echoed.changed && echoed.effects.is_empty());
    release(&mut s, 220.0, 210.0);
    assert_eq!(s.scene().selected(), None);

    // A real mouse press elsewhere is handled normally.
    press(&mut s, 230.0, 220.0);
    assert_eq!(s.scene().selected(), Some(id));
}

#[test]
fn icon_resize_follows_drag_height_only() {
    let resized = |dx: f32| {
        let mut s = session();
        let id = s.add_icon(thumb_core::IconKey::Star);
        let layout = s.layout();
        let b = layout.get(id).unwrap();
        let (hx, hy) = (b.x + b.width - 7.0, b.y + b.height - 7.0);
        press(&mut s, hx, hy);
        drag_to(&mut s, hx + dx, hy + 60.0);
        release(&mut s, hx + dx, hy + 60.0);
        match &s.scene().get(id).unwrap().kind {
            ElementKind::Icon(icon) => icon.font_size,
            other => panic!("expected icon, got {}", other.name()),
        }
    };

    let wide = resized(100.0);
    let narrow = resized(-10.0);
    assert_eq!(wide, narrow);
    // 56px icon: line height 67.2 grows to 127.2.
    assert!((wide - 106.0).abs() < 0.01, "font size {wide}");
}

#[test]
fn in_place_edit_refits_long_text() {
    let mut s = session();
    let id = s.add_text();

    let outcome = s.handle_input(InputEvent::DoubleActivate { x: 150.0, y: 130.0 });
    assert!(outcome.effects.contains(&Effect::BeginTextEdit { element: id }));

    let long = "A very long headline that will never fit on a single line at this size ".repeat(3);
    s.handle_input(InputEvent::TextInput { content: long });
    let size = s.scene().get(id).unwrap().as_text().unwrap().font_size;
    assert!(size < 32.0);
    assert!(size >= 12.0);

    let outcome = s.handle_input(InputEvent::FocusLost);
    assert_eq!(outcome.effects, vec![Effect::RefreshPanel]);
}

// ─── Panel ───────────────────────────────────────────────────────────────

#[test]
fn delete_clears_selection_and_title_is_protected() {
    let mut s = session();
    let id = s.add_shape(ShapeKind::Rhombus);
    s.panel_action(PanelAction::Delete).unwrap();
    assert!(!s.scene().contains(id));
    assert_eq!(s.scene().selected(), None);
    assert!(s.panel().is_placeholder());

    s.select(Some(ElementId::title()));
    let err = s.panel_action(PanelAction::Delete).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Panel(PanelError::FixedElement(_))
    ));
    assert!(s.scene().contains(ElementId::title()));
}

#[test]
fn panel_edits_reach_the_scene() {
    let mut s = session();
    let id = s.add_shape(ShapeKind::Rectangle);
    s.set_property("fill", "#00CC66").unwrap();
    s.set_property("label", "").unwrap();
    let shape = shape_of(&s, id);
    assert_eq!(shape.fill, Color::from_hex("#00CC66").unwrap());
    assert_eq!(shape.label.as_deref(), Some(""));

    s.select(None);
    assert!(matches!(
        s.set_property("fill", "#000000"),
        Err(SessionError::Panel(PanelError::NoSelection))
    ));
}

/// Solid blue PNG.
fn png(width: u32, height: u32) -> Vec<u8> {
    let mut pixmap = Pixmap::new(width, height).unwrap();
    for px in pixmap.data_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&[0, 0, 255, 255]);
    }
    encode_png(&pixmap).unwrap()
}

#[test]
fn image_can_become_the_background() {
    let mut s = session();
    let id = s.add_image_bytes(&png(800, 300)).unwrap();
    let el = s.scene().get(id).unwrap();
    // Scaled down to fit 400x300, keeping aspect.
    assert_eq!(el.stored_size().map(|b| (b.width, b.height)), Some((400.0, 150.0)));
    assert_eq!((el.x, el.y), (100.0, 100.0));

    s.panel_action(PanelAction::MakeFullScreen).unwrap();
    let el = s.scene().get(id).unwrap();
    assert_eq!((el.x, el.y), (0.0, 0.0));
    assert_eq!(el.stored_size().map(|b| b.width), Some(1280.0));

    s.panel_action(PanelAction::SetAsBackground).unwrap();
    assert!(!s.scene().contains(id));
    assert!(matches!(s.scene().background(), Background::Image(_)));

    let exported = s.export().unwrap();
    let pixmap = Pixmap::decode_png(&exported.bytes).unwrap();
    let p = pixmap.pixel(5, 5).unwrap();
    assert_eq!((p.red(), p.green(), p.blue()), (0, 0, 255));
}

#[test]
fn export_contains_the_title_text() {
    let titled = session();
    let mut blank = session();
    blank.set_text_content(ElementId::title(), "");
    blank.set_text_content(ElementId::subtitle(), "");

    let decode = |s: &EditorSession| Pixmap::decode_png(&s.export().unwrap().bytes).unwrap();
    let (titled, blank) = (decode(&titled), decode(&blank));
    let differing = titled
        .data()
        .iter()
        .zip(blank.data())
        .filter(|(a, b)| a != b)
        .count();
    assert!(differing > 1000, "only {differing} bytes differ");
}

#[test]
fn undecodable_upload_leaves_scene_unchanged() {
    let mut s = session();
    let before = s.scene().len();
    let err = s.add_image_bytes(b"GIF89a but not really").unwrap_err();
    assert!(matches!(err, SessionError::Decode(_)));
    assert_eq!(s.scene().len(), before);
}

// ─── Viewport ────────────────────────────────────────────────────────────

#[test]
fn fixed_text_follows_scale() {
    for (viewport, s) in [(400.0, 0.3_f32), (600.0, 0.5), (1280.0, 1.0)] {
        let mut session = EditorSession::default();
        session.initialize(viewport);
        let title = session.scene().title();
        let subtitle = session.scene().subtitle();
        assert_eq!(title.y, 200.0 * s);
        assert_eq!(title.as_text().unwrap().font_size, 48.0 * s);
        assert_eq!(subtitle.y, 300.0 * s);
        assert_eq!(subtitle.as_text().unwrap().font_size, 24.0 * s);
        assert_eq!(title.x, session.frame().width / 2.0);
    }
}

#[test]
fn baseline_rescale_is_idempotent_and_reversible() {
    let mut s = session_with(RescaleMode::FromBaseline);
    let id = s.add_shape(ShapeKind::Rectangle);

    s.on_viewport_resize(600.0);
    s.on_viewport_resize(600.0);
    let el = s.scene().get(id).unwrap();
    assert_eq!(el.x, 70.0);
    assert_eq!(el.stored_size().unwrap().width, 90.0);

    s.on_viewport_resize(1440.0);
    let el = s.scene().get(id).unwrap();
    assert_eq!(el.x, 140.0);
    assert_eq!(el.stored_size().unwrap().width, 180.0);
}

#[test]
fn compounding_rescale_applies_factor_every_time() {
    let mut s = session_with(RescaleMode::Compounding);
    let id = s.add_shape(ShapeKind::Rectangle);

    s.on_viewport_resize(600.0);
    s.on_viewport_resize(600.0);
    let el = s.scene().get(id).unwrap();
    assert_eq!(el.x, 35.0);
    assert_eq!(el.stored_size().unwrap().width, 45.0);
}

// ─── Templates ───────────────────────────────────────────────────────────

#[test]
fn template_key_resets_scene() {
    let mut s = session();
    s.add_text();
    s.add_icon(thumb_core::IconKey::Bell);
    assert!(s.apply_template_key("bold-red").unwrap());

    assert!(s.scene().free_ids().is_empty());
    assert_eq!(s.scene().selected(), None);
    let title = s.scene().title().as_text().unwrap();
    assert_eq!(title.content, "YOUR TITLE HERE");
    assert_eq!(title.color, Color::WHITE);

    assert!(!s.apply_template_key("no-such-template").unwrap());
}

#[test]
fn startup_without_template_keeps_the_gesture() {
    let mut s = session();
    let id = s.add_shape(ShapeKind::Rectangle);

    press(&mut s, 200.0, 200.0);
    let params = s.apply_startup("https://thumbs.example/studio?mode=advanced").unwrap();
    assert!(params.template.is_none());
    drag_to(&mut s, 300.0, 250.0);
    release(&mut s, 300.0, 250.0);

    let el = s.scene().get(id).unwrap();
    assert_eq!((el.x, el.y), (240.0, 190.0));
}

#[test]
fn startup_location_applies_named_template() {
    let mut s = session();
    let params = s
        .apply_startup("https://thumbs.example/studio?mode=advanced&template=bright-yellow")
        .unwrap();
    assert_eq!(params.mode, EditorMode::Advanced);
    assert_eq!(params.cleaned_location.as_deref(), Some("/studio"));
    let title = s.scene().title().as_text().unwrap();
    assert_eq!(title.color, Color::BLACK);
    assert!(matches!(s.scene().background(), Background::Gradient(stops) if stops.len() == 2));
}
