//! DOM projection of the scene.
//!
//! The browser host owns the DOM. After every change it asks for the
//! projection and reconciles one absolutely positioned node per element
//! against it; nothing here touches the page.

use serde_json::{Value, json};
use thumb_core::{Background, Bounds, ElementKind, ImageSource, SceneElement, Shadow};
use thumb_editor::EditorSession;
use thumb_render::HANDLE_SIZE;

/// CSS `background` value. Image backgrounds are drawn by the host from
/// `background_rgba()`, so they have none.
pub fn background_css(background: &Background) -> Option<String> {
    match background {
        Background::Solid(c) => Some(c.to_hex()),
        Background::Gradient(stops) => {
            let stops: Vec<String> = stops.iter().map(|c| c.to_hex()).collect();
            Some(format!(
                "linear-gradient({}deg, {})",
                thumb_core::GRADIENT_ANGLE,
                stops.join(", ")
            ))
        }
        Background::Image(_) => None,
    }
}

/// CSS `text-shadow`, or `None` when the shadow is off.
pub fn text_shadow_css(shadow: &Shadow) -> Option<String> {
    shadow.enabled.then(|| {
        format!(
            "{}px {}px {}px {}",
            shadow.offset_x,
            shadow.offset_y,
            shadow.blur,
            shadow.color.to_hex()
        )
    })
}

fn element_json(el: &SceneElement, bounds: Bounds, selected: bool) -> Value {
    let mut obj = json!({
        "id": el.id.as_str(),
        "kind": el.kind.name(),
        "role": el.role,
        "x": bounds.x,
        "y": bounds.y,
        "width": bounds.width,
        "height": bounds.height,
        "z": el.z,
        "selected": selected,
        "resizable": !el.is_fixed(),
    });

    match &el.kind {
        ElementKind::Text(t) => {
            obj["content"] = json!(t.content);
            obj["fontSize"] = json!(t.font_size);
            obj["color"] = json!(t.color.to_hex());
            obj["fontWeight"] = json!(t.weight);
            obj["fontStyle"] = json!(t.style);
            obj["textShadow"] = json!(text_shadow_css(&t.shadow));
        }
        ElementKind::Shape(s) => {
            obj["shape"] = json!(s.shape.key());
            obj["fill"] = json!(s.fill.to_hex());
            obj["label"] = json!(s.label);
            obj["labelColor"] = json!(s.label_color.to_hex());
            obj["labelSize"] = json!(s.label_size);
        }
        ElementKind::Icon(i) => {
            obj["icon"] = json!(i.icon.key());
            obj["glyph"] = json!(i.icon.emoji());
            obj["color"] = json!(i.color.to_hex());
            obj["fontSize"] = json!(i.font_size);
        }
        ElementKind::Image(img) => {
            obj["opacity"] = json!(img.opacity);
            if let ImageSource::Bitmap(b) = &img.source {
                obj["naturalWidth"] = json!(b.width);
                obj["naturalHeight"] = json!(b.height);
            }
        }
    }
    obj
}

/// Everything the host needs to draw the editor surface.
pub fn project(session: &EditorSession) -> Value {
    let scene = session.scene();
    let frame = session.frame();
    let layout = session.layout();
    let selected = scene.selected();

    let elements: Vec<Value> = layout
        .iter()
        .filter_map(|(id, bounds)| {
            let el = scene.get(id)?;
            Some(element_json(el, bounds, selected == Some(id)))
        })
        .collect();

    json!({
        "frame": { "width": frame.width, "height": frame.height },
        "scale": session.scale(),
        "handleSize": HANDLE_SIZE,
        "background": {
            "type": scene.background().kind_name(),
            "css": background_css(scene.background()),
        },
        "selected": selected.map(|id| id.as_str().to_string()),
        "elements": elements,
    })
}
