//! Scene model for a thumbnail composition.
//!
//! A scene is a background plus an ordered set of positioned, styled
//! elements. Two text elements (Title and Subtitle) are always present and
//! cannot be removed. Every absolute pixel value stored on an element is in
//! *current frame* coordinates; the responsive scaling policy rewrites them
//! when the frame changes.

use crate::id::ElementId;
use crate::registry::IconKey;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
        let long = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);

        match bytes.len() {
            3 => Some(Self::from_rgba8(short(0)?, short(1)?, short(2)?, 255)),
            4 => Some(Self::from_rgba8(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::from_rgba8(long(0)?, long(2)?, long(4)?, 255)),
            8 => Some(Self::from_rgba8(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// Perceived brightness on the 0..255 scale: `(r·299 + g·587 + b·114) / 1000`.
    pub fn brightness(&self) -> f32 {
        let [r, g, b, _] = self.to_rgba8();
        (r as f32 * 299.0 + g as f32 * 587.0 + b as f32 * 114.0) / 1000.0
    }
}

// ─── Text styling ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Text shadow. Turning `enabled` off keeps the other values so they come
/// back when it is turned on again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub enabled: bool,
    pub color: Color,
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur: f32,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::BLACK,
            offset_x: 2.0,
            offset_y: 2.0,
            blur: 2.0,
        }
    }
}

/// Font-size ranges per element type, matching the panel sliders.
pub const TEXT_FONT_RANGE: (f32, f32) = (12.0, 160.0);
pub const SHAPE_LABEL_FONT_RANGE: (f32, f32) = (10.0, 120.0);
pub const ICON_FONT_RANGE: (f32, f32) = (12.0, 200.0);

// ─── Shapes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Oval,
    RoundedRectangle,
    Parallelogram,
    Rhombus,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Oval,
        ShapeKind::RoundedRectangle,
        ShapeKind::Parallelogram,
        ShapeKind::Rhombus,
    ];

    /// Registry key, as used by the shape picker.
    pub fn key(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Oval => "oval",
            ShapeKind::RoundedRectangle => "rounded",
            ShapeKind::Parallelogram => "parallelogram",
            ShapeKind::Rhombus => "rhombus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Oval => "Oval",
            ShapeKind::RoundedRectangle => "Rounded Rectangle",
            ShapeKind::Parallelogram => "Parallelogram",
            ShapeKind::Rhombus => "Rhombus",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

// ─── Bitmaps ─────────────────────────────────────────────────────────────

/// A decoded image: straight (non-premultiplied) RGBA8, row-major.
#[derive(Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

impl Bitmap {
    /// Returns `None` if `pixels` does not hold exactly `width × height` RGBA pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || pixels.len() != (width as usize * height as usize * 4) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap({}x{})", self.width, self.height)
    }
}

/// Where an image element or image background gets its pixels from.
///
/// `Encoded` sources are decoded by the renderer at export time; a source
/// that fails to decode there is skipped rather than failing the export.
#[derive(Clone)]
pub enum ImageSource {
    Bitmap(Bitmap),
    Encoded(Arc<[u8]>),
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Bitmap(b) => b.fmt(f),
            ImageSource::Encoded(bytes) => write!(f, "Encoded({} bytes)", bytes.len()),
        }
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub content: String,
    pub font_size: f32,
    pub color: Color,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub shadow: Shadow,
    /// Explicit box set by a resize-handle drag. Text is never wrapped or
    /// clipped by it; it only widens the hit/selection box.
    pub box_size: Option<Size>,
}

impl TextElement {
    pub fn new(content: impl Into<String>, font_size: f32, color: Color) -> Self {
        Self {
            content: content.into(),
            font_size,
            color,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            shadow: Shadow::default(),
            box_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeElement {
    pub shape: ShapeKind,
    pub width: f32,
    pub height: f32,
    pub fill: Color,
    pub label: Option<String>,
    pub label_color: Color,
    pub label_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconElement {
    pub icon: IconKey,
    pub color: Color,
    pub font_size: f32,
}

#[derive(Debug, Clone)]
pub struct ImageElement {
    pub source: ImageSource,
    pub width: f32,
    pub height: f32,
    /// 0.0 ..= 1.0
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub enum ElementKind {
    Text(TextElement),
    Shape(ShapeElement),
    Icon(IconElement),
    Image(ImageElement),
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Text(_) => "text",
            ElementKind::Shape(_) => "shape",
            ElementKind::Icon(_) => "icon",
            ElementKind::Image(_) => "image",
        }
    }
}

/// Whether an element is one of the two fixed text lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementRole {
    Title,
    Subtitle,
    Free,
}

/// Stacking value shared by every element; ties are broken by insertion order.
pub const ELEMENT_Z: i32 = 10;

#[derive(Debug, Clone)]
pub struct SceneElement {
    pub id: ElementId,
    pub role: ElementRole,
    /// Left edge, or the horizontal centre for Title/Subtitle.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub z: i32,
    pub kind: ElementKind,
}

impl SceneElement {
    /// A user-added element with a freshly minted id.
    pub fn free(kind: ElementKind, x: f32, y: f32) -> Self {
        Self {
            id: ElementId::with_prefix(kind.name()),
            role: ElementRole::Free,
            x,
            y,
            z: ELEMENT_Z,
            kind,
        }
    }

    pub fn is_fixed(&self) -> bool {
        !matches!(self.role, ElementRole::Free)
    }

    /// Title and Subtitle are laid out centred on `x`.
    pub fn is_centered(&self) -> bool {
        self.is_fixed()
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match &self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextElement> {
        match &mut self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Stored box size, for the variants that carry one.
    pub fn stored_size(&self) -> Option<Size> {
        match &self.kind {
            ElementKind::Shape(s) => Some(Size {
                width: s.width,
                height: s.height,
            }),
            ElementKind::Image(i) => Some(Size {
                width: i.width,
                height: i.height,
            }),
            ElementKind::Text(t) => t.box_size,
            ElementKind::Icon(_) => None,
        }
    }
}

// ─── Background ──────────────────────────────────────────────────────────

/// Gradient angle in degrees. Only the diagonal variant exists.
pub const GRADIENT_ANGLE: f32 = 135.0;

#[derive(Debug, Clone)]
pub enum Background {
    Solid(Color),
    /// Ordered color stops, at least two.
    Gradient(SmallVec<[Color; 4]>),
    Image(ImageSource),
}

impl Background {
    /// A gradient background, or `None` with fewer than two colors.
    pub fn gradient(colors: impl IntoIterator<Item = Color>) -> Option<Self> {
        let stops: SmallVec<[Color; 4]> = colors.into_iter().collect();
        (stops.len() >= 2).then_some(Background::Gradient(stops))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Background::Solid(_) => "color",
            Background::Gradient(_) => "gradient",
            Background::Image(_) => "image",
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(Color::rgba(1.0, 0.0, 0.0, 1.0))
    }
}

// ─── Scene Graph ─────────────────────────────────────────────────────────

pub const DEFAULT_TITLE: &str = "YOUR TITLE HERE";
pub const DEFAULT_SUBTITLE: &str = "Your subtitle text";

#[derive(Debug, Clone)]
pub enum SceneNode {
    Root,
    Element(SceneElement),
}

/// Result of a removal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// Title/Subtitle; nothing happened.
    Fixed,
    Missing,
}

/// The complete scene: background, elements, selection.
///
/// Elements are children of a single root node. Paint order is kept
/// explicitly in `z_order` because `StableDiGraph` reuses vacated indices.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub graph: StableDiGraph<SceneNode, ()>,
    pub root: NodeIndex,
    id_index: HashMap<ElementId, NodeIndex>,
    z_order: Vec<NodeIndex>,
    background: Background,
    selected: Option<ElementId>,
}

impl SceneGraph {
    /// A scene with the default background and the default Title/Subtitle
    /// laid out for the canonical frame.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(SceneNode::Root);
        let mut scene = Self {
            graph,
            root,
            id_index: HashMap::new(),
            z_order: Vec::new(),
            background: Background::default(),
            selected: None,
        };

        let mut title = TextElement::new(DEFAULT_TITLE, 48.0, Color::WHITE);
        title.weight = FontWeight::Bold;
        scene.insert(SceneElement {
            id: ElementId::title(),
            role: ElementRole::Title,
            x: 640.0,
            y: 200.0,
            z: ELEMENT_Z,
            kind: ElementKind::Text(title),
        });
        scene.insert(SceneElement {
            id: ElementId::subtitle(),
            role: ElementRole::Subtitle,
            x: 640.0,
            y: 300.0,
            z: ELEMENT_Z,
            kind: ElementKind::Text(TextElement::new(DEFAULT_SUBTITLE, 24.0, Color::WHITE)),
        });
        scene
    }

    fn insert(&mut self, element: SceneElement) -> ElementId {
        let id = element.id;
        let idx = self.graph.add_node(SceneNode::Element(element));
        self.graph.add_edge(self.root, idx, ());
        self.id_index.insert(id, idx);
        self.z_order.push(idx);
        id
    }

    /// Add a user element on top of everything else.
    pub fn add_element(&mut self, mut element: SceneElement) -> ElementId {
        element.role = ElementRole::Free;
        log::debug!("add {} {}", element.kind.name(), element.id);
        self.insert(element)
    }

    /// Remove a user element. Title/Subtitle are rejected. Removing the
    /// selected element clears the selection.
    pub fn remove_element(&mut self, id: ElementId) -> RemoveOutcome {
        let Some(&idx) = self.id_index.get(&id) else {
            return RemoveOutcome::Missing;
        };
        if matches!(&self.graph[idx], SceneNode::Element(e) if e.is_fixed()) {
            log::debug!("refusing to remove fixed element {id}");
            return RemoveOutcome::Fixed;
        }
        self.graph.remove_node(idx);
        self.id_index.remove(&id);
        self.z_order.retain(|&i| i != idx);
        if self.selected == Some(id) {
            self.selected = None;
        }
        RemoveOutcome::Removed
    }

    /// Remove every user element, keeping Title/Subtitle.
    pub fn clear_free_elements(&mut self) {
        let free: Vec<ElementId> = self
            .elements_in_z_order()
            .filter(|e| !e.is_fixed())
            .map(|e| e.id)
            .collect();
        for id in free {
            self.remove_element(id);
        }
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&SceneElement> {
        match self.id_index.get(&id).map(|idx| &self.graph[*idx]) {
            Some(SceneNode::Element(e)) => Some(e),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut SceneElement> {
        let idx = self.id_index.get(&id).copied()?;
        match &mut self.graph[idx] {
            SceneNode::Element(e) => Some(e),
            SceneNode::Root => None,
        }
    }

    /// Elements in paint order: ascending `z`, insertion order among equals.
    pub fn elements_in_z_order(&self) -> impl Iterator<Item = &SceneElement> {
        let mut ordered: Vec<&SceneElement> = self
            .z_order
            .iter()
            .filter_map(|idx| match &self.graph[*idx] {
                SceneNode::Element(e) => Some(e),
                SceneNode::Root => None,
            })
            .collect();
        ordered.sort_by_key(|e| e.z);
        ordered.into_iter()
    }

    /// Ids of the user elements, in paint order.
    pub fn free_ids(&self) -> Vec<ElementId> {
        self.elements_in_z_order()
            .filter(|e| !e.is_fixed())
            .map(|e| e.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.z_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_order.is_empty()
    }

    pub fn title(&self) -> &SceneElement {
        self.fixed(ElementId::title())
    }

    pub fn subtitle(&self) -> &SceneElement {
        self.fixed(ElementId::subtitle())
    }

    pub fn title_mut(&mut self) -> &mut SceneElement {
        self.fixed_mut(ElementId::title())
    }

    pub fn subtitle_mut(&mut self) -> &mut SceneElement {
        self.fixed_mut(ElementId::subtitle())
    }

    fn fixed(&self, id: ElementId) -> &SceneElement {
        match &self.graph[self.id_index[&id]] {
            SceneNode::Element(e) => e,
            SceneNode::Root => unreachable!("fixed text is never the root"),
        }
    }

    fn fixed_mut(&mut self, id: ElementId) -> &mut SceneElement {
        let idx = self.id_index[&id];
        match &mut self.graph[idx] {
            SceneNode::Element(e) => e,
            SceneNode::Root => unreachable!("fixed text is never the root"),
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `id`, replacing any previous selection. Selecting an id that
    /// is not in the scene clears the selection. Returns the new selection.
    pub fn set_selected(&mut self, id: Option<ElementId>) -> Option<ElementId> {
        self.selected = id.filter(|id| self.contains(*id));
        self.selected
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected.filter(|id| self.contains(*id))
    }

    pub fn selected_element(&self) -> Option<&SceneElement> {
        self.selected().and_then(|id| self.get(id))
    }

    // ─── Background ──────────────────────────────────────────────────────

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Replace the background wholesale.
    pub fn set_background(&mut self, background: Background) {
        log::debug!("background -> {}", background.kind_name());
        self.background = background;
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Display bounds ──────────────────────────────────────────────────────

/// An on-screen box in frame pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}
