pub mod css;
pub mod fit;
pub mod id;
pub mod layout;
pub mod model;
pub mod registry;
pub mod scale;
pub mod simple;
pub mod startup;
pub mod template;

pub use css::{CssError, parse_background_value, parse_color, parse_gradient};
pub use fit::{EstimatedMetrics, TextMeasure, fit_single_line};
pub use id::ElementId;
pub use layout::{DisplayLayout, MeasuredGeometry, resolve_layout};
pub use model::*;
pub use registry::IconKey;
pub use scale::{CanvasFrame, RescaleMode, canvas_frame, scale_factor};
pub use simple::{SimpleForm, SimpleModeError, interpret_response};
pub use startup::{EditorMode, StartupParams};
pub use template::{TemplateConfig, TemplateKind, apply_template};
