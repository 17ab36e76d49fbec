pub mod controller;
pub mod input;
pub mod panel;
pub mod session;

pub use controller::{ControllerState, Effect, InteractionController, SceneMutation};
pub use input::{
    EmulatedMouseFilter, InputEvent, PointerSource, TapTracker, TouchPhase, TouchPoint,
};
pub use panel::{PanelAction, PanelError, PanelForm};
pub use session::{EditorConfig, EditorSession, ExportedImage, InputOutcome, SessionError};
