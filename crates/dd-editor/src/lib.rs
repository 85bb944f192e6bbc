pub mod config;
pub mod editor;
pub mod history;
pub mod input;
pub mod interaction;
pub mod outcome;
pub mod shortcuts;
pub mod tools;

pub use config::{ConfigError, EditorConfig};
pub use editor::{Editor, LayerEntry};
pub use input::{InputEvent, Modifiers};
pub use interaction::{AxisLock, Interaction};
pub use outcome::{Effect, EventOutcome, Panels};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::ToolKind;
