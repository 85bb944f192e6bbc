//! Tool selection.
//!
//! The active tool decides how a pointer-down is interpreted. Holding the
//! temporary-hand key overrides the active tool with `Hand` until release,
//! then restores whatever was active before.

use serde::{Deserialize, Serialize};

/// The active tool determines how input events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Select, move and marquee.
    Pointer,
    /// Freehand polylines; a still tap places a dot.
    Pen,
    /// Pan the view.
    Hand,
    /// Import an image.
    Image,
}

#[derive(Debug, Clone)]
pub struct ToolState {
    active: ToolKind,
    previous: ToolKind,
    /// Tool to restore when the temporary hand is released.
    held: Option<ToolKind>,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            active: ToolKind::Pointer,
            previous: ToolKind::Pen,
            held: None,
        }
    }
}

impl ToolState {
    /// Tool that pointer events go to right now.
    pub fn effective(&self) -> ToolKind {
        if self.held.is_some() {
            ToolKind::Hand
        } else {
            self.active
        }
    }

    /// The user-chosen tool, ignoring the temporary hand.
    pub fn active(&self) -> ToolKind {
        self.active
    }

    /// Switch tools. Returns `false` if `kind` was already active.
    pub fn select(&mut self, kind: ToolKind) -> bool {
        if kind == self.active {
            return false;
        }
        self.previous = self.active;
        self.active = kind;
        log::debug!("tool: {:?} -> {:?}", self.previous, self.active);
        true
    }

    /// Swap the active and previous tools.
    pub fn toggle_last(&mut self) -> ToolKind {
        std::mem::swap(&mut self.active, &mut self.previous);
        self.active
    }

    pub fn is_temporary_hand(&self) -> bool {
        self.held.is_some()
    }

    /// Start the temporary hand override. Key repeat is harmless.
    pub fn begin_temporary_hand(&mut self) -> bool {
        if self.held.is_some() {
            return false;
        }
        self.held = Some(self.active);
        true
    }

    pub fn end_temporary_hand(&mut self) -> bool {
        self.held.take().is_some()
    }
}
