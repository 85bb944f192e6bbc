//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Holding Space
//! (temporary hand) and Shift (straight-line lock) are stateful and handled
//! by the editor directly, not here.
//!
//! - Tab toggles between the two most recently used tools
//! - ⌘/Ctrl is the command modifier on every platform
//! - ⌘\ toggles both side panels

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    ToolPointer,
    ToolPen,
    ToolHand,
    ToolImage,
    /// Toggle between current and previous tool.
    ToggleLastTool,

    // ── Edit ──
    Undo,
    Delete,
    Deselect,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ResetView,

    // ── Z-order ──
    SendBackward,
    BringForward,
    SendToBack,
    BringToFront,

    // ── Host ──
    TogglePanels,
    Export,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.command();

        // ── Modifier combos first (most specific) ──
        if cmd && modifiers.shift {
            return match key {
                "e" | "E" => Some(ShortcutAction::Export),
                // Shift turns `[`/`]` into `{`/`}` on US layouts.
                "[" | "{" => Some(ShortcutAction::SendToBack),
                "]" | "}" => Some(ShortcutAction::BringToFront),
                "+" => Some(ShortcutAction::ZoomIn),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "\\" => Some(ShortcutAction::TogglePanels),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ResetView),
                "[" => Some(ShortcutAction::SendBackward),
                "]" => Some(ShortcutAction::BringForward),
                _ => None,
            };
        }

        if modifiers.alt || modifiers.shift {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "v" | "V" => Some(ShortcutAction::ToolPointer),
            "p" | "P" => Some(ShortcutAction::ToolPen),
            "h" | "H" => Some(ShortcutAction::ToolHand),
            "i" | "I" => Some(ShortcutAction::ToolImage),
            "Tab" => Some(ShortcutAction::ToggleLastTool),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
