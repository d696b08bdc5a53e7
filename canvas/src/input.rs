//! Input model: structured events from the rendering substrate and the
//! keyboard shortcut table.
//!
//! The substrate owns pointer gestures (drag, connect handles, clicks) and
//! reports only their outcome as an [`InputEvent`]. Key presses are resolved
//! to a [`Shortcut`] through [`Shortcut::resolve`], which is the single place
//! the keyboard bindings live.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::geometry::Point;
use crate::model::NodeId;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Meta / Command key.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard key, named as the browser reports it (`"z"`, `"Delete"`, `"?"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Editor command bound to a key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    Copy,
    Paste,
    SelectAll,
    AddNode,
    DeleteSelected,
    /// Deselect everything and hide the help overlay.
    Escape,
    ToggleHelp,
}

impl Shortcut {
    /// Map a key chord to a command. Letter keys match case-insensitively.
    #[must_use]
    pub fn resolve(key: &Key, modifiers: Modifiers) -> Option<Self> {
        let name = key.0.as_str();
        if modifiers.command() {
            return match name.to_ascii_lowercase().as_str() {
                "z" if modifiers.shift => Some(Self::Redo),
                "z" => Some(Self::Undo),
                "y" => Some(Self::Redo),
                "c" => Some(Self::Copy),
                "v" => Some(Self::Paste),
                "a" => Some(Self::SelectAll),
                "n" => Some(Self::AddNode),
                _ => None,
            };
        }
        match name {
            "Delete" | "Backspace" => Some(Self::DeleteSelected),
            "Escape" => Some(Self::Escape),
            "?" => Some(Self::ToggleHelp),
            _ => None,
        }
    }

    /// Key chord shown in the help overlay.
    #[must_use]
    pub fn chord(self) -> &'static str {
        match self {
            Self::Undo => "Ctrl+Z",
            Self::Redo => "Ctrl+Y / Ctrl+Shift+Z",
            Self::Copy => "Ctrl+C",
            Self::Paste => "Ctrl+V",
            Self::SelectAll => "Ctrl+A",
            Self::AddNode => "Ctrl+N",
            Self::DeleteSelected => "Delete / Backspace",
            Self::Escape => "Escape",
            Self::ToggleHelp => "?",
        }
    }

    /// One-line description for the help overlay.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Undo => "Undo",
            Self::Redo => "Redo",
            Self::Copy => "Copy selected nodes",
            Self::Paste => "Paste nodes",
            Self::SelectAll => "Select all",
            Self::AddNode => "Add new node",
            Self::DeleteSelected => "Delete selected",
            Self::Escape => "Deselect all",
            Self::ToggleHelp => "Toggle this help",
        }
    }

    /// Every command, in help-overlay order.
    pub const ALL: [Self; 9] = [
        Self::Undo,
        Self::Redo,
        Self::Copy,
        Self::Paste,
        Self::SelectAll,
        Self::AddNode,
        Self::DeleteSelected,
        Self::Escape,
        Self::ToggleHelp,
    ];
}

/// Outcome of a gesture or key press, as reported by the substrate.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A drag ended with the node at `position`.
    NodeMoved { id: NodeId, position: Point },
    /// Click on a node; `additive` when a multi-select modifier was held.
    NodeClicked { id: NodeId, additive: bool },
    EdgeClicked { id: String, additive: bool },
    /// Connect handle dragged from one node onto another.
    Connect { from: NodeId, to: NodeId },
    NodeRecolored { id: NodeId, color: String },
    NodeImageAttached { id: NodeId, image: String },
    NodeRelabeled { id: NodeId, label: String },
    /// Delete chosen from a node's own menu.
    NodeDeleteRequested { id: NodeId },
    /// Key press. `in_text_field` is set when focus is inside a text input.
    KeyDown { key: Key, modifiers: Modifiers, in_text_field: bool },
    /// Toolbar button bound to an editor command (undo, redo, add node, ...).
    Command(Shortcut),
    /// "Reset Layout" toolbar button.
    ResetLayout,
}
