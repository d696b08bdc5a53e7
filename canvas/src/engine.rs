use std::sync::Arc;

use rand::Rng;
use uuid::Uuid;

use crate::consts::ADD_NODE_SPREAD;
use crate::doc::GraphSnapshot;
use crate::geometry::Point;
use crate::history::{HistoryLedger, Transition};
use crate::input::{InputEvent, Key, Modifiers, Shortcut};
use crate::layout::layout_diagram;
use crate::model::{DiagramData, NodeId};
use crate::ops::{self, Clipboard, EditError, Removed};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from the reducer for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    /// The displayed snapshot changed; redraw from `transition.snapshot`.
    StateChanged(Transition),
    /// Post a short status message.
    Notify(String),
    /// Show or hide the keyboard help overlay.
    HelpToggled(bool),
    /// A requested edit could not be applied.
    Rejected(EditError),
}

/// Editing state for one generated diagram: the diagram description, its
/// undo/redo ledger, the clipboard and the help overlay flag.
///
/// All mutations funnel through [`Editor::handle`] or the named command
/// methods, and every state change passes through one commit point that
/// records edits and skips no-op results.
#[derive(Debug, Clone)]
pub struct Editor {
    data: DiagramData,
    ledger: HistoryLedger,
    clipboard: Clipboard,
    show_help: bool,
}

impl Editor {
    /// Lay out `data` and seed the ledger with the result.
    #[must_use]
    pub fn new(data: DiagramData) -> Self {
        let seed = layout_diagram(&data);
        Self { data, ledger: HistoryLedger::new(seed), clipboard: Clipboard::new(), show_help: false }
    }

    /// Swap in a freshly generated diagram. History restarts from its layout;
    /// the clipboard survives.
    pub fn replace(&mut self, data: DiagramData) -> Transition {
        let seed = layout_diagram(&data);
        self.data = data;
        self.ledger.reset(seed);
        Transition::replay(self.ledger.current_arc())
    }

    // --- Queries ---

    #[must_use]
    pub fn data(&self) -> &DiagramData {
        &self.data
    }

    /// The displayed snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &GraphSnapshot {
        self.ledger.current()
    }

    #[must_use]
    pub fn snapshot_arc(&self) -> Arc<GraphSnapshot> {
        self.ledger.current_arc()
    }

    #[must_use]
    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    #[must_use]
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    #[must_use]
    pub fn show_help(&self) -> bool {
        self.show_help
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.ledger.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.ledger.can_redo()
    }

    // --- Reducer ---

    /// Dispatch one substrate event.
    pub fn handle(&mut self, event: InputEvent) -> Vec<Action> {
        match event {
            InputEvent::NodeMoved { id, position } => {
                let next = ops::move_node(self.snapshot(), &id, position);
                changed(self.commit(next))
            }
            InputEvent::NodeClicked { id, additive } => {
                let next = ops::toggle_node_selection(self.snapshot(), &id, additive);
                changed(self.commit(next))
            }
            InputEvent::EdgeClicked { id, additive } => {
                let next = ops::toggle_edge_selection(self.snapshot(), &id, additive);
                changed(self.commit(next))
            }
            InputEvent::Connect { from, to } => match self.connect(&from, &to) {
                Ok(transition) => changed(transition),
                Err(e) => vec![Action::Rejected(e)],
            },
            InputEvent::NodeRecolored { id, color } => {
                let next = ops::recolor(self.snapshot(), &id, &color);
                changed(self.commit(next))
            }
            InputEvent::NodeImageAttached { id, image } => {
                let next = ops::attach_image(self.snapshot(), &id, &image);
                changed(self.commit(next))
            }
            InputEvent::NodeRelabeled { id, label } => {
                let next = ops::relabel(self.snapshot(), &id, &label);
                changed(self.commit(next))
            }
            InputEvent::NodeDeleteRequested { id } => {
                let (next, removed) = ops::delete_node(self.snapshot(), &id);
                deleted(self.commit(next), removed)
            }
            InputEvent::KeyDown { key, modifiers, in_text_field } => self.on_key_down(&key, modifiers, in_text_field),
            InputEvent::Command(shortcut) => self.run(shortcut),
            InputEvent::ResetLayout => changed(self.reset_layout()),
        }
    }

    /// Resolve and run a key chord. Ignored while a text field has focus.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers, in_text_field: bool) -> Vec<Action> {
        if in_text_field {
            return vec![Action::None];
        }
        match Shortcut::resolve(key, modifiers) {
            Some(shortcut) => self.run(shortcut),
            None => vec![Action::None],
        }
    }

    /// Run one editor command.
    pub fn run(&mut self, shortcut: Shortcut) -> Vec<Action> {
        match shortcut {
            Shortcut::Undo => changed(self.undo()),
            Shortcut::Redo => changed(self.redo()),
            Shortcut::Copy => match self.copy() {
                0 => vec![Action::None],
                n => vec![Action::Notify(format!("Copied {n} node(s)"))],
            },
            Shortcut::Paste => {
                let count = self.clipboard.len();
                match self.paste() {
                    Some(transition) => {
                        vec![Action::StateChanged(transition), Action::Notify(format!("Pasted {count} node(s)"))]
                    }
                    None => vec![Action::None],
                }
            }
            Shortcut::SelectAll => changed(self.select_all()),
            Shortcut::AddNode => match self.add_node(None) {
                Some(transition) => vec![Action::StateChanged(transition), Action::Notify("Added new node".into())],
                None => vec![Action::None],
            },
            Shortcut::DeleteSelected => {
                let (transition, removed) = self.delete_selected();
                deleted(transition, removed)
            }
            Shortcut::Escape => {
                let mut actions = changed(self.deselect_all());
                if self.show_help {
                    self.show_help = false;
                    actions.retain(|a| *a != Action::None);
                    actions.push(Action::HelpToggled(false));
                }
                actions
            }
            Shortcut::ToggleHelp => {
                self.show_help = !self.show_help;
                vec![Action::HelpToggled(self.show_help)]
            }
        }
    }

    // --- Commands ---

    pub fn undo(&mut self) -> Option<Transition> {
        let transition = self.ledger.undo()?;
        self.ledger.observe(&transition);
        Some(transition)
    }

    pub fn redo(&mut self) -> Option<Transition> {
        let transition = self.ledger.redo()?;
        self.ledger.observe(&transition);
        Some(transition)
    }

    /// Copy the selected nodes; returns how many were copied.
    pub fn copy(&mut self) -> usize {
        self.clipboard.copy_selection(self.ledger.current())
    }

    /// Paste the clipboard with fresh ids. `None` when the clipboard is empty.
    pub fn paste(&mut self) -> Option<Transition> {
        if self.clipboard.is_empty() {
            return None;
        }
        let mut taken: Vec<NodeId> = self.snapshot().nodes.iter().map(|n| n.id.clone()).collect();
        let next = ops::paste(self.snapshot(), &self.clipboard, |original| {
            let id = fresh_id(&format!("{original}-copy-"), &taken);
            taken.push(id.clone());
            id
        });
        self.commit(next)
    }

    /// Add a node at a random position in `[0, 400)²`.
    pub fn add_node(&mut self, label: Option<&str>) -> Option<Transition> {
        let mut rng = rand::rng();
        let position = Point::new(rng.random_range(0.0..ADD_NODE_SPREAD), rng.random_range(0.0..ADD_NODE_SPREAD));
        self.add_node_at(label, position)
    }

    /// Add a node at an explicit position.
    pub fn add_node_at(&mut self, label: Option<&str>, position: Point) -> Option<Transition> {
        let taken: Vec<NodeId> = self.snapshot().nodes.iter().map(|n| n.id.clone()).collect();
        let id = fresh_id("node-", &taken);
        let next = ops::add_node(self.snapshot(), id, label, position);
        self.commit(next)
    }

    pub fn delete_selected(&mut self) -> (Option<Transition>, Removed) {
        let (next, removed) = ops::delete_selected(self.snapshot());
        (self.commit(next), removed)
    }

    /// Connect two existing nodes.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownNode`] if either endpoint is missing.
    pub fn connect(&mut self, from: &str, to: &str) -> Result<Option<Transition>, EditError> {
        let next = ops::connect(self.snapshot(), from, to)?;
        Ok(self.commit(next))
    }

    pub fn select_all(&mut self) -> Option<Transition> {
        let next = ops::select_all(self.snapshot());
        self.commit(next)
    }

    pub fn deselect_all(&mut self) -> Option<Transition> {
        let next = ops::deselect_all(self.snapshot());
        self.commit(next)
    }

    /// Re-run the layout engine over the diagram description.
    pub fn reset_layout(&mut self) -> Option<Transition> {
        let next = ops::reset_layout(&self.data);
        self.commit(next)
    }

    /// Record `next` as an edit unless it equals the displayed snapshot.
    fn commit(&mut self, next: GraphSnapshot) -> Option<Transition> {
        if next == *self.ledger.current() {
            return None;
        }
        let transition = Transition::edit(next);
        self.ledger.observe(&transition);
        Some(transition)
    }
}

/// `prefix` + v4 uuid, retried until it collides with nothing in `taken`.
fn fresh_id(prefix: &str, taken: &[NodeId]) -> NodeId {
    loop {
        let candidate = format!("{prefix}{}", Uuid::new_v4());
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
}

fn changed(transition: Option<Transition>) -> Vec<Action> {
    match transition {
        Some(t) => vec![Action::StateChanged(t)],
        None => vec![Action::None],
    }
}

fn deleted(transition: Option<Transition>, removed: Removed) -> Vec<Action> {
    match transition {
        Some(t) => vec![
            Action::StateChanged(t),
            Action::Notify(format!("Deleted {} node(s) and {} edge(s)", removed.nodes, removed.edges)),
        ],
        None => vec![Action::None],
    }
}
