//! Undo history.
//!
//! Undo removes the most recently added shape. The history records the
//! identity of every shape added through the editor, newest last, bounded
//! by `max_depth`. Shapes deleted by other means since they were recorded
//! are skipped, so undo always removes something that is still visible.

use dd_core::{Scene, Shape, ShapeId};

pub struct History {
    added: Vec<ShapeId>,
    /// Maximum undo depth.
    max_depth: usize,
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            added: Vec::with_capacity(max_depth.min(64)),
            max_depth,
        }
    }

    /// Record a newly added shape.
    pub fn record(&mut self, id: ShapeId) {
        self.added.push(id);
        if self.added.len() > self.max_depth {
            self.added.remove(0);
        }
    }

    /// Drop a record without touching the scene (a discarded draw gesture).
    pub fn forget(&mut self, id: ShapeId) {
        self.added.retain(|recorded| *recorded != id);
    }

    /// Remove the newest recorded shape still present in `scene`.
    pub fn undo(&mut self, scene: &mut Scene) -> Option<Shape> {
        while let Some(id) = self.added.pop() {
            if let Some(shape) = scene.remove(id) {
                log::debug!("history: undo {}", shape.id);
                return Some(shape);
            }
        }
        None
    }

    pub fn can_undo(&self, scene: &Scene) -> bool {
        self.added.iter().any(|id| scene.contains(*id))
    }

    pub fn len(&self) -> usize {
        self.added.len()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }

    pub fn clear(&mut self) {
        self.added.clear();
    }
}
