//! Undo/redo history.
//!
//! ```text
//!   undo stack            redo stack
//!   [a1, a2, a3]  undo()  [a4]
//!            ----------->
//!            <-----------
//!                 redo()
//! ```
//!
//! Adding an action performs it and clears the redo stack. An action that
//! can [`merge`](super::Action::merge) with the top of the undo stack is
//! folded into it, so typing a word or dragging a point is undone in one
//! step.

use log::{debug, trace};

use super::Action;

/// Undo and redo stacks for edits of a `T`.
pub struct ActionStack<T: 'static> {
    undo: Vec<Box<dyn Action<T>>>,
    redo: Vec<Box<dyn Action<T>>>,
    /// Undo depth at which the target was last saved.
    save_point: Option<usize>,
    undo_limit: Option<usize>,
}

impl<T: 'static> Default for ActionStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ActionStack<T> {
    /// An empty stack, at its save point, without an undo limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            save_point: Some(0),
            undo_limit: None,
        }
    }

    /// Keep at most `limit` undo steps.
    #[must_use]
    pub fn with_undo_limit(mut self, limit: Option<usize>) -> Self {
        self.undo_limit = limit;
        self
    }

    /// Perform `action` on `target` and push it.
    ///
    /// With `allow_merge`, the action is first offered to the top of the
    /// undo stack.
    pub fn add(&mut self, mut action: Box<dyn Action<T>>, target: &mut T, allow_merge: bool) {
        debug!("Performing action: {}", action.name(false));
        action.perform(target, false);

        if self.save_point.map_or(false, |sp| sp > self.undo.len()) {
            // the saved state was on the redo stack and is now unreachable
            self.save_point = None;
        }
        self.redo.clear();

        if allow_merge {
            if let Some(top) = self.undo.last_mut() {
                if top.merge(action.as_ref()) {
                    trace!("Merged into: {}", top.name(false));
                    if self.save_point == Some(self.undo.len()) {
                        self.save_point = None;
                    }
                    return;
                }
            }
        }

        self.undo.push(action);
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.undo_limit else {
            return;
        };
        if self.undo.len() <= limit {
            return;
        }
        let excess = self.undo.len() - limit;
        self.undo.drain(..excess);
        self.save_point = self.save_point.and_then(|sp| sp.checked_sub(excess));
        trace!("Dropped {excess} old undo steps");
    }

    /// Undo the last action, returning its name.
    pub fn undo(&mut self, target: &mut T) -> Option<String> {
        let mut action = self.undo.pop()?;
        let name = action.name(true);
        debug!("Undo: {name}");
        action.perform(target, true);
        self.redo.push(action);
        Some(name)
    }

    /// Redo the last undone action, returning its name.
    pub fn redo(&mut self, target: &mut T) -> Option<String> {
        let mut action = self.redo.pop()?;
        let name = action.name(false);
        debug!("Redo: {name}");
        action.perform(target, false);
        self.undo.push(action);
        Some(name)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Name of the action [`undo`](Self::undo) would take back.
    #[must_use]
    pub fn undo_name(&self) -> Option<String> {
        self.undo.last().map(|a| a.name(true))
    }

    /// Name of the action [`redo`](Self::redo) would perform again.
    #[must_use]
    pub fn redo_name(&self) -> Option<String> {
        self.redo.last().map(|a| a.name(false))
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Is the target in the state it was in when last saved?
    #[must_use]
    pub fn at_save_point(&self) -> bool {
        self.save_point == Some(self.undo.len())
    }

    /// Mark the current state as saved.
    pub fn set_save_point(&mut self) {
        self.save_point = Some(self.undo.len());
    }

    /// Forget all history. The current state counts as saved.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.save_point = Some(0);
    }

    /// The last action, if it is an `A`, for extending it in place.
    ///
    /// Used for continuous edits such as dragging: the first move is
    /// added as an action and later moves update it, so one undo reverts
    /// the whole gesture.
    pub fn extend_last<A: Action<T>>(&mut self) -> Option<&mut A> {
        if !self.redo.is_empty() {
            return None;
        }
        let depth = self.undo.len();
        let top = self.undo.last_mut()?;
        let action = top.as_any_mut().downcast_mut::<A>()?;
        if self.save_point == Some(depth) {
            self.save_point = None;
        }
        Some(action)
    }
}
