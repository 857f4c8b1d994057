//! Reversible edits and the undo stack.
//!
//! Every change to a document goes through an [`Action`]. An action owns
//! enough state to apply its effect and to take it back exactly: after
//! `perform(target, false)` followed by `perform(target, true)` the
//! target is bit-for-bit what it was before.
//!
//! Most actions are swaps. They hold the "other" state; performing swaps
//! it with the target's state, so performing twice toggles between old
//! and new and the `to_undo` flag only matters for the name.
//!
//! ## Modules
//!
//! - `stack`: [`ActionStack`], undo/redo with merging and a save point
//! - `generic`: adding and removing items of a list
//! - `card`, `keyword`: edits of a [`Set`](crate::data::Set)
//! - `symbol_part`: edits of a [`Symbol`](crate::data::Symbol)

pub mod card;
pub mod generic;
pub mod keyword;
pub mod stack;
pub mod symbol_part;

pub use card::{AddCardAction, ChangeCardStyleAction, ValueAction, ValueTarget};
pub use generic::{AddingOrRemoving, GenericAddAction};
pub use keyword::{AddKeywordAction, ChangeKeywordModeAction, ChangeKeywordTextAction};
pub use stack::ActionStack;
pub use symbol_part::{
    constrain_snap_vector, constrain_snap_vector_offset, constrain_snap_vector_offset2,
    constrain_vector, control_point_remove_action, snap_vector, ControlPointAddAction,
    ControlPointMoveAction, ControlPointUpdate, CurveDragAction, HandleMoveAction,
    LockModeAction, SegmentModeAction, SymmetryCopiesAction, SymmetryMoveAction,
    SymmetryTypeAction,
};

use std::any::Any;

/// A reversible edit of a `T`.
pub trait Action<T>: Any {
    /// Label for menus, e.g. "Undo Add card" shows `name(true)`.
    fn name(&self, to_undo: bool) -> String;

    /// Apply the edit, or take it back when `to_undo` is set.
    ///
    /// Never fails: constructors check everything that could go wrong.
    fn perform(&mut self, target: &mut T, to_undo: bool);

    /// Absorb `other`, which was performed right after `self`.
    ///
    /// Returns `true` if `self` now covers both edits and `other` can be
    /// dropped.
    fn merge(&mut self, other: &dyn Action<T>) -> bool {
        let _ = other;
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
