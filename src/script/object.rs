//! Opaque host objects visible to scripts.
//!
//! The document model exposes cards and sets to scripts through this
//! trait. Scripts can read members (`card.name`), iterate (`for each c in
//! set`) and compare objects by identity; they can never mutate them.

use std::any::Any;
use std::fmt;

use crate::core::{ObjectId, ScriptResult};
use crate::deps::{Dependency, Source};

use super::value::Value;

/// A host object reachable from a script.
pub trait ScriptObject: fmt::Debug {
    /// Name of the object's type, e.g. `"card"`.
    fn type_name(&self) -> &'static str;

    /// Identity used for equality.
    fn identity(&self) -> ObjectId;

    /// Read a member. Unknown members fail with a name error.
    fn member(&self, name: &str) -> ScriptResult<Value>;

    /// Items when iterating, `None` if the object is not iterable.
    fn items(&self) -> Option<Vec<Value>> {
        None
    }

    /// Number of items, `None` if the object is not iterable.
    fn item_count(&self) -> Option<usize> {
        self.items().map(|items| items.len())
    }

    /// The document state read by accessing `member` on behalf of `dep`.
    ///
    /// Objects that are not part of the document return `None`.
    fn dependency_source(&self, member: &str, dep: &Dependency) -> Option<Source> {
        let _ = (member, dep);
        None
    }

    /// Members whose reads are document state, used when a script reads a
    /// member chosen at run time.
    fn member_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Text shown when the object is converted to a string.
    fn display(&self) -> String {
        format!("<{}>", self.type_name())
    }

    fn as_any(&self) -> &dyn Any;
}
