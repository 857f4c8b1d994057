//! Dependency tracker.
//!
//! Stores, for every dependent, the sources its last evaluation read, and
//! the reverse index from source to dependents for fast invalidation.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::CardId;

use super::{Dependent, Source};

/// Dependency graph of a document.
///
/// ## Example
///
/// ```
/// use rust_cardsmith::core::{CardId, FieldId};
/// use rust_cardsmith::deps::{DependencyTracker, Dependent, Source};
///
/// let mut tracker = DependencyTracker::new();
/// let title = Dependent::CardValue { card: CardId(0), field: FieldId(1) };
/// tracker.record(title, [Source::CardField { card: Some(CardId(0)), field: "name".into() }]);
///
/// let stale = tracker.stale_after(&Source::CardField { card: Some(CardId(0)), field: "name".into() });
/// assert!(stale.contains(&title));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DependencyTracker {
    /// Sources read by each dependent's last evaluation.
    sources_of: FxHashMap<Dependent, FxHashSet<Source>>,

    /// Reverse index.
    dependents_of: FxHashMap<Source, FxHashSet<Dependent>>,
}

impl DependencyTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recorded sources of `dependent`.
    pub fn record(&mut self, dependent: Dependent, sources: impl IntoIterator<Item = Source>) {
        self.forget(dependent);
        let sources: FxHashSet<Source> = sources.into_iter().collect();
        for source in &sources {
            self.dependents_of
                .entry(source.clone())
                .or_default()
                .insert(dependent);
        }
        self.sources_of.insert(dependent, sources);
    }

    /// Remove every edge of `dependent`.
    pub fn forget(&mut self, dependent: Dependent) {
        let Some(old) = self.sources_of.remove(&dependent) else {
            return;
        };
        // Remove from reverse index and clean up empty entries
        for source in old {
            if let Some(set) = self.dependents_of.get_mut(&source) {
                set.remove(&dependent);
                if set.is_empty() {
                    self.dependents_of.remove(&source);
                }
            }
        }
    }

    /// Remove every dependent living on `card`, and every edge pointing at it.
    pub fn forget_card(&mut self, card: CardId) {
        let owned: Vec<Dependent> = self
            .sources_of
            .keys()
            .filter(|d| d.card() == Some(card))
            .copied()
            .collect();
        for dependent in owned {
            self.forget(dependent);
        }
    }

    /// Has `dependent` been evaluated under tracking?
    #[must_use]
    pub fn is_recorded(&self, dependent: Dependent) -> bool {
        self.sources_of.contains_key(&dependent)
    }

    /// Sources recorded for `dependent`.
    #[must_use]
    pub fn sources(&self, dependent: Dependent) -> Option<&FxHashSet<Source>> {
        self.sources_of.get(&dependent)
    }

    /// Dependents recorded directly against `source`, in a stable order.
    #[must_use]
    pub fn dependents_of(&self, source: &Source) -> Vec<Dependent> {
        let mut out: Vec<Dependent> = self
            .dependents_of
            .get(source)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// Dependents that must be re-evaluated after `changed` was modified.
    ///
    /// A change to a field of one card also invalidates readers of that
    /// field on any card.
    #[must_use]
    pub fn stale_after(&self, changed: &Source) -> FxHashSet<Dependent> {
        let mut stale = FxHashSet::default();
        let mut add = |source: &Source| {
            if let Some(set) = self.dependents_of.get(source) {
                stale.extend(set.iter().copied());
            }
        };
        match changed {
            Source::CardField {
                card: Some(_),
                field,
            } => {
                add(changed);
                add(&Source::CardField {
                    card: None,
                    field: field.clone(),
                });
            }
            Source::CardField { card: None, field } => {
                for source in self.dependents_of.keys() {
                    if matches!(source, Source::CardField { field: f, .. } if f == field) {
                        add(source);
                    }
                }
            }
            other => add(other),
        }
        stale
    }

    /// Every dependent that reads the field named `field`, on any card or
    /// on the set.
    #[must_use]
    pub fn dependents_of_field(&self, field: &str) -> Vec<Dependent> {
        let mut out: FxHashSet<Dependent> = FxHashSet::default();
        for (source, set) in &self.dependents_of {
            let reads_field = match source {
                Source::CardField { field: f, .. } => f == field,
                Source::SetField(f) => f == field,
                _ => false,
            };
            if reads_field {
                out.extend(set.iter().copied());
            }
        }
        let mut out: Vec<Dependent> = out.into_iter().collect();
        out.sort();
        out
    }

    /// Number of dependents with recorded sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources_of.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources_of.is_empty()
    }

    /// Drop every edge.
    pub fn clear(&mut self) {
        self.sources_of.clear();
        self.dependents_of.clear();
    }
}
