//! Recording reads during one evaluation.

use rustc_hash::FxHashSet;

use crate::script::ScriptObject;

use super::{Dependency, Source};

/// Collects the sources read while evaluating one dependent.
#[derive(Clone, Debug)]
pub struct DependencyRecorder {
    dep: Dependency,
    sources: FxHashSet<Source>,
    suspended: u32,
}

impl DependencyRecorder {
    /// Start recording on behalf of `dep`.
    #[must_use]
    pub fn new(dep: Dependency) -> Self {
        Self {
            dep,
            sources: FxHashSet::default(),
            suspended: 0,
        }
    }

    /// The dependency being recorded.
    #[must_use]
    pub fn dependency(&self) -> &Dependency {
        &self.dep
    }

    /// Record a read. Ignored while suspended.
    pub fn mark(&mut self, source: Source) {
        if self.suspended == 0 {
            self.sources.insert(source);
        }
    }

    /// Stop recording until the matching [`resume`](Self::resume).
    ///
    /// Suspensions nest.
    pub fn suspend(&mut self) {
        self.suspended += 1;
    }

    pub fn resume(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended > 0
    }

    /// Sources recorded so far.
    #[must_use]
    pub fn sources(&self) -> &FxHashSet<Source> {
        &self.sources
    }

    /// Stop recording and return everything read.
    #[must_use]
    pub fn finish(self) -> FxHashSet<Source> {
        self.sources
    }
}

/// Register that evaluating `dep`'s expression read `member` of `entity`.
///
/// Objects outside the document (or members that are not document state)
/// record nothing.
pub fn mark_dependency_member(
    recorder: &mut DependencyRecorder,
    entity: &dyn ScriptObject,
    member: &str,
    dep: &Dependency,
) {
    if let Some(source) = entity.dependency_source(member, dep) {
        recorder.mark(source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardId, FieldId};
    use crate::deps::Dependent;

    fn dep() -> Dependency {
        Dependency::new(Dependent::CardValue {
            card: CardId(0),
            field: FieldId(0),
        })
    }

    #[test]
    fn test_mark_and_finish() {
        let mut rec = DependencyRecorder::new(dep());
        rec.mark(Source::CardList);
        rec.mark(Source::CardList);
        rec.mark(Source::Keywords);
        let sources = rec.finish();
        assert_eq!(sources.len(), 2);
        assert!(sources.contains(&Source::Keywords));
    }

    #[test]
    fn test_suspend_nests() {
        let mut rec = DependencyRecorder::new(dep());
        rec.suspend();
        rec.suspend();
        rec.resume();
        rec.mark(Source::CardList);
        assert!(rec.is_suspended());
        rec.resume();
        rec.mark(Source::Keywords);
        assert!(!rec.is_suspended());
        assert_eq!(rec.sources().len(), 1);
        assert!(rec.sources().contains(&Source::Keywords));
    }
}
