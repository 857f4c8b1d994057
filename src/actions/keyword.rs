//! Actions on the keyword list of a set.

use std::any::Any;

use crate::core::{ScriptError, ScriptResult};
use crate::data::{Keyword, KeywordText, Set};
use crate::script::parse_template;

use super::generic::GenericAddAction;
use super::Action;

/// Adds keywords to, or removes keywords from, a set.
#[derive(Debug)]
pub struct AddKeywordAction {
    action: GenericAddAction<Keyword>,
}

impl AddKeywordAction {
    /// Add a blank keyword in the game's default mode.
    #[must_use]
    pub fn new_keyword(set: &Set) -> Self {
        let mut keyword = Keyword::new("");
        if let Some(mode) = set.game().default_keyword_mode() {
            keyword.mode = mode.name.clone();
        }
        Self::adding(set, keyword)
    }

    /// Add `keyword` at the end of the set's keywords.
    #[must_use]
    pub fn adding(set: &Set, keyword: Keyword) -> Self {
        Self {
            action: GenericAddAction::adding(set.keywords().len(), vec![keyword]),
        }
    }

    /// Remove the keywords at `indices`. `None` if none of them exists.
    #[must_use]
    pub fn removing(set: &Set, indices: &[usize]) -> Option<Self> {
        let positions: Vec<(usize, Keyword)> = indices
            .iter()
            .filter_map(|&i| Some((i, set.keywords().get(i)?.clone())))
            .collect();
        if positions.is_empty() {
            return None;
        }
        Some(Self {
            action: GenericAddAction::removing(positions),
        })
    }
}

impl Action<Set> for AddKeywordAction {
    fn name(&self, _to_undo: bool) -> String {
        self.action.name("keyword")
    }

    fn perform(&mut self, set: &mut Set, to_undo: bool) {
        let set = std::cell::RefCell::new(set);
        self.action.perform(
            to_undo,
            |pos, keyword| set.borrow_mut().insert_keyword(pos, keyword),
            |pos, _| {
                set.borrow_mut().remove_keyword(pos);
            },
        );
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Moves a keyword to another mode.
#[derive(Debug)]
pub struct ChangeKeywordModeAction {
    index: usize,
    mode: String,
}

impl ChangeKeywordModeAction {
    #[must_use]
    pub fn new(index: usize, mode: impl Into<String>) -> Self {
        Self {
            index,
            mode: mode.into(),
        }
    }
}

impl Action<Set> for ChangeKeywordModeAction {
    fn name(&self, _to_undo: bool) -> String {
        "Change keyword mode".to_string()
    }

    fn perform(&mut self, set: &mut Set, _to_undo: bool) {
        if let Some(keyword) = set.keyword_mut(self.index) {
            std::mem::swap(&mut keyword.mode, &mut self.mode);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Edits the name, match, reminder or rules text of a keyword.
///
/// A new reminder must be valid template text; that is checked when the
/// action is made. Successive edits of the same text merge.
#[derive(Debug)]
pub struct ChangeKeywordTextAction {
    index: usize,
    which: KeywordText,
    text: String,
}

impl ChangeKeywordTextAction {
    pub fn new(set: &Set, index: usize, which: KeywordText, text: impl Into<String>) -> ScriptResult<Self> {
        if set.keywords().get(index).is_none() {
            return Err(ScriptError::Usage(format!("no keyword at position {index}")));
        }
        let text = text.into();
        if which == KeywordText::Reminder {
            parse_template(&text)?;
        }
        Ok(Self { index, which, text })
    }
}

impl Action<Set> for ChangeKeywordTextAction {
    fn name(&self, _to_undo: bool) -> String {
        match self.which {
            KeywordText::Name => "Change keyword name",
            KeywordText::Match => "Change keyword match",
            KeywordText::Reminder => "Change reminder text",
            KeywordText::Rules => "Change keyword rules",
        }
        .to_string()
    }

    fn perform(&mut self, set: &mut Set, _to_undo: bool) {
        if let Some(keyword) = set.keyword_mut(self.index) {
            std::mem::swap(keyword.text_mut(self.which), &mut self.text);
        }
    }

    fn merge(&mut self, other: &dyn Action<Set>) -> bool {
        other
            .as_any()
            .downcast_ref::<ChangeKeywordTextAction>()
            .map_or(false, |o| o.index == self.index && o.which == self.which)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
