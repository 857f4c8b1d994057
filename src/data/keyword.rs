//! Keywords: named abilities whose reminder text is generated.
//!
//! A keyword's match text may contain parameters written as
//! `<atom-param>type</atom-param>`, e.g. `Cycling <atom-param>cost</atom-param>`.
//! The parameter type supplies the regex a parameter must match. The
//! reminder is template text with `{...}` interpolations that see the
//! parameters as `param1`, `param2`, ...

use serde::{Deserialize, Serialize};

/// A keyword definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    /// Name of the keyword, e.g. `Flying`.
    pub keyword: String,

    /// Text to match; the name when empty.
    #[serde(default, rename = "match")]
    pub match_text: String,

    /// Reminder text template.
    #[serde(default)]
    pub reminder: String,

    /// Rules text, informational only.
    #[serde(default)]
    pub rules: String,

    /// Name of the keyword mode.
    #[serde(default)]
    pub mode: String,
}

impl Keyword {
    #[must_use]
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            match_text: String::new(),
            reminder: String::new(),
            rules: String::new(),
            mode: String::new(),
        }
    }

    #[must_use]
    pub fn with_match(mut self, match_text: impl Into<String>) -> Self {
        self.match_text = match_text.into();
        self
    }

    #[must_use]
    pub fn with_reminder(mut self, reminder: impl Into<String>) -> Self {
        self.reminder = reminder.into();
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// The text that is matched against card text.
    #[must_use]
    pub fn effective_match(&self) -> &str {
        if self.match_text.is_empty() {
            &self.keyword
        } else {
            &self.match_text
        }
    }
}

/// Which text of a keyword a [`ChangeKeywordTextAction`] edits.
///
/// [`ChangeKeywordTextAction`]: crate::actions::ChangeKeywordTextAction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeywordText {
    Name,
    Match,
    Reminder,
    Rules,
}

impl Keyword {
    /// Mutable access to one of the keyword's texts.
    pub fn text_mut(&mut self, which: KeywordText) -> &mut String {
        match which {
            KeywordText::Name => &mut self.keyword,
            KeywordText::Match => &mut self.match_text,
            KeywordText::Reminder => &mut self.reminder,
            KeywordText::Rules => &mut self.rules,
        }
    }
}

fn any_text() -> String {
    ".+?".to_string()
}

/// Type of a keyword parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordParamType {
    pub name: String,

    /// Regex a parameter of this type matches.
    #[serde(default = "any_text", rename = "match")]
    pub match_regex: String,

    /// Applied to the parameter before the reminder sees it; the
    /// parameter is bound as `input`.
    #[serde(default)]
    pub reminder_script: Option<crate::script::Script>,
}

impl KeywordParamType {
    #[must_use]
    pub fn new(name: impl Into<String>, match_regex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            match_regex: match_regex.into(),
            reminder_script: None,
        }
    }

    #[must_use]
    pub fn with_reminder_script(mut self, script: crate::script::Script) -> Self {
        self.reminder_script = Some(script);
        self
    }
}

/// A keyword mode, e.g. `core` or `expert`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMode {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Mode given to new keywords.
    #[serde(default)]
    pub is_default: bool,
}

impl KeywordMode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            is_default: false,
        }
    }

    #[must_use]
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_match() {
        assert_eq!(Keyword::new("Flying").effective_match(), "Flying");
        let kw = Keyword::new("Cycling").with_match("Cycling <atom-param>cost</atom-param>");
        assert!(kw.effective_match().contains("atom-param"));
    }

    #[test]
    fn test_text_mut() {
        let mut kw = Keyword::new("Flying");
        *kw.text_mut(KeywordText::Reminder) = "can't be blocked".into();
        assert_eq!(kw.reminder, "can't be blocked");
    }

    #[test]
    fn test_param_type_default_regex() {
        let t: KeywordParamType = serde_json::from_str(r#"{"name":"name"}"#).unwrap();
        assert_eq!(t.match_regex, ".+?");
    }
}
