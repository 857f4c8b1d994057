//! Field definitions.
//!
//! A `Field` is a named, typed slot shared by every card of a game (or by
//! the set itself, for set fields). Its optional scripts compute the
//! displayed value from the stored one.

use serde::{Deserialize, Serialize};

use crate::core::FieldId;
use crate::script::{Script, Value};

use super::color::Color;

/// A named colour offered by a colour field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorChoice {
    pub name: String,
    pub color: Color,
}

impl ColorChoice {
    #[must_use]
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

fn default_color_name() -> String {
    "Default".to_string()
}

fn yes() -> bool {
    true
}

/// What kind of value a field holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free (tagged) text.
    Text,
    /// One of a fixed list of names.
    Choice { choices: Vec<String> },
    /// A colour, optionally from a named palette.
    Color {
        #[serde(default)]
        choices: Vec<ColorChoice>,
        /// Shown while the value is `Default`.
        #[serde(default = "default_color_name")]
        default_name: String,
        #[serde(default)]
        initial: Option<Color>,
        #[serde(default = "yes")]
        allow_custom: bool,
    },
    Boolean,
    Number,
}

impl FieldKind {
    /// A colour field with the given palette and default settings.
    #[must_use]
    pub fn color(choices: Vec<ColorChoice>) -> Self {
        FieldKind::Color {
            choices,
            default_name: default_color_name(),
            initial: None,
            allow_custom: true,
        }
    }

    /// Type name as used in game files.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Choice { .. } => "choice",
            FieldKind::Color { .. } => "color",
            FieldKind::Boolean => "boolean",
            FieldKind::Number => "number",
        }
    }
}

/// Definition of one field.
///
/// ## Example
///
/// ```
/// use rust_cardsmith::core::FieldId;
/// use rust_cardsmith::data::{Field, FieldKind};
/// use rust_cardsmith::script::Script;
///
/// let title = Field::new(FieldId(1), "title", FieldKind::Text)
///     .with_script(Script::parse("to_upper(value)").unwrap())
///     .with_editable(false);
///
/// assert_eq!(title.name, "title");
/// assert!(title.script.is_some());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Index in the owning field list.
    pub id: FieldId,

    pub name: String,

    pub kind: FieldKind,

    /// Computes the displayed value; the current value is bound as `value`.
    #[serde(default)]
    pub script: Option<Script>,

    /// Computes the value while the stored one is `Default`.
    #[serde(default)]
    pub default_script: Option<Script>,

    #[serde(default)]
    pub description: String,

    #[serde(default = "yes")]
    pub editable: bool,
}

impl Field {
    /// Create a field without scripts.
    #[must_use]
    pub fn new(id: FieldId, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            script: None,
            default_script: None,
            description: String::new(),
            editable: true,
        }
    }

    #[must_use]
    pub fn with_script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    #[must_use]
    pub fn with_default_script(mut self, script: Script) -> Self {
        self.default_script = Some(script);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Does this field compute anything?
    #[must_use]
    pub fn is_scripted(&self) -> bool {
        self.script.is_some() || self.default_script.is_some()
    }

    /// Stored value of a fresh instance.
    ///
    /// Colour fields start at their `initial` colour, else the first
    /// choice; everything else starts at `Default`.
    #[must_use]
    pub fn initial_value(&self) -> Value {
        match &self.kind {
            FieldKind::Color {
                initial, choices, ..
            } => initial
                .or_else(|| choices.first().map(|c| c.color))
                .map_or(Value::Default, Value::Color),
            _ => Value::Default,
        }
    }

    /// Text shown for `value` in this field.
    #[must_use]
    pub fn display_string(&self, value: &Value) -> String {
        match (&self.kind, value) {
            (FieldKind::Color { default_name, .. }, Value::Default) => default_name.clone(),
            (FieldKind::Color { choices, .. }, Value::Color(c)) => choices
                .iter()
                .find(|choice| choice.color == *c)
                .map_or_else(|| "<color>".to_string(), |choice| choice.name.clone()),
            (FieldKind::Boolean, Value::Bool(b)) => if *b { "yes" } else { "no" }.to_string(),
            _ => value.to_string(),
        }
    }
}
