//! Value instances: a field realized on one card or set.

use std::rc::Rc;

use crate::core::ScriptError;
use crate::script::Value;

use super::field::Field;

/// The value of one field on one card.
///
/// `stored` is what the user entered (or `Default`); `display` is what the
/// field's scripts computed from it during the last refresh.
#[derive(Clone, Debug)]
pub struct ValueInstance {
    field: Rc<Field>,
    stored: Value,
    display: Value,
    error: Option<ScriptError>,
}

impl ValueInstance {
    /// A fresh instance holding the field's initial value.
    #[must_use]
    pub fn new(field: Rc<Field>) -> Self {
        let initial = field.initial_value();
        Self {
            field,
            stored: initial.clone(),
            display: initial,
            error: None,
        }
    }

    #[must_use]
    pub fn field(&self) -> &Rc<Field> {
        &self.field
    }

    /// The user-entered value.
    #[must_use]
    pub fn stored(&self) -> &Value {
        &self.stored
    }

    /// The computed value.
    #[must_use]
    pub fn display(&self) -> &Value {
        &self.display
    }

    /// Error of the last refresh, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<&ScriptError> {
        self.error.as_ref()
    }

    /// Replace the stored value, returning the old one.
    ///
    /// Unscripted fields show the stored value directly.
    pub fn set_stored(&mut self, value: Value) -> Value {
        if !self.field.is_scripted() {
            self.display = value.clone();
        }
        std::mem::replace(&mut self.stored, value)
    }

    /// Record the result of a refresh.
    pub fn set_result(&mut self, result: Result<Value, ScriptError>) {
        match result {
            Ok(v) => {
                self.display = v;
                self.error = None;
            }
            Err(e) => self.error = Some(e),
        }
    }

    /// Text shown for the computed value.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        self.field.display_string(&self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldId;
    use crate::data::field::FieldKind;
    use crate::script::Script;

    #[test]
    fn test_plain_field_shows_stored() {
        let field = Rc::new(Field::new(FieldId(0), "name", FieldKind::Text));
        let mut v = ValueInstance::new(field);
        let old = v.set_stored(Value::from("Bolt"));
        assert_eq!(old, Value::Default);
        assert_eq!(v.to_display_string(), "Bolt");
    }

    #[test]
    fn test_scripted_field_waits_for_refresh() {
        let field = Rc::new(
            Field::new(FieldId(0), "title", FieldKind::Text)
                .with_script(Script::parse("to_upper(value)").unwrap()),
        );
        let mut v = ValueInstance::new(field);
        v.set_stored(Value::from("bolt"));
        assert_eq!(v.display(), &Value::Default);

        v.set_result(Ok(Value::from("BOLT")));
        assert_eq!(v.to_display_string(), "BOLT");

        // a failed refresh keeps the previous display value
        v.set_result(Err(ScriptError::Name("x".into())));
        assert_eq!(v.to_display_string(), "BOLT");
        assert!(v.error().is_some());
    }
}
