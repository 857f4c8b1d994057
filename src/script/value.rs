//! Script values.
//!
//! Every expression evaluates to a [`Value`]. Values are immutable and
//! cheap to clone: strings, collections, functions and objects sit behind
//! an `Rc`, so composite operations build new values instead of mutating
//! shared ones.
//!
//! ## Kinds
//!
//! - `Int`, `Double`: numbers; arithmetic widens `Int` to `Double`
//! - `String`: text (usually tagged text from a card field)
//! - `Bool`, `Color`
//! - `Function`: builtins, closures and curried rules
//! - `Collection`: ordered list of values
//! - `Object`: opaque handle to a card or set, compared by identity
//! - `Default`: "not set, use the computed default"

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::core::{ScriptError, ScriptResult};
use crate::data::color::{parse_color, Color};

use super::function::ScriptFunction;
use super::object::ScriptObject;

/// Discriminant of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Default,
    Int,
    Double,
    String,
    Bool,
    Color,
    Function,
    Collection,
    Object,
}

impl ValueKind {
    /// Name used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Default => "nil",
            ValueKind::Int => "integer",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Bool => "boolean",
            ValueKind::Color => "color",
            ValueKind::Function => "function",
            ValueKind::Collection => "collection",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A script value.
#[derive(Clone, Default)]
pub enum Value {
    /// Not explicitly set.
    #[default]
    Default,
    Int(i64),
    Double(f64),
    String(Rc<str>),
    Bool(bool),
    Color(Color),
    Function(Rc<dyn ScriptFunction>),
    Collection(Rc<Vec<Value>>),
    Object(Rc<dyn ScriptObject>),
}

impl Value {
    /// Build a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Build a collection value.
    pub fn collection(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Collection(Rc::new(items.into_iter().collect()))
    }

    /// Wrap a function.
    pub fn function(f: impl ScriptFunction + 'static) -> Self {
        Value::Function(Rc::new(f))
    }

    /// Wrap an object.
    pub fn object(o: impl ScriptObject + 'static) -> Self {
        Value::Object(Rc::new(o))
    }

    /// The kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Default => ValueKind::Default,
            Value::Int(_) => ValueKind::Int,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
            Value::Color(_) => ValueKind::Color,
            Value::Function(_) => ValueKind::Function,
            Value::Collection(_) => ValueKind::Collection,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Name of the value's type, for error messages. Objects report their
    /// own type name.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Value::Object(o) => o.type_name().to_string(),
            Value::Function(f) => format!("function '{}'", f.name()),
            other => other.kind().name().to_string(),
        }
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Value::Default)
    }

    // === Coercions ===

    /// Coerce to an integer. Doubles truncate, strings are parsed.
    pub fn to_int(&self) -> ScriptResult<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Double(d) => Ok(*d as i64),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::String(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().map(|d| d as i64))
                    .ok_or_else(|| {
                        ScriptError::Type(format!("can not convert \"{s}\" to integer"))
                    })
            }
            other => Err(ScriptError::expected("integer", &other.type_name())),
        }
    }

    /// Coerce to a double. Strings are parsed.
    pub fn to_double(&self) -> ScriptResult<f64> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Double(d) => Ok(*d),
            Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
                ScriptError::Type(format!("can not convert \"{s}\" to double"))
            }),
            other => Err(ScriptError::expected("double", &other.type_name())),
        }
    }

    /// Coerce to a boolean. `Default` is false.
    pub fn to_bool(&self) -> ScriptResult<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Default => Ok(false),
            Value::Int(i) => Ok(*i != 0),
            Value::Double(d) => Ok(*d != 0.0),
            Value::String(s) => match s.as_ref() {
                "true" | "yes" => Ok(true),
                "false" | "no" | "" => Ok(false),
                _ => Err(ScriptError::Type(format!(
                    "can not convert \"{s}\" to boolean"
                ))),
            },
            other => Err(ScriptError::expected("boolean", &other.type_name())),
        }
    }

    /// Coerce to a colour. Strings are parsed.
    pub fn to_color(&self) -> ScriptResult<Color> {
        match self {
            Value::Color(c) => Ok(*c),
            Value::String(s) => parse_color(s).ok_or_else(|| {
                ScriptError::Type(format!("can not convert \"{s}\" to color"))
            }),
            other => Err(ScriptError::expected("color", &other.type_name())),
        }
    }

    /// Borrow the function inside this value.
    pub fn as_function(&self) -> ScriptResult<&Rc<dyn ScriptFunction>> {
        match self {
            Value::Function(f) => Ok(f),
            other => Err(ScriptError::expected("function", &other.type_name())),
        }
    }

    /// Borrow the string inside this value without coercion.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Downcast an object value to a concrete host type.
    #[must_use]
    pub fn as_object<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Object(o) => o.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    // === Collections ===

    /// Start iterating over this value.
    ///
    /// Collections yield their items, strings their characters, iterable
    /// objects (a set) their members. The iterator is restartable and
    /// never mutates the source.
    pub fn make_iterator(&self) -> ScriptResult<ValueIter> {
        let source = match self {
            Value::Collection(items) => IterSource::Items(items.clone()),
            Value::String(s) => IterSource::Chars(s.clone()),
            Value::Default => IterSource::Items(Rc::new(Vec::new())),
            Value::Object(o) => match o.items() {
                Some(items) => IterSource::Items(Rc::new(items)),
                None => {
                    return Err(ScriptError::Type(format!(
                        "can not iterate over {}",
                        o.type_name()
                    )))
                }
            },
            other => {
                return Err(ScriptError::Type(format!(
                    "can not iterate over {}",
                    other.type_name()
                )))
            }
        };
        Ok(ValueIter { source, pos: 0 })
    }

    /// Number of items, for values that have them.
    pub fn item_count(&self) -> ScriptResult<usize> {
        match self {
            Value::Collection(items) => Ok(items.len()),
            Value::String(s) => Ok(s.chars().count()),
            Value::Default => Ok(0),
            Value::Object(o) => o.item_count().ok_or_else(|| {
                ScriptError::Type(format!("{} has no items", o.type_name()))
            }),
            other => Err(ScriptError::Type(format!(
                "{} has no items",
                other.type_name()
            ))),
        }
    }
}

/// Structural equality of script values.
///
/// - numbers compare by value, with `Int`/`Double` widening
/// - strings by content, collections element-wise
/// - objects by identity, functions by pointer
/// - values of different kinds are otherwise never equal
#[must_use]
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Default, Value::Default) => true,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Double(x), Value::Double(y)) => x == y,
        (Value::Int(x), Value::Double(y)) | (Value::Double(y), Value::Int(x)) => {
            (*x as f64) == *y
        }
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Color(x), Value::Color(y)) => x == y,
        (Value::Collection(x), Value::Collection(y)) => {
            Rc::ptr_eq(x, y)
                || (x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| equal(p, q)))
        }
        (Value::Object(x), Value::Object(y)) => x.identity() == y.identity(),
        (Value::Function(x), Value::Function(y)) => {
            std::ptr::eq(Rc::as_ptr(x) as *const (), Rc::as_ptr(y) as *const ())
        }
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equal(self, other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Default => Ok(()),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Color(c) => write!(f, "{c}"),
            Value::Function(func) => write!(f, "<{}>", func.name()),
            Value::Collection(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(o) => f.write_str(&o.display()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Default => f.write_str("Default"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Double(d) => write!(f, "Double({d})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Color(c) => write!(f, "Color({c})"),
            Value::Function(func) => write!(f, "Function({})", func.name()),
            Value::Collection(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Object(o) => write!(f, "Object({:?})", o.identity()),
        }
    }
}

// Convenient From implementations
impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Rc::from(v))
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Collection(Rc::new(v))
    }
}

#[derive(Clone, Debug)]
enum IterSource {
    Items(Rc<Vec<Value>>),
    Chars(Rc<str>),
}

/// Restartable, finite iterator over a value.
///
/// Holds a shared reference to the source; strings are walked lazily one
/// character at a time.
#[derive(Clone, Debug)]
pub struct ValueIter {
    source: IterSource,
    /// Item index, or byte offset for strings.
    pos: usize,
}

impl ValueIter {
    /// Rewind to the first item.
    pub fn restart(&mut self) {
        self.pos = 0;
    }
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match &self.source {
            IterSource::Items(items) => {
                let item = items.get(self.pos)?.clone();
                self.pos += 1;
                Some(item)
            }
            IterSource::Chars(s) => {
                let c = s.get(self.pos..)?.chars().next()?;
                self.pos += c.len_utf8();
                Some(Value::string(c.encode_utf8(&mut [0; 4])))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Value::from(1).kind(), ValueKind::Int);
        assert_eq!(Value::from(1.5).kind(), ValueKind::Double);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(Value::Default.kind(), ValueKind::Default);
        assert_eq!(Value::collection([]).kind(), ValueKind::Collection);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(2.0).to_string(), "2");
        assert_eq!(Value::from(0.25).to_string(), "0.25");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::Default.to_string(), "");
        assert_eq!(
            Value::collection([Value::from(1), Value::from("a")]).to_string(),
            "[1, a]"
        );
    }

    #[test]
    fn test_equality_rules() {
        assert!(equal(&Value::from(1), &Value::from(1.0)));
        assert!(equal(&Value::from("ab"), &Value::from("ab")));
        assert!(!equal(&Value::from("1"), &Value::from(1)));
        assert!(!equal(&Value::from(true), &Value::from(1)));
        assert!(equal(
            &Value::collection([Value::from(1), Value::from("x")]),
            &Value::collection([Value::from(1.0), Value::from("x")])
        ));
        assert!(equal(&Value::Default, &Value::Default));
    }

    #[test]
    fn test_coercions() {
        assert_eq!(Value::from(" 12 ").to_int(), Ok(12));
        assert_eq!(Value::from(3.9).to_int(), Ok(3));
        assert_eq!(Value::from("2.5").to_double(), Ok(2.5));
        assert!(Value::from("abc").to_int().is_err());
        assert_eq!(Value::from("yes").to_bool(), Ok(true));
        assert_eq!(Value::Default.to_bool(), Ok(false));
        assert!(Value::from("maybe").to_bool().is_err());
        assert_eq!(
            Value::from("rgb(1,2,3)").to_color(),
            Ok(Color::rgb(1, 2, 3))
        );
    }

    #[test]
    fn test_iterator_is_restartable() {
        let list = Value::collection([Value::from(1), Value::from(2)]);
        let mut it = list.make_iterator().unwrap();
        assert_eq!(it.next(), Some(Value::from(1)));
        assert_eq!(it.next(), Some(Value::from(2)));
        assert_eq!(it.next(), None);
        it.restart();
        assert_eq!(it.next(), Some(Value::from(1)));
        // source untouched
        assert_eq!(list.item_count(), Ok(2));
    }

    #[test]
    fn test_string_iteration() {
        let chars: Vec<String> = Value::from("hé!")
            .make_iterator()
            .unwrap()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(chars, vec!["h", "é", "!"]);
    }

    #[test]
    fn test_non_iterable() {
        assert!(Value::from(5).make_iterator().is_err());
        assert!(Value::from(true).item_count().is_err());
    }
}
