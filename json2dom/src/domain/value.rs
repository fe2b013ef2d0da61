//! Property values assigned onto constructed elements.

use std::fmt;
use std::rc::Rc;

/// Callable reference stored in event-handler style properties.
///
/// Cloning shares the underlying function; equality is reference identity.
#[derive(Clone)]
pub struct Callback {
    name: String,
    func: Rc<dyn Fn()>,
}

impl Callback {
    pub fn new(name: impl Into<String>, func: impl Fn() + 'static) -> Self {
        Self {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    /// Name the callback was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the callback.
    pub fn call(&self) {
        (self.func)()
    }

    /// True if both values refer to the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({})", self.name)
    }
}

/// Scalar or callable value of a named property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Handler(Callback),
}

impl PropValue {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropValue::Null => "null",
            PropValue::Bool(_) => "boolean",
            PropValue::Number(_) => "number",
            PropValue::String(_) => "string",
            PropValue::Handler(_) => "function",
        }
    }

    /// String conversion applied when a string-typed property receives this value.
    pub fn to_display_string(&self) -> String {
        match self {
            PropValue::Null => "null".to_string(),
            PropValue::Bool(b) => b.to_string(),
            PropValue::Number(n) => format_number(*n),
            PropValue::String(s) => s.clone(),
            PropValue::Handler(cb) => format!("function {}() {{ [native code] }}", cb.name()),
        }
    }

    /// Truthiness applied when a boolean-typed property receives this value.
    pub fn truthy(&self) -> bool {
        match self {
            PropValue::Null => false,
            PropValue::Bool(b) => *b,
            PropValue::Number(n) => *n != 0.0 && !n.is_nan(),
            PropValue::String(s) => !s.is_empty(),
            PropValue::Handler(_) => true,
        }
    }

    /// Numeric conversion applied when a number-typed property receives this value.
    /// Returns NaN for values without a numeric reading.
    pub fn to_number(&self) -> f64 {
        match self {
            PropValue::Null => 0.0,
            PropValue::Bool(b) => f64::from(u8::from(*b)),
            PropValue::Number(n) => *n,
            PropValue::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            PropValue::Handler(_) => f64::NAN,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Callback> {
        match self {
            PropValue::Handler(cb) => Some(cb),
            _ => None,
        }
    }
}

/// Formats whole numbers without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::String(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(f64::from(value))
    }
}

impl From<Callback> for PropValue {
    fn from(value: Callback) -> Self {
        PropValue::Handler(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;

    #[rstest]
    #[case(PropValue::Null, "null")]
    #[case(PropValue::Bool(true), "true")]
    #[case(PropValue::Number(3.0), "3")]
    #[case(PropValue::Number(-0.5), "-0.5")]
    #[case(PropValue::Number(f64::NAN), "NaN")]
    #[case(PropValue::String("w3-input".into()), "w3-input")]
    fn test_display_string(#[case] value: PropValue, #[case] expected: &str) {
        assert_eq!(value.to_display_string(), expected);
    }

    #[rstest]
    #[case(PropValue::Null, false)]
    #[case(PropValue::Number(0.0), false)]
    #[case(PropValue::Number(f64::NAN), false)]
    #[case(PropValue::String(String::new()), false)]
    #[case(PropValue::String("false".into()), true)]
    #[case(PropValue::Bool(true), true)]
    fn test_truthy(#[case] value: PropValue, #[case] expected: bool) {
        assert_eq!(value.truthy(), expected);
    }

    #[test]
    fn test_to_number() {
        assert_eq!(PropValue::String(" 12 ".into()).to_number(), 12.0);
        assert_eq!(PropValue::String(String::new()).to_number(), 0.0);
        assert_eq!(PropValue::Bool(true).to_number(), 1.0);
        assert!(PropValue::String("abc".into()).to_number().is_nan());
    }

    #[test]
    fn given_cloned_callback_when_comparing_then_equal_by_identity() {
        let hits = std::rc::Rc::new(Cell::new(0));
        let counter = hits.clone();
        let cb = Callback::new("summon", move || counter.set(counter.get() + 1));
        let other = Callback::new("summon", || {});

        assert_eq!(cb, cb.clone());
        assert_ne!(cb, other);

        cb.clone().call();
        assert_eq!(hits.get(), 1);
    }
}
