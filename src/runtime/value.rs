//! Tagged runtime values.
//!
//! The host boxes whatever it observes into a [`Value`] before inference
//! and rendering run. Rust values get there through [`ToValue`], values
//! coming over a JSON bridge through `From<serde_json::Value>`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// A pre-classified runtime value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Set(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    Object(Object),
}

/// An instance of a user class, known only by name
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Object {
    /// Class name, e.g. `Point`
    pub class: String,
    /// Declaring module, e.g. `geometry`; `None` for builtins
    pub module: Option<String>,
    /// The object's own textual form, if it has one
    pub repr: Option<String>,
}

impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Object {
            class: class.into(),
            module: None,
            repr: None,
        }
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn repr(mut self, repr: impl Into<String>) -> Self {
        self.repr = Some(repr.into());
        self
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl Value {
    /// Runtime class name, as `type(value).__name__` would report it
    pub fn class_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Set(_) => "set",
            Value::Dict(_) => "dict",
            Value::Object(object) => &object.class,
        }
    }

    /// Module the value's class is declared in
    pub fn module(&self) -> &str {
        match self {
            Value::Object(Object {
                module: Some(module),
                ..
            }) => module,
            _ => "builtins",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Elements of a non-mapping container
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i128::from(*b)),
            _ => None,
        }
    }

    /// Numeric value; ints widen to float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Conversion of host values into [`Value`]
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for Object {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl ToValue for () {
    fn to_value(&self) -> Value {
        Value::None
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! int_to_value {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(*self as i128)
                }
            }
        )*
    };
}

int_to_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::None,
        }
    }
}

impl<T: ToValue> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue, S> ToValue for HashSet<T, S> {
    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::Set(self.iter().map(ToValue::to_value).collect())
    }
}

impl<K: ToValue, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Dict(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Dict(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
}

macro_rules! tuple_to_value {
    ($($name:ident),+) => {
        impl<$($name: ToValue),+> ToValue for ($($name,)+) {
            #[allow(non_snake_case)]
            fn to_value(&self) -> Value {
                let ($($name,)+) = self;
                Value::Tuple(vec![$($name.to_value()),+])
            }
        }
    };
}

tuple_to_value!(A);
tuple_to_value!(A, B);
tuple_to_value!(A, B, C);
tuple_to_value!(A, B, C, D);

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Int(i128::from(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Dict(
                map.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names() {
        assert_eq!(Value::None.class_name(), "NoneType");
        assert_eq!(5i32.to_value().class_name(), "int");
        assert_eq!("x".to_value().class_name(), "str");
        assert_eq!((1, "a").to_value().class_name(), "tuple");
        assert_eq!(Object::new("Point").to_value().class_name(), "Point");
    }

    #[test]
    fn test_option_boxes_to_none() {
        let missing: Option<i32> = None;
        assert!(missing.to_value().is_none());
        assert_eq!(Some(3).to_value(), Value::Int(3));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(4).as_int(), Some(4));
        assert_eq!(Value::Bool(true).as_int(), Some(1));
        assert_eq!(Value::Int(2).as_float(), Some(2.0));
        assert_eq!("hi".to_value().as_str(), Some("hi"));
        assert_eq!(Value::None.as_int(), None);
    }

    #[test]
    fn test_module_defaults_to_builtins() {
        assert_eq!(Value::Int(1).module(), "builtins");
        assert_eq!(Object::new("Point").to_value().module(), "builtins");
        let located = Object::new("Point").module("geometry").to_value();
        assert_eq!(located.module(), "geometry");
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"name": "ada", "tags": [1, 2.5, null]}"#).unwrap();
        let value = Value::from(json);
        let Value::Dict(entries) = value else {
            panic!("expected dict");
        };
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&(
            Value::Str("tags".to_string()),
            Value::List(vec![Value::Int(1), Value::Float(2.5), Value::None]),
        )));
    }
}
