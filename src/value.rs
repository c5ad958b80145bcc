#[cfg(test)]
#[path = "./value_tests.rs"]
mod tests;

use std::fmt;

/// A parsed value.
///
/// Strings, arrays and payloads borrow from the [`Arena`](crate::Arena) of the
/// session that produced them (or are `'static`, e.g. schema defaults and
/// enum names). `Value` is `Copy`; dropping the arena invalidates all of them
/// at once.
#[derive(Copy, Clone, PartialEq)]
pub enum Value<'a> {
    /// An absent optional, or a field that was never assigned and has no
    /// default.
    Null,
    Bool(bool),
    /// Any integer width; the schema bounds the range.
    Integer(i128),
    Float(f64),
    String(&'a str),
    /// The matched variant name of an enum.
    Enum(&'a str),
    /// A tagged union variant.
    Union {
        tag: &'a str,
        payload: Option<&'a Value<'a>>,
    },
    /// Fixed and dynamic arrays alike.
    Array(&'a [Value<'a>]),
    /// Named sub-values, produced by [`CustomType`](crate::CustomType) hooks.
    Record(&'a [(&'a str, Value<'a>)]),
}

impl<'a> Value<'a> {
    /// Describes the value's kind for error messages.
    pub fn type_str(&self) -> &'static str {
        match self {
            Value::Null => "none",
            Value::Bool(_) => "a boolean",
            Value::Integer(_) => "an integer",
            Value::Float(_) => "a float",
            Value::String(_) => "a string",
            Value::Enum(_) => "an enum variant",
            Value::Union { .. } => "a union variant",
            Value::Array(_) => "an array",
            Value::Record(_) => "a record",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(*s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_enum(&self) -> Option<&'a str> {
        match self {
            Value::Enum(name) => Some(*name),
            _ => None,
        }
    }

    /// Returns the tag and optional payload of a union variant.
    #[inline]
    pub fn as_union(&self) -> Option<(&'a str, Option<&'a Value<'a>>)> {
        match self {
            Value::Union { tag, payload } => Some((*tag, *payload)),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&'a [Value<'a>]> {
        match self {
            Value::Array(items) => Some(*items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_record(&self) -> Option<&'a [(&'a str, Value<'a>)]> {
        match self {
            Value::Record(entries) => Some(*entries),
            _ => None,
        }
    }

    /// Looks up a named entry of a record; first match wins.
    pub fn field(&self, name: &str) -> Option<&'a Value<'a>> {
        let entries = self.as_record()?;
        entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("none"),
            Value::Bool(b) => fmt::Debug::fmt(b, f),
            Value::Integer(i) => fmt::Debug::fmt(i, f),
            Value::Float(v) => fmt::Debug::fmt(v, f),
            Value::String(s) => fmt::Debug::fmt(s, f),
            Value::Enum(name) => f.write_str(name),
            Value::Union { tag, payload: None } => f.write_str(tag),
            Value::Union {
                tag,
                payload: Some(payload),
            } => write!(f, "{tag}({payload:?})"),
            Value::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Record(entries) => {
                let mut map = f.debug_map();
                for (key, value) in entries.iter() {
                    map.entry(key, value);
                }
                map.finish()
            }
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};
        match self {
            Value::Null => ser.serialize_none(),
            Value::Bool(b) => ser.serialize_bool(*b),
            Value::Integer(i) => match i64::try_from(*i) {
                Ok(small) => ser.serialize_i64(small),
                Err(_) => ser.serialize_i128(*i),
            },
            Value::Float(v) => ser.serialize_f64(*v),
            Value::String(s) | Value::Enum(s) => ser.serialize_str(s),
            Value::Union { tag, payload: None } => ser.serialize_str(tag),
            Value::Union {
                tag,
                payload: Some(payload),
            } => {
                let mut map = ser.serialize_map(Some(1))?;
                map.serialize_entry(tag, payload)?;
                map.end()
            }
            Value::Array(items) => {
                let mut seq = ser.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(entries) => {
                let mut map = ser.serialize_map(Some(entries.len()))?;
                for (key, value) in entries.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
