//! Conversion of loaded [`Value`]s into host types.

#[cfg(test)]
#[path = "./de_tests.rs"]
mod tests;

use crate::{Error, ErrorKind, value::Value};

/// Converts a [`Value`] borrowed from a session arena into `Self`.
///
/// Implemented for the primitive types, strings, [`Option`], [`Vec`], arrays
/// and [`Value`] itself. Host types parsed by a
/// [`CustomType`](crate::CustomType) usually implement it with a
/// [`RecordHelper`].
pub trait Deserialize<'a>: Sized {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error>;
}

/// Builds an [`ErrorKind::Wanted`] error for `found`.
#[cold]
pub fn expected(expected: &'static str, found: &Value<'_>) -> Error {
    ErrorKind::Wanted {
        expected,
        found: found.type_str(),
    }
    .into()
}

impl<'a> Deserialize<'a> for Value<'a> {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        Ok(*value)
    }
}

impl<'a> Deserialize<'a> for bool {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        match value.as_bool() {
            Some(b) => Ok(b),
            None => Err(expected("a bool", value)),
        }
    }
}

fn deser_integer(value: &Value<'_>, min: i128, max: i128, name: &'static str) -> Result<i128, Error> {
    match value.as_i128() {
        Some(i) if i >= min && i <= max => Ok(i),
        Some(_) => Err(ErrorKind::OutOfRange(name).into()),
        None => Err(expected("an integer", value)),
    }
}

macro_rules! integer {
    ($($num:ty),+) => {$(
        impl<'a> Deserialize<'a> for $num {
            fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
                match deser_integer(value, <$num>::MIN as i128, <$num>::MAX as i128, stringify!($num)) {
                    Ok(i) => Ok(i as $num),
                    Err(e) => Err(e),
                }
            }
        }
    )+};
}

integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<'a> Deserialize<'a> for i128 {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        deser_integer(value, i128::MIN, i128::MAX, "i128")
    }
}

impl<'a> Deserialize<'a> for f32 {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        match value.as_f64() {
            Some(f) => Ok(f as f32),
            None => Err(expected("a float", value)),
        }
    }
}

impl<'a> Deserialize<'a> for f64 {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        match value.as_f64() {
            Some(f) => Ok(f),
            None => Err(expected("a float", value)),
        }
    }
}

/// Strings and enum variant names both convert to text.
impl<'a> Deserialize<'a> for &'a str {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        match value {
            Value::String(s) | Value::Enum(s) => Ok(*s),
            _ => Err(expected("a string", value)),
        }
    }
}

impl<'a> Deserialize<'a> for String {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        <&str>::deserialize(value).map(str::to_owned)
    }
}

impl<'a> Deserialize<'a> for Box<str> {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        <&str>::deserialize(value).map(Box::from)
    }
}

impl<'a, T: Deserialize<'a>> Deserialize<'a> for Option<T> {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(None),
            value => T::deserialize(value).map(Some),
        }
    }
}

impl<'a, T: Deserialize<'a>> Deserialize<'a> for Vec<T> {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        let Some(items) = value.as_array() else {
            return Err(expected("an array", value));
        };
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            result.push(T::deserialize(item)?);
        }
        Ok(result)
    }
}

impl<'a, T: Deserialize<'a>, const N: usize> Deserialize<'a> for [T; N] {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        let items = Vec::<T>::deserialize(value)?;
        let found = items.len();
        match <[T; N]>::try_from(items) {
            Ok(array) => Ok(array),
            Err(_) => Err(ErrorKind::ArrayLength { expected: N, found }.into()),
        }
    }
}

/// Named lookups into a [`Value::Record`].
///
/// ```
/// use lineconf::{Deserialize, Error, RecordHelper, Value};
///
/// struct Point {
///     x: u8,
///     y: u8,
/// }
///
/// impl<'a> Deserialize<'a> for Point {
///     fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
///         let record = RecordHelper::new(value)?;
///         Ok(Point {
///             x: record.required("x")?,
///             y: record.optional("y")?.unwrap_or(0),
///         })
///     }
/// }
///
/// let entries = [("x", Value::Integer(3))];
/// let point = Point::deserialize(&Value::Record(&entries))?;
/// assert_eq!((point.x, point.y), (3, 0));
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RecordHelper<'a> {
    entries: &'a [(&'a str, Value<'a>)],
}

impl<'a> RecordHelper<'a> {
    /// Fails unless `value` is a record.
    pub fn new(value: &Value<'a>) -> Result<Self, Error> {
        match value.as_record() {
            Some(entries) => Ok(Self { entries }),
            None => Err(expected("a record", value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first entry called `name`.
    pub fn get(&self, name: &str) -> Option<&'a Value<'a>> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Converts the entry called `name`, failing with
    /// [`ErrorKind::MissingField`] when there is none.
    pub fn required<T: Deserialize<'a>>(&self, name: &'static str) -> Result<T, Error> {
        let Some(value) = self.get(name) else {
            return Err(Error::missing_field(name));
        };
        T::deserialize(value)
    }

    /// Converts the entry called `name`, if there is one.
    pub fn optional<T: Deserialize<'a>>(&self, name: &str) -> Result<Option<T>, Error> {
        match self.get(name) {
            Some(value) => T::deserialize(value).map(Some),
            None => Ok(None),
        }
    }
}

/// Types that convert from values of any arena lifetime.
///
/// Useful for trait bounds on values that outlive the session that loaded
/// them.
pub trait DeserializeOwned: for<'a> Deserialize<'a> {}
impl<T> DeserializeOwned for T where T: for<'a> Deserialize<'a> {}
