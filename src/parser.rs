//! Type-directed parsing of a single raw value.

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;

use std::num::IntErrorKind;

use crate::{
    Arena, Error, ErrorKind,
    schema::{IntKind, ScalarKind, TypeDesc, Variant},
    split::{Split, trim, unescape},
    value::Value,
};

/// Parses `raw` as a value of shape `desc`.
///
/// `raw` is expected to be trimmed already. Strings and arrays are allocated
/// in `arena`; everything else is returned by value. Recursion follows the
/// nesting of `desc`, not the input.
///
/// ```
/// use lineconf::{Arena, TypeDesc, Value, Variant, parse_value};
///
/// let arena = Arena::new();
/// let mode = TypeDesc::union([
///     Variant::with("time", TypeDesc::U64),
///     Variant::unit("zen"),
/// ]);
/// let value = parse_value(&mode, "time(1000)", &arena)?;
/// assert_eq!(value.as_union().map(|(tag, _)| tag), Some("time"));
/// # Ok::<(), lineconf::Error>(())
/// ```
pub fn parse_value<'a>(desc: &TypeDesc, raw: &str, arena: &'a Arena) -> Result<Value<'a>, Error> {
    match desc {
        TypeDesc::Scalar(kind) => parse_scalar(*kind, raw, arena),
        TypeDesc::Optional(inner) => {
            if raw == "none" {
                Ok(Value::Null)
            } else {
                parse_value(inner, raw, arena)
            }
        }
        TypeDesc::Enum(names) => match names.iter().find(|name| **name == raw) {
            Some(name) => Ok(Value::Enum(*name)),
            None => Err(ErrorKind::InvalidEnumVariant {
                value: raw.to_owned(),
                expected: *names,
            }
            .into()),
        },
        TypeDesc::Union(variants) => parse_union(variants, raw, arena),
        TypeDesc::FixedArray(element, len) => {
            let items = Split::new(raw);
            let found = items.item_count();
            if found != *len {
                return Err(ErrorKind::ArrayLength {
                    expected: *len,
                    found,
                }
                .into());
            }
            parse_items(element, items, found, arena)
        }
        TypeDesc::DynamicArray(element) => {
            let items = Split::new(raw);
            let count = items.item_count();
            parse_items(element, items, count, arena)
        }
        TypeDesc::Custom(hooks) => hooks.parse(raw, arena),
    }
}

fn parse_scalar<'a>(kind: ScalarKind, raw: &str, arena: &'a Arena) -> Result<Value<'a>, Error> {
    match kind {
        ScalarKind::String => Ok(Value::String(arena.alloc_str(raw))),
        ScalarKind::Bool => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(ErrorKind::InvalidBoolean.into()),
        },
        ScalarKind::Int(int) => match parse_integer(raw, int) {
            Ok(i) => Ok(Value::Integer(i)),
            Err(kind) => Err(kind.into()),
        },
        ScalarKind::Float => match raw.parse::<f64>() {
            Ok(f) => Ok(Value::Float(f)),
            Err(_) => Err(ErrorKind::InvalidNumber.into()),
        },
    }
}

/// Decimal, or base 2/8/16 behind a `0b`/`0o`/`0x` prefix (either case).
pub(crate) fn parse_integer(raw: &str, kind: IntKind) -> Result<i128, ErrorKind> {
    let bytes = raw.as_bytes();
    let (digits, radix) = if bytes.len() > 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'b' | b'B' => (&raw[2..], 2),
            b'o' | b'O' => (&raw[2..], 8),
            b'x' | b'X' => (&raw[2..], 16),
            _ => return Err(ErrorKind::InvalidBase),
        }
    } else {
        (raw, 10)
    };

    // `from_str_radix` would accept a sign after the prefix.
    if radix != 10 && digits.starts_with(['+', '-']) {
        return Err(ErrorKind::InvalidNumber);
    }

    let value = match i128::from_str_radix(digits, radix) {
        Ok(v) => v,
        Err(err) => {
            return Err(match err.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    ErrorKind::OutOfRange(kind.name())
                }
                _ => ErrorKind::InvalidNumber,
            });
        }
    };
    if value < kind.min() || value > kind.max() {
        return Err(ErrorKind::OutOfRange(kind.name()));
    }
    Ok(value)
}

/// `tag` or `tag(payload)`.
///
/// The payload runs from the first `(` to the last `)`; the two are not
/// matched against each other.
fn parse_union<'a>(variants: &[Variant], raw: &str, arena: &'a Arena) -> Result<Value<'a>, Error> {
    let (tag, payload) = match raw.find('(') {
        None => (raw, None),
        Some(open) => {
            let close = match raw.rfind(')') {
                Some(close) if close > open => close,
                _ => return Err(ErrorKind::UnclosedParenthesis.into()),
            };
            let inner = trim(&raw[open + 1..close]);
            if inner.is_empty() {
                return Err(ErrorKind::UnclosedParenthesis.into());
            }
            (&raw[..open], Some(inner))
        }
    };

    let Some(variant) = variants.iter().find(|v| v.name == tag) else {
        return Err(ErrorKind::InvalidUnionVariant(tag.to_owned()).into());
    };

    match (&variant.payload, payload) {
        (None, None) => Ok(Value::Union {
            tag: variant.name,
            payload: None,
        }),
        (Some(desc), Some(inner)) => {
            let value = parse_value(desc, inner, arena)?;
            Ok(Value::Union {
                tag: variant.name,
                payload: Some(arena.alloc_value(value)),
            })
        }
        (None, Some(_)) => Err(ErrorKind::UnexpectedPayload(variant.name).into()),
        (Some(_), None) => Err(ErrorKind::MissingPayload(variant.name).into()),
    }
}

/// Array items are trimmed and unescaped before their own parse; scalar
/// strings never are.
fn parse_items<'a>(
    element: &TypeDesc,
    mut items: Split<'_>,
    count: usize,
    arena: &'a Arena,
) -> Result<Value<'a>, Error> {
    let values = arena.alloc_slice_with(count, |_| {
        let item = items.next().unwrap_or_default();
        let item = unescape(trim(item), arena);
        parse_value(element, item, arena)
    })?;
    Ok(Value::Array(values))
}
