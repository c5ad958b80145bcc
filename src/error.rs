use crate::Span;
use std::borrow::Cow;
use std::fmt::{self, Debug, Display};

/// Error that can occur while loading a config.
///
/// Any failure aborts the whole load. Fields assigned by earlier lines keep
/// their values in the session; nothing is rolled back.
pub struct Error {
    /// The error kind
    pub kind: ErrorKind,
    /// Byte range of the offending text inside its line.
    ///
    /// Empty when the error did not originate from a line, e.g. a failed
    /// top-level file open.
    pub span: Span,
    /// Where the offending line was read from, when it came from a line.
    pub location: Option<Box<Location>>,
}

/// The line an [`Error`] was raised on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Name of the source the line was read from, usually a file path.
    pub source: String,
    /// 1-based line number within `source`.
    pub line: usize,
    /// The raw text of the line, untrimmed.
    pub text: String,
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            span: Span::default(),
            location: None,
        }
    }
}

impl From<(ErrorKind, Span)> for Error {
    fn from((kind, span): (ErrorKind, Span)) -> Self {
        Self {
            kind,
            span,
            location: None,
        }
    }
}

impl Error {
    /// A host-defined failure, typically raised by a
    /// [`CustomType`](crate::CustomType) hook.
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        ErrorKind::Custom(message.into()).into()
    }

    /// A required sub-field was not provided.
    pub fn missing_field(name: &'static str) -> Self {
        ErrorKind::MissingField(name).into()
    }

    /// Returns the line number the error was raised on, if known.
    pub fn line(&self) -> Option<usize> {
        self.location.as_ref().map(|loc| loc.line)
    }

    /// Sets the span unless one was already recorded.
    pub(crate) fn or_span(mut self, span: Span) -> Self {
        if self.span.is_empty() {
            self.span = span;
        }
        self
    }

    /// Attaches a location unless a nested include already attached one.
    pub(crate) fn or_location(mut self, source: &str, line: usize, text: &[u8]) -> Self {
        if self.location.is_none() {
            self.location = Some(Box::new(Location {
                source: source.to_owned(),
                line,
                text: String::from_utf8_lossy(text).into_owned(),
            }));
        }
        self
    }
}

/// Errors that can occur while loading a config.
pub enum ErrorKind {
    /// A malformed integer or float literal.
    InvalidNumber,

    /// An integer starting with `0` that is not `0b`, `0o` or `0x` prefixed.
    InvalidBase,

    /// The number does not fit the declared integer width.
    OutOfRange(&'static str),

    /// A boolean that is neither `true` nor `false`.
    InvalidBoolean,

    /// A value matching none of an enum's variants.
    InvalidEnumVariant {
        /// The value found.
        value: String,
        /// The declared variant names.
        expected: &'static [&'static str],
    },

    /// A tag matching none of a tagged union's variants.
    InvalidUnionVariant(String),

    /// A `tag(...)` whose closing parenthesis is missing, misplaced, or which
    /// encloses nothing.
    UnclosedParenthesis,

    /// A payload was given to a variant that carries none.
    UnexpectedPayload(&'static str),

    /// A variant that carries a payload was given without one.
    MissingPayload(&'static str),

    /// A fixed-size array received the wrong number of items.
    ArrayLength {
        /// The declared length.
        expected: usize,
        /// The number of items in the input.
        found: usize,
    },

    /// Wanted one kind of value, but found another.
    Wanted {
        /// Expected value type.
        expected: &'static str,
        /// Actually found value type.
        found: &'static str,
    },

    /// A required field was never assigned, or a custom hook is missing a
    /// sub-field.
    MissingField(&'static str),

    /// A custom error raised by a host hook.
    Custom(Cow<'static, str>),

    /// A line did not fit in the read buffer.
    LineTooLong(usize),

    /// A line is not valid UTF-8.
    InvalidUtf8,

    /// Includes nested deeper than the configured limit.
    IncludeTooDeep(u32),

    /// Two schema fields share a name.
    DuplicateField(&'static str),

    /// A schema field uses a reserved directive name.
    ReservedField(&'static str),

    /// Opening or reading a file or directory failed.
    Io {
        /// The path as written, relative to the directory it was opened from.
        path: String,
        /// The underlying error, unchanged.
        source: std::io::Error,
    },
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InvalidNumber => "invalid-number",
            Self::InvalidBase => "invalid-base",
            Self::OutOfRange(_) => "out-of-range",
            Self::InvalidBoolean => "invalid-boolean",
            Self::InvalidEnumVariant { .. } => "invalid-enum-variant",
            Self::InvalidUnionVariant(_) => "invalid-union-variant",
            Self::UnclosedParenthesis => "unclosed-parenthesis",
            Self::UnexpectedPayload(_) => "unexpected-payload",
            Self::MissingPayload(_) => "missing-payload",
            Self::ArrayLength { .. } => "array-length",
            Self::Wanted { .. } => "wanted",
            Self::MissingField(_) => "missing-field",
            Self::Custom(_) => "custom",
            Self::LineTooLong(_) => "line-too-long",
            Self::InvalidUtf8 => "invalid-utf8",
            Self::IncludeTooDeep(_) => "include-too-deep",
            Self::DuplicateField(_) => "duplicate-field",
            Self::ReservedField(_) => "reserved-field",
            Self::Io { .. } => "io",
        };
        f.write_str(text)
    }
}

impl Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("span", &self.span)
            .field("location", &self.location)
            .field("message", &format_args!("{self}"))
            .finish()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(loc) = &self.location {
            write!(f, "{}:{}: ", loc.source, loc.line)?;
        }
        match &self.kind {
            ErrorKind::InvalidNumber => f.write_str("invalid number"),
            ErrorKind::InvalidBase => {
                f.write_str("invalid number base, expected a `0b`, `0o` or `0x` prefix")
            }
            ErrorKind::OutOfRange(kind) => write!(f, "out of range of '{kind}'"),
            ErrorKind::InvalidBoolean => f.write_str("expected `true` or `false`"),
            ErrorKind::InvalidEnumVariant { value, expected } => {
                write!(f, "unknown variant `{value}`, expected one of [")?;
                let mut first = true;
                for name in *expected {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    f.write_str(name)?;
                }
                f.write_str("]")
            }
            ErrorKind::InvalidUnionVariant(tag) => write!(f, "unknown union variant `{tag}`"),
            ErrorKind::UnclosedParenthesis => f.write_str("unclosed or empty parenthesis"),
            ErrorKind::UnexpectedPayload(name) => {
                write!(f, "variant `{name}` does not take a payload")
            }
            ErrorKind::MissingPayload(name) => write!(f, "variant `{name}` requires a payload"),
            ErrorKind::ArrayLength { expected, found } => {
                write!(f, "expected {expected} array items, found {found}")
            }
            ErrorKind::Wanted { expected, found } => write!(f, "expected {expected}, found {found}"),
            ErrorKind::MissingField(field) => write!(f, "missing field '{field}'"),
            ErrorKind::Custom(message) => f.write_str(message),
            ErrorKind::LineTooLong(capacity) => {
                write!(f, "line does not fit in the {capacity} byte read buffer")
            }
            ErrorKind::InvalidUtf8 => f.write_str("line is not valid UTF-8"),
            ErrorKind::IncludeTooDeep(limit) => {
                write!(f, "includes nested deeper than {limit} levels")
            }
            ErrorKind::DuplicateField(name) => write!(f, "duplicate schema field `{name}`"),
            ErrorKind::ReservedField(name) => {
                write!(f, "schema field `{name}` uses a reserved directive name")
            }
            ErrorKind::Io { path, source } => write!(f, "`{path}`: {source}"),
        }
    }
}

#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;
