//! Parse sessions, the line assembler and the finished [`Instance`].

#[cfg(test)]
#[path = "./session_tests.rs"]
mod tests;

use crate::{
    Arena, Error, ErrorKind, Span,
    de::Deserialize,
    dir::{Directory, FsDir},
    parser::parse_value,
    schema::{Schema, TypeDesc},
    split::trim,
    value::Value,
};

/// Tunables for a [`Session`].
///
/// ```
/// use lineconf::Options;
///
/// let options = Options::new().with_buffer_capacity(512).with_max_include_depth(4);
/// assert_eq!(options.buffer_capacity, 512);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Size of the read buffer used when streaming a file. A line longer
    /// than this fails with [`ErrorKind::LineTooLong`].
    pub buffer_capacity: usize,
    /// How many `include` directives may be nested inside each other.
    pub max_include_depth: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            buffer_capacity: 4096,
            max_include_depth: 32,
        }
    }
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read buffer size. Clamped to at least one byte.
    #[must_use]
    pub fn with_buffer_capacity(mut self, bytes: usize) -> Self {
        self.buffer_capacity = bytes.max(1);
        self
    }

    #[must_use]
    pub fn with_max_include_depth(mut self, depth: u32) -> Self {
        self.max_include_depth = depth;
        self
    }
}

/// One load of a config into the fields of a [`Schema`].
///
/// Every string and array the session produces lives in the borrowed
/// [`Arena`]; dropping the arena releases all of them at once. Lines are
/// applied in order, so a later assignment overrides an earlier one.
///
/// ```
/// use lineconf::{Arena, Field, Schema, Session, TypeDesc};
///
/// let schema = Schema::new([
///     Field::new("magic", TypeDesc::U32),
///     Field::new("name", TypeDesc::STRING),
/// ])?;
/// let arena = Arena::new();
/// let mut session = Session::new(&schema, &arena);
/// session.feed_str("magic 42\nname  lineconf\n")?;
/// session.apply_line("magic 0x2b")?;
///
/// let instance = session.finish();
/// assert_eq!(instance.required::<u32>("magic")?, 43);
/// assert_eq!(instance.required::<&str>("name")?, "lineconf");
/// # Ok::<(), lineconf::Error>(())
/// ```
pub struct Session<'a, D: Directory = FsDir> {
    pub(crate) schema: &'a Schema,
    pub(crate) arena: &'a Arena,
    pub(crate) dir: D,
    pub(crate) values: &'a mut [Value<'a>],
    pub(crate) options: Options,
    /// Number of files currently being streamed.
    pub(crate) depth: u32,
}

impl<'a> Session<'a, FsDir> {
    /// A session resolving paths against the process working directory.
    pub fn new(schema: &'a Schema, arena: &'a Arena) -> Self {
        Self::with_dir(schema, arena, FsDir::cwd())
    }
}

impl<'a, D: Directory> Session<'a, D> {
    /// A session resolving `include` and `config_dir` paths against `dir`.
    pub fn with_dir(schema: &'a Schema, arena: &'a Arena, dir: D) -> Self {
        let values = arena.alloc_slice_fill_mut(schema.len(), Value::Null);
        for (slot, field) in values.iter_mut().zip(schema.fields()) {
            *slot = field.initial_value();
        }
        Self {
            schema,
            arena,
            dir,
            values,
            options: Options::default(),
            depth: 0,
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The directory relative paths currently resolve against.
    pub fn dir(&self) -> &D {
        &self.dir
    }

    /// Applies a single line of input.
    ///
    /// Blank lines and `#` comments do nothing. Lines naming no assignable
    /// field are ignored. The returned error carries the span of the value
    /// within `line` but no location; streaming callers attach that.
    pub fn apply_line(&mut self, line: &str) -> Result<(), Error> {
        let trimmed = trim(line);
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }
        let (name, value) = match trimmed.find([' ', '\t']) {
            Some(end) => (&trimmed[..end], trim(&trimmed[end..])),
            None => (trimmed, &trimmed[trimmed.len()..]),
        };
        let span = Span::of(value, line);

        match name {
            "config_dir" => {
                let dir = self.dir.open_dir(value).map_err(|source| {
                    Error::from((
                        ErrorKind::Io {
                            path: value.to_owned(),
                            source,
                        },
                        span,
                    ))
                })?;
                tracing::debug!(path = value, "changed config directory");
                self.dir = dir;
                Ok(())
            }
            "include" => self.feed_file(value).map_err(|err| {
                if err.location.is_none() {
                    err.or_span(span)
                } else {
                    err
                }
            }),
            _ => {
                let Some(index) = self.schema.find(name) else {
                    tracing::debug!(field = name, "ignoring unknown field");
                    return Ok(());
                };
                let field = &self.schema.fields()[index];
                let parsed =
                    parse_value(&field.ty, value, self.arena).map_err(|err| err.or_span(span))?;
                tracing::trace!(field = name, value = ?parsed, "assigned field");
                self.values[index] = parsed;
                Ok(())
            }
        }
    }

    /// The fields as assigned so far.
    pub fn instance(&self) -> Instance<'_> {
        Instance {
            schema: self.schema,
            values: &*self.values,
        }
    }

    /// Ends the session, handing out the assigned fields for as long as the
    /// arena lives.
    pub fn finish(self) -> Instance<'a> {
        Instance {
            schema: self.schema,
            values: self.values,
        }
    }
}

/// The loaded values of a [`Schema`], one per field in declaration order.
#[derive(Clone, Copy)]
pub struct Instance<'a> {
    schema: &'a Schema,
    values: &'a [Value<'a>],
}

impl<'a> Instance<'a> {
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn values(&self) -> &'a [Value<'a>] {
        self.values
    }

    /// The value of the field called `name`, including skip-marked fields.
    pub fn get(&self, name: &str) -> Option<&'a Value<'a>> {
        let index = self.schema.position(name)?;
        self.values.get(index)
    }

    /// Field names paired with their values, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'a Value<'a>)> + 'a {
        let names = self.schema.fields().iter().map(|field| field.name);
        names.zip(self.values.iter())
    }

    /// Converts the field called `name`.
    ///
    /// A non-optional field that was never assigned and has no default fails
    /// with [`ErrorKind::MissingField`].
    pub fn required<T: Deserialize<'a>>(&self, name: &'static str) -> Result<T, Error> {
        let Some(index) = self.schema.position(name) else {
            return Err(Error::missing_field(name));
        };
        let value = &self.values[index];
        if value.is_null() && !self.schema.fields()[index].is_optional() {
            return Err(Error::missing_field(name));
        }
        T::deserialize(value)
    }

    /// Converts the field called `name`, or returns `None` when it is absent,
    /// unassigned or `none`.
    pub fn optional<T: Deserialize<'a>>(&self, name: &str) -> Result<Option<T>, Error> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value).map(Some),
        }
    }

    /// Runs the [`CustomType::release`](crate::CustomType::release) hook of
    /// every custom value held by this instance.
    ///
    /// The memory itself is returned when the arena is dropped.
    pub fn release(self) {
        for (field, value) in self.schema.fields().iter().zip(self.values) {
            release_value(&field.ty, value);
        }
    }
}

impl std::fmt::Debug for Instance<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

fn release_value(desc: &TypeDesc, value: &Value<'_>) {
    match (desc, value) {
        (_, Value::Null) => {}
        (TypeDesc::Custom(hooks), value) => hooks.release(value),
        (TypeDesc::Optional(inner), value) => release_value(inner, value),
        (TypeDesc::FixedArray(element, _) | TypeDesc::DynamicArray(element), Value::Array(items)) => {
            for item in items.iter() {
                release_value(element, item);
            }
        }
        (
            TypeDesc::Union(variants),
            Value::Union {
                tag,
                payload: Some(payload),
            },
        ) => {
            let payload_desc = variants
                .iter()
                .find(|variant| variant.name == *tag)
                .and_then(|variant| variant.payload.as_ref());
            if let Some(payload_desc) = payload_desc {
                release_value(payload_desc, payload);
            }
        }
        _ => {}
    }
}

/// Loads `text` into a fresh session over `schema`.
///
/// `include` and `config_dir` resolve against the process working directory.
pub fn parse_str<'a>(schema: &'a Schema, arena: &'a Arena, text: &str) -> Result<Instance<'a>, Error> {
    let mut session = Session::new(schema, arena);
    session.feed_str(text)?;
    Ok(session.finish())
}

/// Loads the file at `path` into a fresh session over `schema`.
pub fn parse_file<'a>(schema: &'a Schema, arena: &'a Arena, path: &str) -> Result<Instance<'a>, Error> {
    let mut session = Session::new(schema, arena);
    session.feed_file(path)?;
    Ok(session.finish())
}

/// Loads a config that ships with the program, e.g. via `include_str!`.
///
/// Such input is part of the build, so a failure is a bug in the program
/// rather than something a caller could recover from.
///
/// # Panics
///
/// Panics with the error message if `text` fails to load.
pub fn parse_embedded<'a>(schema: &'a Schema, arena: &'a Arena, text: &str) -> Instance<'a> {
    match parse_str(schema, arena, text) {
        Ok(instance) => instance,
        Err(err) => panic!("embedded config failed to load: {err}"),
    }
}
