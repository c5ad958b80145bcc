//! Type descriptors and the field schema a session assigns into.

#[cfg(test)]
#[path = "./schema_tests.rs"]
mod tests;

use foldhash::HashMap;

use crate::{Arena, Error, ErrorKind, Value};

/// Directive names a schema field may not use.
pub const RESERVED_NAMES: [&str; 2] = ["include", "config_dir"];

/// Schemas with more than this many assignable fields get a hash index.
const INDEXED_SCHEMA_THRESHOLD: usize = 6;

/// Width and signedness of an integer field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntKind {
    pub signed: bool,
    pub bits: u8,
}

impl IntKind {
    pub const U8: IntKind = IntKind::new(false, 8);
    pub const U16: IntKind = IntKind::new(false, 16);
    pub const U32: IntKind = IntKind::new(false, 32);
    pub const U64: IntKind = IntKind::new(false, 64);
    pub const I8: IntKind = IntKind::new(true, 8);
    pub const I16: IntKind = IntKind::new(true, 16);
    pub const I32: IntKind = IntKind::new(true, 32);
    pub const I64: IntKind = IntKind::new(true, 64);

    /// `bits` must be between 1 and 64.
    pub const fn new(signed: bool, bits: u8) -> Self {
        assert!(bits >= 1 && bits <= 64, "integer width must be 1..=64 bits");
        Self { signed, bits }
    }

    pub const fn min(self) -> i128 {
        if self.signed {
            -(1i128 << (self.bits - 1))
        } else {
            0
        }
    }

    pub const fn max(self) -> i128 {
        if self.signed {
            (1i128 << (self.bits - 1)) - 1
        } else {
            (1i128 << self.bits) - 1
        }
    }

    /// Rust-style type name, used in `out-of-range` errors.
    pub const fn name(self) -> &'static str {
        match (self.signed, self.bits) {
            (false, 8) => "u8",
            (false, 16) => "u16",
            (false, 32) => "u32",
            (false, 64) => "u64",
            (true, 8) => "i8",
            (true, 16) => "i16",
            (true, 32) => "i32",
            (true, 64) => "i64",
            (false, _) => "unsigned integer",
            (true, _) => "signed integer",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int(IntKind),
    Float,
    /// An owned string, duplicated into the arena verbatim.
    String,
}

/// Host hooks for a struct-like field type the core does not look inside.
///
/// ```
/// use lineconf::{Arena, CustomType, Error, Value};
///
/// struct Hostname;
///
/// impl CustomType for Hostname {
///     fn name(&self) -> &'static str {
///         "hostname"
///     }
///
///     fn parse<'a>(&self, raw: &str, arena: &'a Arena) -> Result<Value<'a>, Error> {
///         if raw.is_empty() || raw.contains(' ') {
///             return Err(Error::custom("not a hostname"));
///         }
///         Ok(Value::String(arena.alloc_str(&raw.to_ascii_lowercase())))
///     }
/// }
/// ```
pub trait CustomType: Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Parses the trimmed raw text of a value.
    ///
    /// Everything returned must either be `'static` or allocated in `arena`.
    fn parse<'a>(&self, raw: &str, arena: &'a Arena) -> Result<Value<'a>, Error>;

    /// Called once per parsed value when the owning
    /// [`Instance`](crate::Instance) is released.
    fn release(&self, value: &Value<'_>) {
        let _ = value;
    }
}

/// One alternative of a tagged union.
#[derive(Clone, Debug)]
pub struct Variant {
    pub name: &'static str,
    /// `None` for variants written as a bare tag.
    pub payload: Option<TypeDesc>,
}

impl Variant {
    /// A variant written as a bare tag, e.g. `zen`.
    pub const fn unit(name: &'static str) -> Self {
        Self {
            name,
            payload: None,
        }
    }

    /// A variant written as `tag(payload)`.
    pub const fn with(name: &'static str, payload: TypeDesc) -> Self {
        Self {
            name,
            payload: Some(payload),
        }
    }
}

/// The shape of a value, guiding how its raw text is parsed.
#[derive(Clone)]
pub enum TypeDesc {
    Scalar(ScalarKind),
    /// `none` or the inner value.
    Optional(Box<TypeDesc>),
    /// One of the listed names, matched case-sensitively.
    Enum(&'static [&'static str]),
    /// `tag` or `tag(payload)`.
    Union(Vec<Variant>),
    /// Exactly `len` comma separated items.
    FixedArray(Box<TypeDesc>, usize),
    /// Any number of comma separated items.
    DynamicArray(Box<TypeDesc>),
    /// Parsing is handed to the host.
    Custom(&'static dyn CustomType),
}

impl TypeDesc {
    pub const BOOL: TypeDesc = TypeDesc::Scalar(ScalarKind::Bool);
    pub const U8: TypeDesc = TypeDesc::Scalar(ScalarKind::Int(IntKind::U8));
    pub const U16: TypeDesc = TypeDesc::Scalar(ScalarKind::Int(IntKind::U16));
    pub const U32: TypeDesc = TypeDesc::Scalar(ScalarKind::Int(IntKind::U32));
    pub const U64: TypeDesc = TypeDesc::Scalar(ScalarKind::Int(IntKind::U64));
    pub const I8: TypeDesc = TypeDesc::Scalar(ScalarKind::Int(IntKind::I8));
    pub const I16: TypeDesc = TypeDesc::Scalar(ScalarKind::Int(IntKind::I16));
    pub const I32: TypeDesc = TypeDesc::Scalar(ScalarKind::Int(IntKind::I32));
    pub const I64: TypeDesc = TypeDesc::Scalar(ScalarKind::Int(IntKind::I64));
    pub const F64: TypeDesc = TypeDesc::Scalar(ScalarKind::Float);
    pub const STRING: TypeDesc = TypeDesc::Scalar(ScalarKind::String);

    pub fn optional(inner: TypeDesc) -> Self {
        TypeDesc::Optional(Box::new(inner))
    }

    pub fn array(element: TypeDesc) -> Self {
        TypeDesc::DynamicArray(Box::new(element))
    }

    pub fn fixed_array(element: TypeDesc, len: usize) -> Self {
        TypeDesc::FixedArray(Box::new(element), len)
    }

    pub fn union(variants: impl IntoIterator<Item = Variant>) -> Self {
        TypeDesc::Union(variants.into_iter().collect())
    }

    /// Short description used in diagnostics and debugging output.
    pub fn type_str(&self) -> &'static str {
        match self {
            TypeDesc::Scalar(ScalarKind::Bool) => "boolean",
            TypeDesc::Scalar(ScalarKind::Int(kind)) => kind.name(),
            TypeDesc::Scalar(ScalarKind::Float) => "float",
            TypeDesc::Scalar(ScalarKind::String) => "string",
            TypeDesc::Optional(_) => "optional",
            TypeDesc::Enum(_) => "enum",
            TypeDesc::Union(_) => "union",
            TypeDesc::FixedArray(..) => "fixed array",
            TypeDesc::DynamicArray(_) => "array",
            TypeDesc::Custom(hooks) => hooks.name(),
        }
    }
}

impl std::fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeDesc::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            TypeDesc::Optional(inner) => f.debug_tuple("Optional").field(inner).finish(),
            TypeDesc::Enum(names) => f.debug_tuple("Enum").field(names).finish(),
            TypeDesc::Union(variants) => f.debug_tuple("Union").field(variants).finish(),
            TypeDesc::FixedArray(element, len) => {
                f.debug_tuple("FixedArray").field(element).field(len).finish()
            }
            TypeDesc::DynamicArray(element) => {
                f.debug_tuple("DynamicArray").field(element).finish()
            }
            TypeDesc::Custom(hooks) => f.debug_tuple("Custom").field(&hooks.name()).finish(),
        }
    }
}

/// A named, typed slot in the target instance.
#[derive(Clone, Debug)]
pub struct Field {
    pub name: &'static str,
    pub ty: TypeDesc,
    pub default: Option<Value<'static>>,
    /// Never assigned from input; keeps its default.
    pub skip: bool,
}

impl Field {
    /// Names starting with `_` are skipped automatically.
    pub fn new(name: &'static str, ty: TypeDesc) -> Self {
        Self {
            name,
            ty,
            default: None,
            skip: name.starts_with('_'),
        }
    }

    pub fn with_default(mut self, value: Value<'static>) -> Self {
        self.default = Some(value);
        self
    }

    /// Marks the field as a constant: it holds its default and input lines
    /// naming it are ignored like unknown fields.
    pub fn constant(mut self) -> Self {
        self.skip = true;
        self
    }

    /// The value the field holds before any line assigns it.
    pub fn initial_value(&self) -> Value<'static> {
        self.default.unwrap_or(Value::Null)
    }

    pub(crate) fn is_optional(&self) -> bool {
        matches!(self.ty, TypeDesc::Optional(_))
    }
}

/// An ordered set of uniquely named fields.
///
/// ```
/// use lineconf::{Field, Schema, TypeDesc};
///
/// let schema = Schema::new([
///     Field::new("magic", TypeDesc::U32),
///     Field::new("name", TypeDesc::STRING),
/// ])?;
/// assert_eq!(schema.find("name"), Some(1));
/// assert_eq!(schema.find("unknown"), None);
/// # Ok::<(), lineconf::Error>(())
/// ```
#[derive(Debug)]
pub struct Schema {
    fields: Vec<Field>,
    index: Option<HashMap<&'static str, usize>>,
}

impl Schema {
    /// Builds a schema, rejecting duplicate and reserved field names.
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Result<Self, Error> {
        let fields: Vec<Field> = fields.into_iter().collect();
        for (i, field) in fields.iter().enumerate() {
            if RESERVED_NAMES.contains(&field.name) {
                return Err(ErrorKind::ReservedField(field.name).into());
            }
            if fields[..i].iter().any(|prev| prev.name == field.name) {
                return Err(ErrorKind::DuplicateField(field.name).into());
            }
        }

        let assignable = fields.iter().filter(|f| !f.skip).count();
        let index = if assignable > INDEXED_SCHEMA_THRESHOLD {
            let mut map = HashMap::default();
            for (i, field) in fields.iter().enumerate() {
                if !field.skip {
                    map.insert(field.name, i);
                }
            }
            Some(map)
        } else {
            None
        };

        Ok(Self { fields, index })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the assignable field called `name`.
    ///
    /// Skip-marked fields are never found.
    pub fn find(&self, name: &str) -> Option<usize> {
        if let Some(index) = &self.index {
            return index.get(name).copied();
        }
        self.fields
            .iter()
            .position(|field| !field.skip && field.name == name)
    }

    /// Position of any field called `name`, skip-marked or not.
    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}
