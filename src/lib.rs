//! A schema-guided loader for line-oriented text configs.
//!
//! Every non-blank line is `name value`; the host describes the shape of each
//! named field with a [`Schema`] and the loader parses the raw text into a
//! typed [`Value`] per field. Values can be booleans, sized integers, floats,
//! strings, optionals, enums, tagged unions, comma separated arrays and host
//! defined types. Two directives, `include` and `config_dir`, pull in further
//! files relative to a [`Directory`].
//!
//! All strings and arrays produced while loading live in a caller supplied
//! [`Arena`] and are released together when it is dropped.
//!
//! # Examples
//!
//! ```
//! use lineconf::{Arena, Error, Field, Schema, Session, TypeDesc, Value, Variant};
//!
//! let schema = Schema::new([
//!     Field::new("auto_start", TypeDesc::Enum(&["off", "on"])),
//!     Field::new("magic", TypeDesc::U32),
//!     Field::new(
//!         "mode",
//!         TypeDesc::union([
//!             Variant::with("time", TypeDesc::U64),
//!             Variant::with("score", TypeDesc::U32),
//!             Variant::unit("zen"),
//!         ]),
//!     ),
//!     Field::new("tags", TypeDesc::array(TypeDesc::STRING)),
//!     Field::new("retries", TypeDesc::optional(TypeDesc::U8)),
//! ])?;
//!
//! let content = "
//! # comments and unknown fields are ignored
//! auto_start   on
//! magic        42
//! mode         time(1000)
//! tags         fast, a\\,b
//! colour       blue
//! ";
//!
//! let arena = Arena::new();
//! let mut session = Session::new(&schema, &arena);
//! session.feed_str(content)?;
//! let config = session.finish();
//!
//! assert_eq!(config.required::<&str>("auto_start")?, "on");
//! assert_eq!(config.required::<u32>("magic")?, 42);
//! let (tag, payload) = config.get("mode").and_then(Value::as_union).unwrap();
//! assert_eq!((tag, payload), ("time", Some(&Value::Integer(1000))));
//! assert_eq!(config.required::<Vec<String>>("tags")?, ["fast", "a,b"]);
//! assert_eq!(config.optional::<u8>("retries")?, None);
//! # Ok::<(), Error>(())
//! ```

mod arena;
mod de;
mod dir;
mod error;
mod parser;
mod schema;
mod session;
mod span;
mod split;
mod stream;
mod value;

pub use arena::Arena;
pub use de::{Deserialize, DeserializeOwned, RecordHelper, expected};
pub use dir::{Directory, FsDir};
pub use error::{Error, ErrorKind, Location};
pub use parser::parse_value;
pub use schema::{CustomType, Field, IntKind, RESERVED_NAMES, ScalarKind, Schema, TypeDesc, Variant};
pub use session::{Instance, Options, Session, parse_embedded, parse_file, parse_str};
pub use span::Span;
pub use split::{Split, trim, unescape};
pub use stream::STRING_SOURCE;
pub use value::Value;
