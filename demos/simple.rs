//! Loads the embedded defaults, then applies any files named on the command
//! line on top of them.
//!
//! ```text
//! cargo run --example simple -- my-overrides.conf
//! ```

use lineconf::{
    Arena, CustomType, Deserialize, Error, Field, RecordHelper, Schema, Session, Split, TypeDesc,
    Value, Variant, parse_value, trim,
};

struct Point;

impl CustomType for Point {
    fn name(&self) -> &'static str {
        "point"
    }

    fn parse<'a>(&self, raw: &str, arena: &'a Arena) -> Result<Value<'a>, Error> {
        let Some(inner) = raw.strip_prefix('(').and_then(|r| r.strip_suffix(')')) else {
            return Err(Error::custom("expected `(x,y)`"));
        };
        let mut coords = Split::new(inner);
        let x = coords.next().ok_or_else(|| Error::missing_field("x"))?;
        let y = coords.next().ok_or_else(|| Error::missing_field("y"))?;
        let entries = [
            ("x", parse_value(&TypeDesc::U8, trim(x), arena)?),
            ("y", parse_value(&TypeDesc::U8, trim(y), arena)?),
        ];
        Ok(Value::Record(arena.alloc_slice_copy(&entries)))
    }
}

static POINT: Point = Point;

#[derive(Debug)]
struct Coord {
    x: u8,
    y: u8,
}

impl<'a> Deserialize<'a> for Coord {
    fn deserialize(value: &Value<'a>) -> Result<Self, Error> {
        let record = RecordHelper::new(value)?;
        Ok(Coord {
            x: record.required("x")?,
            y: record.required("y")?,
        })
    }
}

fn schema() -> Result<Schema, Error> {
    Schema::new([
        Field::new("auto_start", TypeDesc::Enum(&["off", "on"])),
        Field::new("magic", TypeDesc::U32),
        Field::new(
            "mode",
            TypeDesc::union([
                Variant::with("time", TypeDesc::U64),
                Variant::with("score", TypeDesc::U32),
                Variant::unit("zen"),
            ]),
        ),
        Field::new("coords", TypeDesc::array(TypeDesc::Custom(&POINT))),
        Field::new("title", TypeDesc::STRING),
        Field::new("volume", TypeDesc::optional(TypeDesc::F64)),
    ])
}

fn main() -> Result<(), Error> {
    let schema = schema()?;
    let arena = Arena::new();

    let mut session = Session::new(&schema, &arena);
    session.feed_str(include_str!("simple.conf"))?;
    for path in std::env::args().skip(1) {
        if let Err(err) = session.feed_file(&path) {
            eprintln!("error: {err}");
            if let Some(text) = err.location.as_ref().map(|loc| &loc.text) {
                eprintln!("  | {text}");
            }
            std::process::exit(1);
        }
    }
    let config = session.finish();

    let title: &str = config.required("title")?;
    let coords: Vec<Coord> = config.required("coords")?;
    let volume: Option<f64> = config.optional("volume")?;
    println!("{title}");
    println!("  auto_start = {}", config.required::<&str>("auto_start")?);
    println!("  magic      = {}", config.required::<u32>("magic")?);
    println!("  mode       = {:?}", config.get("mode").unwrap_or(&Value::Null));
    println!("  coords     = {coords:?}");
    println!("  volume     = {}", volume.map_or("default".to_owned(), |v| v.to_string()));
    println!("  arena      = {} bytes", arena.allocated_bytes());
    Ok(())
}
