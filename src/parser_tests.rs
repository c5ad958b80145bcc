use super::*;
use crate::CustomType;
use pretty_assertions::assert_eq;

struct TestCtx {
    arena: Arena,
}

impl TestCtx {
    fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    fn parse_ok<'a>(&'a self, desc: &TypeDesc, raw: &str) -> Value<'a> {
        parse_value(desc, raw, &self.arena)
            .unwrap_or_else(|e| panic!("parse failed for {raw:?}: {e}"))
    }

    fn parse_err(&self, desc: &TypeDesc, raw: &str) -> ErrorKind {
        match parse_value(desc, raw, &self.arena) {
            Ok(value) => panic!("expected {raw:?} to fail, got {value:?}"),
            Err(e) => e.kind,
        }
    }
}

/// `(x,y)` with two `u8` coordinates.
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

fn mode() -> TypeDesc {
    TypeDesc::union([
        Variant::with("time", TypeDesc::U64),
        Variant::with("score", TypeDesc::U32),
        Variant::unit("zen"),
    ])
}

#[test]
fn booleans() {
    let ctx = TestCtx::new();
    assert_eq!(ctx.parse_ok(&TypeDesc::BOOL, "true"), Value::Bool(true));
    assert_eq!(ctx.parse_ok(&TypeDesc::BOOL, "false"), Value::Bool(false));
    for bad in ["True", "1", "yes", ""] {
        assert!(matches!(
            ctx.parse_err(&TypeDesc::BOOL, bad),
            ErrorKind::InvalidBoolean
        ));
    }
}

#[test]
fn integer_bases() {
    let ctx = TestCtx::new();
    let cases = [
        ("42", 42),
        ("-17", -17),
        ("0", 0),
        ("00", 0),
        ("07", 7),
        ("0x1A", 26),
        ("0X1a", 26),
        ("0b11", 3),
        ("0B11", 3),
        ("0o17", 15),
        ("0O17", 15),
    ];
    for (raw, expected) in cases {
        assert_eq!(
            ctx.parse_ok(&TypeDesc::I64, raw),
            Value::Integer(expected),
            "input: {raw}"
        );
    }
}

#[test]
fn integer_failures() {
    let ctx = TestCtx::new();
    assert!(matches!(
        ctx.parse_err(&TypeDesc::U32, "019"),
        ErrorKind::InvalidBase
    ));
    assert!(matches!(
        ctx.parse_err(&TypeDesc::U32, "0z12"),
        ErrorKind::InvalidBase
    ));
    for bad in ["", "12a", "0x", "0xg1", "0b102", "0x-1", "1.5", " 1"] {
        assert!(
            matches!(ctx.parse_err(&TypeDesc::U32, bad), ErrorKind::InvalidNumber),
            "input: {bad:?}"
        );
    }
}

#[test]
fn integer_width_is_enforced() {
    let ctx = TestCtx::new();
    assert_eq!(ctx.parse_ok(&TypeDesc::U8, "255"), Value::Integer(255));
    assert_eq!(ctx.parse_ok(&TypeDesc::I8, "-128"), Value::Integer(-128));
    assert_eq!(
        ctx.parse_ok(&TypeDesc::U64, "18446744073709551615"),
        Value::Integer(u64::MAX as i128)
    );
    for (desc, raw, name) in [
        (TypeDesc::U8, "256", "u8"),
        (TypeDesc::U8, "-1", "u8"),
        (TypeDesc::I8, "128", "i8"),
        (TypeDesc::U16, "0x10000", "u16"),
        (TypeDesc::U64, "18446744073709551616", "u64"),
        (TypeDesc::I64, "999999999999999999999999999999999999999999", "i64"),
    ] {
        match ctx.parse_err(&desc, raw) {
            ErrorKind::OutOfRange(found) => assert_eq!(found, name, "input: {raw}"),
            other => panic!("expected out-of-range for {raw}, got {other}"),
        }
    }
}

#[test]
fn floats() {
    let ctx = TestCtx::new();
    assert_eq!(ctx.parse_ok(&TypeDesc::F64, "1.5"), Value::Float(1.5));
    assert_eq!(ctx.parse_ok(&TypeDesc::F64, "-2e3"), Value::Float(-2000.0));
    assert_eq!(ctx.parse_ok(&TypeDesc::F64, "7"), Value::Float(7.0));
    assert!(matches!(
        ctx.parse_err(&TypeDesc::F64, "1.2.3"),
        ErrorKind::InvalidNumber
    ));
}

#[test]
fn strings_are_copied_verbatim() {
    let ctx = TestCtx::new();
    let raw = String::from(r"hello\, world (x)");
    let value = ctx.parse_ok(&TypeDesc::STRING, &raw);
    drop(raw);
    assert_eq!(value, Value::String(r"hello\, world (x)"));
}

#[test]
fn optionals() {
    let ctx = TestCtx::new();
    let desc = TypeDesc::optional(TypeDesc::U32);
    assert_eq!(ctx.parse_ok(&desc, "none"), Value::Null);
    assert_eq!(ctx.parse_ok(&desc, "5"), Value::Integer(5));
    assert!(matches!(
        ctx.parse_err(&desc, "None"),
        ErrorKind::InvalidNumber
    ));
}

#[test]
fn enums_match_exactly() {
    let ctx = TestCtx::new();
    let desc = TypeDesc::Enum(&["off", "on"]);
    assert_eq!(ctx.parse_ok(&desc, "on"), Value::Enum("on"));
    match ctx.parse_err(&desc, "ON") {
        ErrorKind::InvalidEnumVariant { value, expected } => {
            assert_eq!(value, "ON");
            assert_eq!(expected, &["off", "on"]);
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn tagged_unions() {
    let ctx = TestCtx::new();
    let desc = mode();

    let value = ctx.parse_ok(&desc, "time(1000)");
    assert_eq!(value.as_union(), Some(("time", Some(&Value::Integer(1000)))));

    let value = ctx.parse_ok(&desc, "zen");
    assert_eq!(value.as_union(), Some(("zen", None)));

    // Payload whitespace is trimmed.
    let value = ctx.parse_ok(&desc, "score(  7 )");
    assert_eq!(value.as_union(), Some(("score", Some(&Value::Integer(7)))));
}

#[test]
fn tagged_union_failures() {
    let ctx = TestCtx::new();
    let desc = mode();
    for raw in ["time()", "time(  )", "time(5", "time)5(", "time"] {
        let kind = ctx.parse_err(&desc, raw);
        let expected_unclosed = raw != "time";
        assert_eq!(
            matches!(kind, ErrorKind::UnclosedParenthesis),
            expected_unclosed,
            "input: {raw}, got {kind}"
        );
    }
    assert!(matches!(
        ctx.parse_err(&desc, "time"),
        ErrorKind::MissingPayload("time")
    ));
    assert!(matches!(
        ctx.parse_err(&desc, "zen(1)"),
        ErrorKind::UnexpectedPayload("zen")
    ));
    match ctx.parse_err(&desc, "Zen") {
        ErrorKind::InvalidUnionVariant(tag) => assert_eq!(tag, "Zen"),
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn union_payload_uses_last_closing_paren() {
    let ctx = TestCtx::new();
    let desc = TypeDesc::union([
        Variant::with("label", TypeDesc::STRING),
        Variant::with("nested", mode()),
    ]);
    let value = ctx.parse_ok(&desc, "label(a) b (c)");
    let (_, payload) = value.as_union().unwrap();
    assert_eq!(payload, Some(&Value::String("a) b (c")));

    let value = ctx.parse_ok(&desc, "nested(time(3))");
    let (tag, payload) = value.as_union().unwrap();
    assert_eq!(tag, "nested");
    let inner = payload.unwrap().as_union().unwrap();
    assert_eq!(inner, ("time", Some(&Value::Integer(3))));
}

#[test]
fn dynamic_arrays() {
    let ctx = TestCtx::new();
    let desc = TypeDesc::array(TypeDesc::U8);
    let value = ctx.parse_ok(&desc, "1, 2 ,3");
    assert_eq!(
        value.as_array().unwrap(),
        &[Value::Integer(1), Value::Integer(2), Value::Integer(3)]
    );
    assert!(ctx.parse_ok(&desc, "").as_array().unwrap().is_empty());

    // A trailing comma produces an empty item, which is not a number.
    assert!(matches!(
        ctx.parse_err(&desc, "1,2,"),
        ErrorKind::InvalidNumber
    ));
}

#[test]
fn arrays_of_unions_split_on_top_level_commas() {
    let ctx = TestCtx::new();
    let op = TypeDesc::union([
        Variant::with("add", TypeDesc::fixed_array(TypeDesc::I32, 2)),
        Variant::with("int", TypeDesc::I32),
        Variant::with("pow", TypeDesc::fixed_array(TypeDesc::I32, 2)),
    ]);
    let desc = TypeDesc::array(op);
    let value = ctx.parse_ok(&desc, "add(1,2),int(42),pow(2,3)");
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(format!("{value:?}"), "[add([1, 2]), int(42), pow([2, 3])]");
}

#[test]
fn array_items_are_unescaped() {
    let ctx = TestCtx::new();
    let desc = TypeDesc::array(TypeDesc::STRING);
    let value = ctx.parse_ok(&desc, r"a\,b, c\\d ,e\n");
    assert_eq!(
        value.as_array().unwrap(),
        &[
            Value::String("a,b"),
            Value::String(r"c\d"),
            Value::String(r"e\n"),
        ]
    );

    // Escaped commas survive into a union payload nested in an array.
    let desc = TypeDesc::array(TypeDesc::union([Variant::with(
        "msg",
        TypeDesc::STRING,
    )]));
    let value = ctx.parse_ok(&desc, r"msg(hello\, world),msg(x)");
    assert_eq!(format!("{value:?}"), r#"[msg("hello, world"), msg("x")]"#);
}

#[test]
fn fixed_arrays_require_exact_length() {
    let ctx = TestCtx::new();
    let desc = TypeDesc::fixed_array(TypeDesc::F64, 3);
    let value = ctx.parse_ok(&desc, "1, 2.5, -3");
    assert_eq!(value.as_array().map(<[_]>::len), Some(3));

    for (raw, found) in [("1,2", 2), ("1,2,3,4", 4), ("", 0)] {
        match ctx.parse_err(&desc, raw) {
            ErrorKind::ArrayLength {
                expected: 3,
                found: f,
            } => assert_eq!(f, found),
            other => panic!("unexpected {other} for {raw:?}"),
        }
    }
}

#[test]
fn custom_hooks_receive_raw_items() {
    let ctx = TestCtx::new();
    let desc = TypeDesc::array(TypeDesc::Custom(&POINT));
    let value = ctx.parse_ok(&desc, "(1,2), (3,4)");
    let points = value.as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].field("x"), Some(&Value::Integer(1)));
    assert_eq!(points[0].field("y"), Some(&Value::Integer(2)));
    assert_eq!(points[1].field("x"), Some(&Value::Integer(3)));
    assert_eq!(points[1].field("y"), Some(&Value::Integer(4)));

    match ctx.parse_err(&desc, "(1)") {
        ErrorKind::MissingField(name) => assert_eq!(name, "y"),
        other => panic!("unexpected {other}"),
    }
    assert!(matches!(
        ctx.parse_err(&desc, "1,2"),
        ErrorKind::Custom(_)
    ));
    assert!(matches!(
        ctx.parse_err(&desc, "(1,300)"),
        ErrorKind::OutOfRange("u8")
    ));
}
