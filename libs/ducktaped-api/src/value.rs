use std::borrow::Cow;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Closed set of cell type tags a host can hand to a function.
///
/// Anything the host cannot express with one of the named tags is delivered
/// as `Other`, already rendered to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    TinyInt,
    SmallInt,
    Integer,
    UTinyInt,
    USmallInt,
    UInteger,
    BigInt,
    UBigInt,
    HugeInt,
    UHugeInt,
    Decimal,
    Float,
    Double,
    Date,
    Time,
    Timestamp,
    Varchar,
    Null,
    List,
    Other,
}

/// One typed value at a (column, row) position of a batch.
///
/// Strategy by type:
/// - Integers and floats: stored as their native width
/// - Decimal: `(unscaled value, scale)`, rendered on demand
/// - Date, Time, Timestamp: `chrono` values, timezone already applied by the host
/// - Varchar, Other: `Cow` (zero-copy when the host can lend its buffer)
/// - List: recursive
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    UTinyInt(u8),
    USmallInt(u16),
    UInteger(u32),
    BigInt(i64),
    UBigInt(u64),
    HugeInt(i128),
    UHugeInt(u128),
    Decimal { value: i128, scale: u8 },
    Float(f32),
    Double(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Varchar(Cow<'a, str>),
    Null,
    List(Vec<Cell<'a>>),
    /// Host-rendered text for a type without a dedicated tag.
    Other(Cow<'a, str>),
}

impl Cell<'_> {
    pub fn cell_type(&self) -> CellType {
        match self {
            Cell::TinyInt(_) => CellType::TinyInt,
            Cell::SmallInt(_) => CellType::SmallInt,
            Cell::Integer(_) => CellType::Integer,
            Cell::UTinyInt(_) => CellType::UTinyInt,
            Cell::USmallInt(_) => CellType::USmallInt,
            Cell::UInteger(_) => CellType::UInteger,
            Cell::BigInt(_) => CellType::BigInt,
            Cell::UBigInt(_) => CellType::UBigInt,
            Cell::HugeInt(_) => CellType::HugeInt,
            Cell::UHugeInt(_) => CellType::UHugeInt,
            Cell::Decimal { .. } => CellType::Decimal,
            Cell::Float(_) => CellType::Float,
            Cell::Double(_) => CellType::Double,
            Cell::Date(_) => CellType::Date,
            Cell::Time(_) => CellType::Time,
            Cell::Timestamp(_) => CellType::Timestamp,
            Cell::Varchar(_) => CellType::Varchar,
            Cell::Null => CellType::Null,
            Cell::List(_) => CellType::List,
            Cell::Other(_) => CellType::Other,
        }
    }

    /// Detach from the host buffer.
    pub fn into_owned(self) -> Cell<'static> {
        match self {
            Cell::TinyInt(v) => Cell::TinyInt(v),
            Cell::SmallInt(v) => Cell::SmallInt(v),
            Cell::Integer(v) => Cell::Integer(v),
            Cell::UTinyInt(v) => Cell::UTinyInt(v),
            Cell::USmallInt(v) => Cell::USmallInt(v),
            Cell::UInteger(v) => Cell::UInteger(v),
            Cell::BigInt(v) => Cell::BigInt(v),
            Cell::UBigInt(v) => Cell::UBigInt(v),
            Cell::HugeInt(v) => Cell::HugeInt(v),
            Cell::UHugeInt(v) => Cell::UHugeInt(v),
            Cell::Decimal { value, scale } => Cell::Decimal { value, scale },
            Cell::Float(v) => Cell::Float(v),
            Cell::Double(v) => Cell::Double(v),
            Cell::Date(v) => Cell::Date(v),
            Cell::Time(v) => Cell::Time(v),
            Cell::Timestamp(v) => Cell::Timestamp(v),
            Cell::Varchar(v) => Cell::Varchar(Cow::Owned(v.into_owned())),
            Cell::Null => Cell::Null,
            Cell::List(items) => Cell::List(items.into_iter().map(Cell::into_owned).collect()),
            Cell::Other(v) => Cell::Other(Cow::Owned(v.into_owned())),
        }
    }
}

/// Canonical host rendering of a cell.
///
/// - Date: `YYYY-MM-DD`
/// - Time: `HH:MM:SS[.ffffff]`, trailing zeros of the fraction trimmed
/// - Timestamp: `YYYY-MM-DD HH:MM:SS[.ffffff]`
/// - Decimal: plain positional notation with exactly `scale` fractional digits
/// - Float, Double: shortest round-trip digits like JavaScript's `String(v)`;
///   exponent form below `1e-6` and from `1e21` up (`1e-7`, `1e+21`)
/// - List: `[a, b, NULL]`, elements unquoted
/// - Null: `NULL`
impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::TinyInt(v) => write!(f, "{v}"),
            Cell::SmallInt(v) => write!(f, "{v}"),
            Cell::Integer(v) => write!(f, "{v}"),
            Cell::UTinyInt(v) => write!(f, "{v}"),
            Cell::USmallInt(v) => write!(f, "{v}"),
            Cell::UInteger(v) => write!(f, "{v}"),
            Cell::BigInt(v) => write!(f, "{v}"),
            Cell::UBigInt(v) => write!(f, "{v}"),
            Cell::HugeInt(v) => write!(f, "{v}"),
            Cell::UHugeInt(v) => write!(f, "{v}"),
            Cell::Decimal { value, scale } => write_decimal(f, *value, *scale),
            Cell::Float(v) => f.write_str(ryu_js::Buffer::new().format(*v)),
            Cell::Double(v) => f.write_str(ryu_js::Buffer::new().format(*v)),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Time(t) => write_time(f, t),
            Cell::Timestamp(ts) => {
                write!(f, "{} ", ts.date().format("%Y-%m-%d"))?;
                write_time(f, &ts.time())
            }
            Cell::Varchar(s) => f.write_str(s),
            Cell::Null => f.write_str("NULL"),
            Cell::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Cell::Other(s) => f.write_str(s),
        }
    }
}

fn write_time(f: &mut fmt::Formatter<'_>, t: &NaiveTime) -> fmt::Result {
    write!(f, "{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second())?;
    // Leap-second nanos (>= 1e9) are folded into the last representable micro.
    let micros = (t.nanosecond() / 1_000).min(999_999);
    if micros > 0 {
        let fraction = format!("{micros:06}");
        write!(f, ".{}", fraction.trim_end_matches('0'))?;
    }
    Ok(())
}

fn write_decimal(f: &mut fmt::Formatter<'_>, value: i128, scale: u8) -> fmt::Result {
    if scale == 0 {
        return write!(f, "{value}");
    }
    let digits = value.unsigned_abs().to_string();
    let scale = usize::from(scale);
    let sign = if value < 0 { "-" } else { "" };
    if digits.len() > scale {
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    } else {
        write!(f, "{sign}0.{digits:0>scale$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decimal_rendering() {
        let cases = [
            (12345, 2, "123.45"),
            (-12345, 2, "-123.45"),
            (5, 3, "0.005"),
            (-5, 3, "-0.005"),
            (100, 2, "1.00"),
            (42, 0, "42"),
        ];
        for (value, scale, expected) in cases {
            assert_eq!(Cell::Decimal { value, scale }.to_string(), expected);
        }
    }

    #[test]
    fn temporal_rendering() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(Cell::Date(date).to_string(), "2024-01-15");

        let time = NaiveTime::from_hms_micro_opt(7, 5, 3, 500_000).unwrap();
        assert_eq!(Cell::Time(time).to_string(), "07:05:03.5");

        let ts = date.and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(Cell::Timestamp(ts).to_string(), "2024-01-15 10:30:00");

        let ts = date.and_hms_micro_opt(23, 59, 59, 123_456).unwrap();
        assert_eq!(Cell::Timestamp(ts).to_string(), "2024-01-15 23:59:59.123456");
    }

    #[test]
    fn float_rendering_switches_to_exponents() {
        let cases = [
            (3.25, "3.25"),
            (1e21, "1e+21"),
            (1e20, "100000000000000000000"),
            (1e-7, "1e-7"),
            (0.000001, "0.000001"),
            (-0.0, "0"),
            (f64::INFINITY, "Infinity"),
            (f64::NEG_INFINITY, "-Infinity"),
            (f64::NAN, "NaN"),
        ];
        for (value, expected) in cases {
            assert_eq!(Cell::Double(value).to_string(), expected);
        }
        assert_eq!(Cell::Float(0.1).to_string(), "0.1");
    }

    #[test]
    fn list_rendering_is_unquoted() {
        let list = Cell::List(vec![
            Cell::Integer(1),
            Cell::Varchar("two".into()),
            Cell::Null,
            Cell::List(vec![Cell::Double(2.5)]),
        ]);
        assert_eq!(list.to_string(), "[1, two, NULL, [2.5]]");
        assert_eq!(Cell::List(Vec::new()).to_string(), "[]");
    }

    #[test]
    fn into_owned_preserves_value() {
        let text = String::from("borrowed");
        let cell = Cell::List(vec![Cell::Varchar(Cow::Borrowed(text.as_str()))]);
        let owned: Cell<'static> = cell.clone().into_owned();
        assert_eq!(owned, cell);
        assert_eq!(owned.cell_type(), CellType::List);
    }
}
