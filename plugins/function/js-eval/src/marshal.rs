use ducktaped_api::value::Cell;

use crate::interpreter::ScriptValue;

/// Convert one cell into the value a script receives.
///
/// - 8/16/32-bit integers → native integer (`UINTEGER` above `i32::MAX` → number)
/// - 64-bit integers → number; magnitudes above 2^53 lose precision
/// - 128-bit integers and decimals → canonical decimal string
/// - floats → number; FLOAT is widened first, so `0.1f32` reads as
///   `0.10000000149011612` in the script
/// - dates, times, timestamps, lists and untagged types → host rendering
/// - NULL → null
/// - VARCHAR → string
pub fn marshal(cell: &Cell<'_>) -> ScriptValue {
    match cell {
        Cell::TinyInt(v) => ScriptValue::Integer(i32::from(*v)),
        Cell::SmallInt(v) => ScriptValue::Integer(i32::from(*v)),
        Cell::Integer(v) => ScriptValue::Integer(*v),
        Cell::UTinyInt(v) => ScriptValue::Integer(i32::from(*v)),
        Cell::USmallInt(v) => ScriptValue::Integer(i32::from(*v)),
        Cell::UInteger(v) => match i32::try_from(*v) {
            Ok(small) => ScriptValue::Integer(small),
            Err(_) => ScriptValue::Number(f64::from(*v)),
        },
        Cell::BigInt(v) => ScriptValue::Number(*v as f64),
        Cell::UBigInt(v) => ScriptValue::Number(*v as f64),
        Cell::Float(v) => ScriptValue::Number(f64::from(*v)),
        Cell::Double(v) => ScriptValue::Number(*v),
        Cell::Null => ScriptValue::Null,
        Cell::Varchar(s) => ScriptValue::String(s.to_string()),
        Cell::HugeInt(_)
        | Cell::UHugeInt(_)
        | Cell::Decimal { .. }
        | Cell::Date(_)
        | Cell::Time(_)
        | Cell::Timestamp(_)
        | Cell::List(_)
        | Cell::Other(_) => ScriptValue::String(cell.to_string()),
    }
}

/// Text of the code column. NULL reads as empty source.
pub fn source_text(cell: &Cell<'_>) -> String {
    match cell {
        Cell::Varchar(s) => s.to_string(),
        Cell::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn narrow_integers_stay_integers() {
        assert_eq!(marshal(&Cell::TinyInt(-8)), ScriptValue::Integer(-8));
        assert_eq!(marshal(&Cell::UTinyInt(255)), ScriptValue::Integer(255));
        assert_eq!(marshal(&Cell::SmallInt(-300)), ScriptValue::Integer(-300));
        assert_eq!(marshal(&Cell::USmallInt(65535)), ScriptValue::Integer(65535));
        assert_eq!(marshal(&Cell::Integer(i32::MIN)), ScriptValue::Integer(i32::MIN));
        assert_eq!(marshal(&Cell::UInteger(7)), ScriptValue::Integer(7));
        assert_eq!(
            marshal(&Cell::UInteger(u32::MAX)),
            ScriptValue::Number(4_294_967_295.0)
        );
    }

    #[test]
    fn wide_integers_become_numbers() {
        assert_eq!(marshal(&Cell::BigInt(-42)), ScriptValue::Number(-42.0));
        // 2^53 + 1 is not representable as a double.
        assert_eq!(
            marshal(&Cell::BigInt(9_007_199_254_740_993)),
            ScriptValue::Number(9_007_199_254_740_992.0)
        );
        assert_eq!(marshal(&Cell::UBigInt(u64::MAX)), ScriptValue::Number(u64::MAX as f64));
    }

    #[test]
    fn very_wide_values_become_strings() {
        assert_eq!(
            marshal(&Cell::HugeInt(i128::MIN)),
            ScriptValue::String("-170141183460469231731687303715884105728".into())
        );
        assert_eq!(
            marshal(&Cell::UHugeInt(u128::MAX)),
            ScriptValue::String(u128::MAX.to_string())
        );
        assert_eq!(
            marshal(&Cell::Decimal { value: 12345, scale: 2 }),
            ScriptValue::String("123.45".into())
        );
    }

    #[test]
    fn floats_and_text() {
        assert_eq!(marshal(&Cell::Float(2.5)), ScriptValue::Number(2.5));
        assert_eq!(marshal(&Cell::Double(-0.125)), ScriptValue::Number(-0.125));
        assert_eq!(marshal(&Cell::Varchar("héllo".into())), ScriptValue::String("héllo".into()));
        assert_eq!(marshal(&Cell::Null), ScriptValue::Null);
    }

    #[test]
    fn temporal_and_fallback_use_host_rendering() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let cells = [
            Cell::Date(date),
            Cell::Time(date.and_hms_opt(8, 0, 1).unwrap().time()),
            Cell::Timestamp(date.and_hms_opt(8, 0, 1).unwrap()),
            Cell::List(vec![Cell::Integer(1), Cell::Integer(2)]),
            Cell::Other("true".into()),
        ];
        for cell in cells {
            assert_eq!(marshal(&cell), ScriptValue::String(cell.to_string()));
        }
    }

    #[test]
    fn source_text_of_code_cells() {
        assert_eq!(source_text(&Cell::Varchar("function(){}".into())), "function(){}");
        assert_eq!(source_text(&Cell::Null), "");
        assert_eq!(source_text(&Cell::Integer(3)), "3");
    }
}
