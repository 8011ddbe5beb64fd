//! Arrow adapter: `RecordBatch` as a `RowBatch`, `StringArray` as the result column.

use std::borrow::Cow;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray, StringBuilder};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Decimal128Type, Field, FieldRef, Float16Type, Float32Type,
    Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, Schema, Time32MillisecondType,
    Time32SecondType, Time64MicrosecondType, Time64NanosecondType, TimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::{ArrayFormatter, FormatOptions};

use ducktaped_api::batch::{OutputColumn, RowBatch};
use ducktaped_api::value::Cell;

use crate::error::EngineError;
use crate::registry::FunctionRegistry;

/// Read-only `RowBatch` view over an Arrow `RecordBatch`.
pub struct ArrowBatch<'a> {
    batch: &'a RecordBatch,
}

impl<'a> ArrowBatch<'a> {
    pub fn new(batch: &'a RecordBatch) -> Self {
        Self { batch }
    }
}

impl RowBatch for ArrowBatch<'_> {
    fn column_count(&self) -> usize {
        self.batch.num_columns()
    }

    fn row_count(&self) -> usize {
        self.batch.num_rows()
    }

    fn cell(&self, column: usize, row: usize) -> Cell<'_> {
        cell_at(self.batch.column(column).as_ref(), row)
    }
}

/// Map one Arrow slot onto a cell tag.
///
/// Nulls in any column become `Cell::Null`. Timestamps are rendered as UTC
/// wall-clock time. Types without a tag go through Arrow's display formatter.
pub fn cell_at(array: &dyn Array, row: usize) -> Cell<'_> {
    if array.is_null(row) {
        return Cell::Null;
    }
    let temporal = match array.data_type() {
        DataType::Null => return Cell::Null,
        DataType::Int8 => return Cell::TinyInt(array.as_primitive::<Int8Type>().value(row)),
        DataType::Int16 => return Cell::SmallInt(array.as_primitive::<Int16Type>().value(row)),
        DataType::Int32 => return Cell::Integer(array.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => return Cell::BigInt(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => return Cell::UTinyInt(array.as_primitive::<UInt8Type>().value(row)),
        DataType::UInt16 => {
            return Cell::USmallInt(array.as_primitive::<UInt16Type>().value(row));
        }
        DataType::UInt32 => return Cell::UInteger(array.as_primitive::<UInt32Type>().value(row)),
        DataType::UInt64 => return Cell::UBigInt(array.as_primitive::<UInt64Type>().value(row)),
        DataType::Float16 => {
            return Cell::Float(array.as_primitive::<Float16Type>().value(row).to_f32());
        }
        DataType::Float32 => return Cell::Float(array.as_primitive::<Float32Type>().value(row)),
        DataType::Float64 => return Cell::Double(array.as_primitive::<Float64Type>().value(row)),
        DataType::Decimal128(_, scale) if *scale >= 0 => {
            return Cell::Decimal {
                value: array.as_primitive::<Decimal128Type>().value(row),
                scale: *scale as u8,
            };
        }
        DataType::Utf8 => return Cell::Varchar(Cow::Borrowed(array.as_string::<i32>().value(row))),
        DataType::LargeUtf8 => {
            return Cell::Varchar(Cow::Borrowed(array.as_string::<i64>().value(row)));
        }
        DataType::Utf8View => {
            return Cell::Varchar(Cow::Borrowed(array.as_string_view().value(row)));
        }
        DataType::List(_) => return list_cell(array.as_list::<i32>().value(row)),
        DataType::LargeList(_) => return list_cell(array.as_list::<i64>().value(row)),
        DataType::FixedSizeList(_, _) => return list_cell(array.as_fixed_size_list().value(row)),
        DataType::Date32 => array.as_primitive::<Date32Type>().value_as_date(row).map(Cell::Date),
        DataType::Date64 => array.as_primitive::<Date64Type>().value_as_date(row).map(Cell::Date),
        DataType::Time32(TimeUnit::Second) => {
            array.as_primitive::<Time32SecondType>().value_as_time(row).map(Cell::Time)
        }
        DataType::Time32(TimeUnit::Millisecond) => array
            .as_primitive::<Time32MillisecondType>()
            .value_as_time(row)
            .map(Cell::Time),
        DataType::Time64(TimeUnit::Microsecond) => array
            .as_primitive::<Time64MicrosecondType>()
            .value_as_time(row)
            .map(Cell::Time),
        DataType::Time64(TimeUnit::Nanosecond) => array
            .as_primitive::<Time64NanosecondType>()
            .value_as_time(row)
            .map(Cell::Time),
        DataType::Timestamp(unit, _) => match unit {
            TimeUnit::Second => array
                .as_primitive::<TimestampSecondType>()
                .value_as_datetime(row),
            TimeUnit::Millisecond => array
                .as_primitive::<TimestampMillisecondType>()
                .value_as_datetime(row),
            TimeUnit::Microsecond => array
                .as_primitive::<TimestampMicrosecondType>()
                .value_as_datetime(row),
            TimeUnit::Nanosecond => array
                .as_primitive::<TimestampNanosecondType>()
                .value_as_datetime(row),
        }
        .map(Cell::Timestamp),
        _ => None,
    };
    // Out-of-range temporal values and untagged types.
    temporal.unwrap_or_else(|| formatted(array, row))
}

fn list_cell(values: ArrayRef) -> Cell<'static> {
    let items = (0..values.len())
        .map(|i| cell_at(values.as_ref(), i).into_owned())
        .collect();
    Cell::List(items)
}

fn formatted(array: &dyn Array, row: usize) -> Cell<'static> {
    let text = match ArrayFormatter::try_new(array, &FormatOptions::default()) {
        Ok(formatter) => formatter.value(row).to_string(),
        Err(_) => format!("<{}>", array.data_type()),
    };
    Cell::Other(Cow::Owned(text))
}

/// Result column backed by an Arrow `StringBuilder`.
pub struct Utf8Output {
    builder: StringBuilder,
}

impl Utf8Output {
    pub fn with_capacity(rows: usize) -> Self {
        Self { builder: StringBuilder::with_capacity(rows, rows * 16) }
    }

    pub fn finish(mut self) -> StringArray {
        self.builder.finish()
    }
}

impl OutputColumn for Utf8Output {
    fn push_str(&mut self, value: &str) {
        self.builder.append_value(value);
    }
}

/// Dispatch an Arrow batch to a registered function; one string per row.
pub fn invoke_arrow(
    registry: &FunctionRegistry,
    name: &str,
    batch: &RecordBatch,
) -> Result<ArrayRef, EngineError> {
    let mut output = Utf8Output::with_capacity(batch.num_rows());
    registry.invoke(name, &ArrowBatch::new(batch), &mut output)?;
    Ok(Arc::new(output.finish()))
}

/// Evaluate `name` over `batch` and append the result as a nullable Utf8 column.
pub fn append_result(
    registry: &FunctionRegistry,
    name: &str,
    batch: &RecordBatch,
    column_name: &str,
) -> Result<RecordBatch, EngineError> {
    let result = invoke_arrow(registry, name, batch)?;

    let mut fields: Vec<FieldRef> = batch.schema().fields().iter().cloned().collect();
    fields.push(Arc::new(Field::new(column_name, DataType::Utf8, true)));
    let mut columns = batch.columns().to_vec();
    columns.push(result);

    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &options,
    )?)
}

#[cfg(test)]
mod tests {
    use arrow::array::{
        BooleanArray, Date32Array, Decimal128Array, Int32Array, ListArray, NullArray,
        TimestampMicrosecondArray, UInt64Array,
    };
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn primitive_and_null_slots() {
        let ints = Int32Array::from(vec![Some(7), None]);
        assert_eq!(cell_at(&ints, 0), Cell::Integer(7));
        assert_eq!(cell_at(&ints, 1), Cell::Null);

        let big = UInt64Array::from(vec![u64::MAX]);
        assert_eq!(cell_at(&big, 0), Cell::UBigInt(u64::MAX));

        assert_eq!(cell_at(&NullArray::new(1), 0), Cell::Null);
    }

    #[test]
    fn strings_are_borrowed() {
        let strings = StringArray::from(vec!["function(){}"]);
        match cell_at(&strings, 0) {
            Cell::Varchar(Cow::Borrowed(s)) => assert_eq!(s, "function(){}"),
            other => panic!("unexpected cell {other:?}"),
        }
    }

    #[test]
    fn decimal_and_temporal() {
        let decimals = Decimal128Array::from(vec![12_345_i128])
            .with_precision_and_scale(10, 2)
            .unwrap();
        assert_eq!(cell_at(&decimals, 0), Cell::Decimal { value: 12_345, scale: 2 });
        assert_eq!(cell_at(&decimals, 0).to_string(), "123.45");

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        // 2024-01-15 is day 19737 since the epoch.
        let dates = Date32Array::from(vec![19_737]);
        assert_eq!(cell_at(&dates, 0), Cell::Date(date));

        let micros = date.and_hms_opt(10, 30, 0).unwrap().and_utc().timestamp_micros();
        let stamps = TimestampMicrosecondArray::from(vec![micros]).with_timezone("+02:00");
        assert_eq!(cell_at(&stamps, 0).to_string(), "2024-01-15 10:30:00");
    }

    #[test]
    fn lists_and_fallback() {
        let lists = ListArray::from_iter_primitive::<Int32Type, _, _>(vec![Some(vec![
            Some(1),
            None,
            Some(3),
        ])]);
        assert_eq!(cell_at(&lists, 0).to_string(), "[1, NULL, 3]");

        let bools = BooleanArray::from(vec![true]);
        assert_eq!(cell_at(&bools, 0), Cell::Other("true".into()));
    }
}
