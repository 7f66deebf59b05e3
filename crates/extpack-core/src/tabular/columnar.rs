//! Parquet tables via `arrow-array` and `parquet`.

use std::any::Any;
use std::sync::Arc;

use arrow_array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, RecordBatch, RecordBatchOptions,
    StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Column, Dtype};
use crate::error::CodecError;

fn data_type(dtype: Dtype) -> DataType {
    match dtype {
        Dtype::Float64 => DataType::Float64,
        Dtype::Int64 => DataType::Int64,
        Dtype::Bool => DataType::Boolean,
        Dtype::Utf8 => DataType::Utf8,
    }
}

fn dtype_of(data_type: &DataType) -> Result<Dtype, CodecError> {
    match data_type {
        DataType::Float64 => Ok(Dtype::Float64),
        DataType::Int64 => Ok(Dtype::Int64),
        DataType::Boolean => Ok(Dtype::Bool),
        DataType::Utf8 => Ok(Dtype::Utf8),
        other => Err(CodecError::malformed(
            "parquet",
            format!("unsupported column type {other}"),
        )),
    }
}

fn to_arrow(column: &Column) -> ArrayRef {
    match column {
        Column::Float64(v) => Arc::new(Float64Array::from(v.clone())),
        Column::Int64(v) => Arc::new(Int64Array::from(v.clone())),
        Column::Boolean(v) => Arc::new(BooleanArray::from(v.clone())),
        Column::Utf8(v) => Arc::new(StringArray::from_iter_values(v)),
    }
}

fn downcast<T: 'static>(array: &dyn Any) -> Result<&T, CodecError> {
    array
        .downcast_ref::<T>()
        .ok_or_else(|| CodecError::malformed("parquet", "column type changed between batches"))
}

fn append(column: &mut Column, array: &ArrayRef) -> Result<(), CodecError> {
    let array = array.as_any();
    match column {
        Column::Float64(v) => {
            v.extend(downcast::<Float64Array>(array)?.iter().map(|x| x.unwrap_or(f64::NAN)))
        }
        Column::Int64(v) => v.extend(downcast::<Int64Array>(array)?.values().iter().copied()),
        Column::Boolean(v) => {
            v.extend(downcast::<BooleanArray>(array)?.iter().map(|x| x.unwrap_or(false)))
        }
        Column::Utf8(v) => v.extend(
            downcast::<StringArray>(array)?
                .iter()
                .map(|x| x.unwrap_or_default().to_string()),
        ),
    }
    Ok(())
}

pub(crate) fn write(columns: &[(&str, &Column)]) -> Result<Vec<u8>, CodecError> {
    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, column)| Field::new(*name, data_type(column.dtype()), false))
            .collect::<Vec<_>>(),
    ));
    let rows = columns.first().map_or(0, |(_, c)| c.len());
    let batch = RecordBatch::try_new_with_options(
        schema.clone(),
        columns.iter().map(|(_, c)| to_arrow(c)).collect(),
        &RecordBatchOptions::new().with_row_count(Some(rows)),
    )?;

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(buf)
}

pub(crate) fn read(data: &[u8]) -> Result<Vec<(String, Column)>, CodecError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(data))?;
    let mut columns = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Ok((f.name().clone(), Column::empty(dtype_of(f.data_type())?))))
        .collect::<Result<Vec<_>, CodecError>>()?;

    for batch in builder.build()? {
        let batch = batch?;
        for (i, (_, column)) in columns.iter_mut().enumerate() {
            append(column, batch.column(i))?;
        }
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parquet_keeps_types_and_order() {
        let a = Column::Float64(vec![0.5, f64::INFINITY]);
        let b = Column::Utf8(vec!["p".into(), "".into()]);
        let c = Column::Boolean(vec![false, true]);
        let bytes = write(&[("a", &a), ("b", &b), ("c", &c)]).unwrap();
        assert_eq!(&bytes[..4], b"PAR1");
        assert_eq!(
            read(&bytes).unwrap(),
            vec![("a".to_string(), a), ("b".to_string(), b), ("c".to_string(), c)]
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(read(b"nope"), Err(CodecError::Parquet(_))));
    }
}
