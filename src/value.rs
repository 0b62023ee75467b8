// ABOUTME: Dynamically typed scalar values for row round-tripping
// ABOUTME: Types without a dedicated variant pass through as raw wire bytes

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::types::{to_sql_checked, FromSql, IsNull, ToSql, Type};
use tokio_postgres::Row;

/// One page of rows, each row's values aligned with the table's column
/// list. Pages are ephemeral: produced by one fetch, consumed by one
/// insert, then dropped.
pub type RowPage = Vec<Vec<Value>>;

/// A scalar read from the source and written to the destination unchanged.
///
/// Common types get a dedicated variant; everything else (NUMERIC, arrays,
/// enums, ranges, ...) is carried as [`Value::Opaque`] raw wire bytes.
/// Source and destination share a schema dialect, so echoing the binary
/// representation back is an exact round-trip with no type-mapping layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Date(NaiveDate),
    Json(serde_json::Value),
    Opaque(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extract the value at `idx` from a fetched row, dispatching on the
    /// column's wire type.
    pub fn from_row(row: &Row, idx: usize) -> Result<Value, tokio_postgres::Error> {
        let ty = row.columns()[idx].type_();

        let value = if *ty == Type::BOOL {
            opt(row.try_get::<_, Option<bool>>(idx)?, Value::Bool)
        } else if *ty == Type::INT2 {
            opt(row.try_get::<_, Option<i16>>(idx)?, Value::Int2)
        } else if *ty == Type::INT4 {
            opt(row.try_get::<_, Option<i32>>(idx)?, Value::Int4)
        } else if *ty == Type::INT8 {
            opt(row.try_get::<_, Option<i64>>(idx)?, Value::Int8)
        } else if *ty == Type::FLOAT4 {
            opt(row.try_get::<_, Option<f32>>(idx)?, Value::Float4)
        } else if *ty == Type::FLOAT8 {
            opt(row.try_get::<_, Option<f64>>(idx)?, Value::Float8)
        } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME {
            opt(row.try_get::<_, Option<String>>(idx)?, Value::Text)
        } else if *ty == Type::BYTEA {
            opt(row.try_get::<_, Option<Vec<u8>>>(idx)?, Value::Bytes)
        } else if *ty == Type::UUID {
            opt(row.try_get::<_, Option<uuid::Uuid>>(idx)?, Value::Uuid)
        } else if *ty == Type::TIMESTAMP {
            opt(row.try_get::<_, Option<NaiveDateTime>>(idx)?, Value::Timestamp)
        } else if *ty == Type::TIMESTAMPTZ {
            opt(row.try_get::<_, Option<DateTime<Utc>>>(idx)?, Value::TimestampTz)
        } else if *ty == Type::DATE {
            opt(row.try_get::<_, Option<NaiveDate>>(idx)?, Value::Date)
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            opt(row.try_get::<_, Option<serde_json::Value>>(idx)?, Value::Json)
        } else {
            opt(row.try_get::<_, Option<RawBytes>>(idx)?, |raw| {
                Value::Opaque(raw.0)
            })
        };

        Ok(value)
    }
}

fn opt<T>(value: Option<T>, wrap: impl FnOnce(T) -> Value) -> Value {
    value.map_or(Value::Null, wrap)
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int2(v) => v.to_sql(ty, out),
            Value::Int4(v) => v.to_sql(ty, out),
            Value::Int8(v) => v.to_sql(ty, out),
            Value::Float4(v) => v.to_sql(ty, out),
            Value::Float8(v) => v.to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::TimestampTz(v) => v.to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
            Value::Opaque(raw) => {
                out.extend_from_slice(raw);
                Ok(IsNull::No)
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The destination column's type is whatever the source column's
        // type was; mismatches surface as execution errors, not here.
        true
    }

    to_sql_checked!();
}

/// Raw wire bytes of a value whose type has no dedicated [`Value`] variant.
struct RawBytes(Vec<u8>);

impl<'a> FromSql<'a> for RawBytes {
    fn from_sql(
        _ty: &Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Ok(RawBytes(raw.to_vec()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}
