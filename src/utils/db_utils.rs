use crate::error::ApiError;
use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::MySqlPool;

/// SQL bindable value for the dynamic update builder
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Null,
}

#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Builds `UPDATE {table} SET ... WHERE id = ? AND user_id = ?` from a JSON
/// payload. Only columns in `allowed` may appear; anything else is rejected
/// so callers cannot touch ownership or generated columns.
pub fn build_owned_update(
    table: &str,
    allowed: &[&str],
    payload: &Value,
    id: u64,
    user_id: u64,
) -> Result<SqlUpdate, ApiError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::Validation("Payload harus berupa objek JSON".to_string()))?;

    if obj.is_empty() {
        return Err(ApiError::Validation(
            "Tidak ada kolom untuk diupdate".to_string(),
        ));
    }

    let mut set_parts = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len() + 2);

    for (key, value) in obj {
        if !allowed.contains(&key.as_str()) {
            return Err(ApiError::Validation(format!(
                "Kolom tidak dikenal: {}",
                key
            )));
        }

        set_parts.push(format!("{} = ?", key));
        values.push(to_sql_value(value)?);
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE id = ? AND user_id = ?",
        table,
        set_parts.join(", ")
    );

    values.push(SqlValue::U64(id));
    values.push(SqlValue::U64(user_id));

    Ok(SqlUpdate { sql, values })
}

fn to_sql_value(value: &Value) -> Result<SqlValue, ApiError> {
    match value {
        Value::String(s) => {
            // timestamps arrive as strings; try both common shapes
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                Ok(SqlValue::DateTime(dt))
            } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                Ok(SqlValue::DateTime(dt))
            } else {
                Ok(SqlValue::String(s.clone()))
            }
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::I64(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlValue::F64(f))
            } else {
                Err(ApiError::Validation("Angka di luar jangkauan".to_string()))
            }
        }
        Value::Bool(b) => Ok(SqlValue::Bool(*b)),
        Value::Null => Ok(SqlValue::Null),
        _ => Err(ApiError::Validation(
            "Tipe nilai JSON tidak didukung".to_string(),
        )),
    }
}

pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALLOWED: &[&str] = &["check_in", "check_out", "latitude", "longitude", "bukti_foto"];

    #[test]
    fn builds_owner_scoped_update() {
        let payload = json!({ "latitude": -7.8068, "bukti_foto": null });
        let update = build_owned_update("presensi", ALLOWED, &payload, 9, 42).unwrap();

        assert!(update.sql.starts_with("UPDATE presensi SET "));
        assert!(update.sql.contains("latitude = ?"));
        assert!(update.sql.contains("bukti_foto = ?"));
        assert!(update.sql.ends_with("WHERE id = ? AND user_id = ?"));
        assert_eq!(update.values.len(), 4);
    }

    #[test]
    fn parses_timestamp_strings() {
        let payload = json!({ "check_out": "2026-01-05 16:30:00" });
        let update = build_owned_update("presensi", ALLOWED, &payload, 9, 42).unwrap();
        assert!(matches!(update.values[0], SqlValue::DateTime(_)));
    }

    #[test]
    fn rejects_unknown_columns() {
        let payload = json!({ "user_id": 1 });
        let err = build_owned_update("presensi", ALLOWED, &payload, 9, 42).unwrap_err();
        assert!(err.to_string().contains("user_id"));
    }

    #[test]
    fn rejects_empty_payload() {
        let payload = json!({});
        assert!(build_owned_update("presensi", ALLOWED, &payload, 9, 42).is_err());
    }

    #[test]
    fn rejects_non_object_payload() {
        let payload = json!([1, 2, 3]);
        assert!(build_owned_update("presensi", ALLOWED, &payload, 9, 42).is_err());
    }
}
