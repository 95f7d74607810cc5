//! Conversions between [`Bson`] and the [`serde_json::Value`] JSON tree, in
//! both the canonical and relaxed extended JSON profiles.

use std::convert::TryFrom;

use serde_json::{json, Map, Value};

use crate::{
    bson::{DbPointer, JavaScriptCodeWithScope, Timestamp},
    error::{Error, Result},
    extjson::models,
    Binary,
    Bson,
    Document,
};

/// The largest integer magnitude exactly representable in an IEEE 754
/// binary64, 2^53. Relaxed extended JSON keeps int64 values beyond this
/// magnitude wrapped so JSON consumers that parse numbers as doubles cannot
/// silently lose precision.
const MAX_SAFE_JSON_INTEGER: u64 = 1 << 53;

impl Bson {
    /// Converts this value into a [`serde_json::Value`] in relaxed
    /// [extended JSON](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/)
    /// format.
    pub fn into_relaxed_extjson(self) -> Value {
        match self {
            Bson::Double(v) if v.is_nan() => {
                let s = if v.is_sign_negative() { "-NaN" } else { "NaN" };

                json!({ "$numberDouble": s })
            }
            Bson::Double(v) if v.is_infinite() => {
                let s = if v.is_sign_negative() {
                    "-Infinity"
                } else {
                    "Infinity"
                };

                json!({ "$numberDouble": s })
            }
            Bson::Double(v) => json!(v),
            Bson::String(v) => json!(v),
            Bson::Array(v) => Value::Array(v.into_iter().map(Bson::into_relaxed_extjson).collect()),
            Bson::Document(v) => Value::Object(
                v.into_iter()
                    .map(|(k, v)| (k, v.into_relaxed_extjson()))
                    .collect(),
            ),
            Bson::Boolean(v) => json!(v),
            Bson::Null => Value::Null,
            Bson::RegularExpression(rx) => {
                json!({
                    "$regularExpression": {
                        "pattern": rx.pattern.clone(),
                        "options": rx.sorted_options(),
                    }
                })
            }
            Bson::JavaScriptCode(code) => json!({ "$code": code }),
            Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope { code, scope }) => json!({
                "$code": code,
                "$scope": Bson::Document(scope).into_relaxed_extjson(),
            }),
            Bson::Int32(v) => v.into(),
            Bson::Int64(v) if v.unsigned_abs() <= MAX_SAFE_JSON_INTEGER => v.into(),
            Bson::Int64(v) => json!({ "$numberLong": v.to_string() }),
            Bson::Timestamp(Timestamp { time, increment }) => json!({
                "$timestamp": {
                    "t": time,
                    "i": increment,
                }
            }),
            Bson::Binary(Binary { subtype, ref bytes }) => {
                let tval: u8 = From::from(subtype);
                json!({
                    "$binary": {
                        "base64": crate::base64::encode(bytes),
                        "subType": hex::encode([tval]),
                    }
                })
            }
            Bson::ObjectId(v) => json!({"$oid": v.to_hex()}),
            Bson::DateTime(v) if v.timestamp_millis() >= 0 && v.year().map_or(false, |y| y <= 9999) => {
                json!({
                    // Unwrap safety: timestamps in the guarded range can always be formatted.
                    "$date": v.try_to_rfc3339_string().unwrap(),
                })
            }
            Bson::DateTime(v) => json!({
                "$date": { "$numberLong": v.timestamp_millis().to_string() },
            }),
            Bson::Symbol(v) => json!({ "$symbol": v }),
            Bson::Decimal128(v) => json!({ "$numberDecimal": v.to_string() }),
            Bson::Undefined => json!({ "$undefined": true }),
            Bson::MinKey => json!({ "$minKey": 1 }),
            Bson::MaxKey => json!({ "$maxKey": 1 }),
            Bson::DbPointer(DbPointer {
                ref namespace,
                ref id,
            }) => json!({
                "$dbPointer": {
                    "$ref": namespace,
                    "$id": {
                        "$oid": id.to_hex()
                    }
                }
            }),
        }
    }

    /// Converts this value into a [`serde_json::Value`] in canonical
    /// [extended JSON](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/)
    /// format.
    pub fn into_canonical_extjson(self) -> Value {
        match self {
            Bson::Int32(i) => json!({ "$numberInt": i.to_string() }),
            Bson::Int64(i) => json!({ "$numberLong": i.to_string() }),
            Bson::Double(f) if f.is_finite() => {
                let mut s = f.to_string();
                if !s.contains(|c| c == '.' || c == 'e' || c == 'E') {
                    s.push_str(".0");
                }

                json!({ "$numberDouble": s })
            }
            Bson::DateTime(date) => {
                json!({ "$date": { "$numberLong": date.timestamp_millis().to_string() } })
            }
            Bson::Array(arr) => {
                Value::Array(arr.into_iter().map(Bson::into_canonical_extjson).collect())
            }
            Bson::Document(doc) => Value::Object(
                doc.into_iter()
                    .map(|(k, v)| (k, v.into_canonical_extjson()))
                    .collect(),
            ),
            Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope { code, scope }) => json!({
                "$code": code,
                "$scope": Bson::Document(scope).into_canonical_extjson(),
            }),

            // everything else is identical in both profiles
            other => other.into_relaxed_extjson(),
        }
    }
}

/// Converts [`Bson`] into a [`serde_json::Value`] in relaxed
/// [extended JSON](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/).
impl From<Bson> for Value {
    fn from(bson: Bson) -> Self {
        bson.into_relaxed_extjson()
    }
}

struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    fn joined(&self) -> String {
        self.segments.join(".")
    }

    fn corrupted(&self, message: impl ToString) -> Error {
        Error::data_corrupted(self.joined(), message)
    }
}

fn parse_model<T: serde::de::DeserializeOwned>(
    obj: Map<String, Value>,
    path: &KeyPath,
) -> Result<T> {
    serde_json::from_value(obj.into()).map_err(|e| path.corrupted(e))
}

/// Converts an extended JSON object into [`Bson`].
///
/// The `$`-prefixed wrapper keys are tried in turn; an object carrying none
/// of them parses as a plain document. Failures are reported against the
/// dotted key path of the offending node.
fn object_into_bson(obj: Map<String, Value>, path: &mut KeyPath) -> Result<Bson> {
    if obj.contains_key("$oid") {
        let oid: models::ObjectId = parse_model(obj, path)?;
        return Ok(Bson::ObjectId(oid.parse().map_err(|e| path.corrupted(e))?));
    }

    if obj.contains_key("$symbol") {
        let symbol: models::Symbol = parse_model(obj, path)?;
        return Ok(Bson::Symbol(symbol.value));
    }

    if obj.contains_key("$regularExpression") {
        let regex: models::Regex = parse_model(obj, path)?;
        return Ok(regex.parse().into());
    }

    if obj.contains_key("$numberInt") {
        let int: models::Int32 = parse_model(obj, path)?;
        return Ok(Bson::Int32(int.parse().map_err(|e| path.corrupted(e))?));
    }

    if obj.contains_key("$numberLong") {
        let int: models::Int64 = parse_model(obj, path)?;
        return Ok(Bson::Int64(int.parse().map_err(|e| path.corrupted(e))?));
    }

    if obj.contains_key("$numberDouble") {
        let double: models::Double = parse_model(obj, path)?;
        return Ok(Bson::Double(double.parse().map_err(|e| path.corrupted(e))?));
    }

    if obj.contains_key("$numberDecimal") {
        let decimal: models::Decimal128 = parse_model(obj, path)?;
        return Ok(Bson::Decimal128(
            decimal.parse().map_err(|e| path.corrupted(e))?,
        ));
    }

    if obj.contains_key("$binary") {
        let binary: models::Binary = parse_model(obj, path)?;
        return Ok(Bson::Binary(binary.parse().map_err(|e| path.corrupted(e))?));
    }

    if obj.contains_key("$uuid") {
        let uuid: models::Uuid = parse_model(obj, path)?;
        return Ok(Bson::Binary(uuid.parse().map_err(|e| path.corrupted(e))?));
    }

    if obj.contains_key("$code") {
        let code_w_scope: models::JavaScriptCodeWithScope = parse_model(obj, path)?;
        return match code_w_scope.scope {
            Some(scope) => {
                path.segments.push("$scope".to_string());
                let scope = document_from_map(scope, path)?;
                path.segments.pop();
                Ok(JavaScriptCodeWithScope {
                    code: code_w_scope.code,
                    scope,
                }
                .into())
            }
            None => Ok(Bson::JavaScriptCode(code_w_scope.code)),
        };
    }

    if obj.contains_key("$timestamp") {
        let ts: models::Timestamp = parse_model(obj, path)?;
        return Ok(ts.parse().into());
    }

    if obj.contains_key("$date") {
        let datetime: models::DateTime = parse_model(obj, path)?;
        return Ok(Bson::DateTime(
            datetime.parse().map_err(|e| path.corrupted(e))?,
        ));
    }

    if obj.contains_key("$minKey") {
        let min_key: models::MinKey = parse_model(obj, path)?;
        return min_key.parse().map_err(|e| path.corrupted(e));
    }

    if obj.contains_key("$maxKey") {
        let max_key: models::MaxKey = parse_model(obj, path)?;
        return max_key.parse().map_err(|e| path.corrupted(e));
    }

    if obj.contains_key("$dbPointer") {
        let db_ptr: models::DbPointer = parse_model(obj, path)?;
        return Ok(db_ptr.parse().map_err(|e| path.corrupted(e))?.into());
    }

    if obj.contains_key("$undefined") {
        let undefined: models::Undefined = parse_model(obj, path)?;
        return undefined.parse().map_err(|e| path.corrupted(e));
    }

    Ok(Bson::Document(document_from_map(obj, path)?))
}

fn document_from_map(obj: Map<String, Value>, path: &mut KeyPath) -> Result<Document> {
    let mut doc = Document::new();
    for (k, v) in obj {
        path.segments.push(k.clone());
        let value = value_into_bson(v, path)?;
        path.segments.pop();
        doc.insert(k, value);
    }
    Ok(doc)
}

fn value_into_bson(value: Value, path: &mut KeyPath) -> Result<Bson> {
    Ok(match value {
        Value::Number(x) => x
            .as_i64()
            .map(|i| {
                if i >= i32::MIN as i64 && i <= i32::MAX as i64 {
                    Bson::Int32(i as i32)
                } else {
                    Bson::Int64(i)
                }
            })
            .or_else(|| x.as_f64().map(Bson::from))
            .ok_or_else(|| {
                path.corrupted(format!(
                    "{} is not a number that fits in i32, i64, or f64",
                    x
                ))
            })?,
        Value::String(x) => x.into(),
        Value::Bool(x) => x.into(),
        Value::Null => Bson::Null,
        Value::Array(arr) => {
            let mut vec = Vec::with_capacity(arr.len());
            for (i, val) in arr.into_iter().enumerate() {
                path.segments.push(i.to_string());
                vec.push(value_into_bson(val, path)?);
                path.segments.pop();
            }
            Bson::Array(vec)
        }
        Value::Object(map) => object_into_bson(map, path)?,
    })
}

/// Converts the [`serde_json::Map`] into [`Bson`]. This conversion can
/// interpret both canonical and relaxed
/// [extended JSON](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/),
/// including the legacy `$binary`/`$type` and `$uuid` forms.
impl TryFrom<Map<String, Value>> for Bson {
    type Error = Error;

    fn try_from(obj: Map<String, Value>) -> Result<Self> {
        object_into_bson(obj, &mut KeyPath::new())
    }
}

/// Converts the [`serde_json::Value`] into [`Bson`]. This conversion can
/// interpret both canonical and relaxed
/// [extended JSON](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/).
impl TryFrom<Value> for Bson {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        value_into_bson(value, &mut KeyPath::new())
    }
}

/// Converts the [`serde_json::Map`] into a [`Document`]. This conversion can
/// interpret both canonical and relaxed
/// [extended JSON](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/).
impl TryFrom<Map<String, Value>> for Document {
    type Error = Error;

    fn try_from(obj: Map<String, Value>) -> Result<Self> {
        document_from_map(obj, &mut KeyPath::new())
    }
}
