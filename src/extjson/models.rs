//! Serde models for the extended JSON representations of the various BSON
//! types.

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    oid,
    spec::BinarySubtype,
    Bson,
};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Int32 {
    #[serde(rename = "$numberInt")]
    value: String,
}

impl Int32 {
    pub(crate) fn parse(self) -> Result<i32> {
        self.value.parse().map_err(|_| {
            Error::invalid_argument(format!("expected i32 as a string, got \"{}\"", self.value))
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Int64 {
    #[serde(rename = "$numberLong")]
    value: String,
}

impl Int64 {
    pub(crate) fn parse(self) -> Result<i64> {
        self.value.parse().map_err(|_| {
            Error::invalid_argument(format!("expected i64 as a string, got \"{}\"", self.value))
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Double {
    #[serde(rename = "$numberDouble")]
    value: String,
}

impl Double {
    pub(crate) fn parse(self) -> Result<f64> {
        match self.value.as_str() {
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            "NaN" => Ok(f64::NAN),
            "-NaN" => Ok(-f64::NAN),
            other => other.parse().map_err(|_| {
                Error::invalid_argument(format!("expected double as a string, got \"{}\"", other))
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Decimal128 {
    #[serde(rename = "$numberDecimal")]
    value: String,
}

impl Decimal128 {
    pub(crate) fn parse(self) -> Result<crate::Decimal128> {
        self.value.parse().map_err(|_| {
            Error::invalid_argument(format!(
                "expected decimal128 value as a string, got \"{}\"",
                self.value
            ))
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ObjectId {
    #[serde(rename = "$oid")]
    oid: String,
}

impl ObjectId {
    pub(crate) fn parse(self) -> Result<oid::ObjectId> {
        oid::ObjectId::parse_str(self.oid.as_str())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Symbol {
    #[serde(rename = "$symbol")]
    pub(crate) value: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Regex {
    #[serde(rename = "$regularExpression")]
    body: RegexBody,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegexBody {
    pattern: String,
    options: String,
}

impl Regex {
    pub(crate) fn parse(self) -> crate::Regex {
        let rx = crate::Regex {
            pattern: self.body.pattern,
            options: self.body.options,
        };
        crate::Regex {
            options: rx.sorted_options(),
            ..rx
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Binary {
    #[serde(rename = "$binary")]
    body: BinaryBody,

    /// The legacy v1 form spells the subtype in a sibling `$type` field.
    #[serde(rename = "$type", default)]
    legacy_subtype: Option<LegacySubtype>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BinaryBody {
    Modern {
        base64: String,
        #[serde(rename = "subType")]
        subtype: String,
    },
    Legacy(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacySubtype {
    Hex(String),
    Number(u8),
}

impl Binary {
    pub(crate) fn parse(self) -> Result<crate::Binary> {
        let (base64, subtype) = match self.body {
            BinaryBody::Modern { base64, subtype } => {
                if self.legacy_subtype.is_some() {
                    return Err(Error::invalid_argument(
                        "$binary cannot combine the v2 body with a $type field",
                    ));
                }
                (base64, parse_hex_subtype(&subtype)?)
            }
            BinaryBody::Legacy(base64) => {
                let subtype = match self.legacy_subtype {
                    Some(LegacySubtype::Hex(hex)) => parse_hex_subtype(&hex)?,
                    Some(LegacySubtype::Number(n)) => n,
                    None => 0,
                };
                (base64, subtype)
            }
        };

        let bytes = crate::base64::decode(base64.as_str()).map_err(|_| {
            Error::invalid_argument(format!("expected base64 encoded bytes, got \"{}\"", base64))
        })?;

        crate::Binary::new(subtype, bytes)
    }
}

fn parse_hex_subtype(s: &str) -> Result<u8> {
    // one or two hex digits
    let padded;
    let normalized = if s.len() == 1 {
        padded = format!("0{}", s);
        padded.as_str()
    } else {
        s
    };
    let decoded = hex::decode(normalized).map_err(|_| {
        Error::invalid_argument(format!(
            "expected hexadecimal number as a string, got \"{}\"",
            s
        ))
    })?;
    match decoded.as_slice() {
        [b] => Ok(*b),
        _ => Err(Error::invalid_argument(format!(
            "expected one byte subtype, got \"{}\"",
            s
        ))),
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Uuid {
    #[serde(rename = "$uuid")]
    value: String,
}

impl Uuid {
    pub(crate) fn parse(self) -> Result<crate::Binary> {
        let uuid = uuid::Uuid::parse_str(&self.value).map_err(|_| {
            Error::invalid_argument(format!(
                "$uuid value \"{}\" does not follow RFC 4122 format regarding length and hyphens",
                self.value
            ))
        })?;

        crate::Binary::with_subtype(BinarySubtype::Uuid, uuid.as_bytes().to_vec())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct JavaScriptCodeWithScope {
    #[serde(rename = "$code")]
    pub(crate) code: String,

    #[serde(rename = "$scope")]
    #[serde(default)]
    pub(crate) scope: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Timestamp {
    #[serde(rename = "$timestamp")]
    body: TimestampBody,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TimestampBody {
    t: u32,
    i: u32,
}

impl Timestamp {
    pub(crate) fn parse(self) -> crate::Timestamp {
        crate::Timestamp {
            time: self.body.t,
            increment: self.body.i,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DateTime {
    #[serde(rename = "$date")]
    body: DateTimeBody,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DateTimeBody {
    Canonical(Int64),
    Relaxed(String),
}

impl DateTime {
    pub(crate) fn parse(self) -> Result<crate::DateTime> {
        match self.body {
            DateTimeBody::Canonical(date) => {
                let date = date.parse()?;
                Ok(crate::DateTime::from_millis(date))
            }
            DateTimeBody::Relaxed(date) => crate::DateTime::parse_rfc3339_str(&date).map_err(|_| {
                Error::invalid_argument(format!(
                    "expected RFC 3339 formatted UTC datetime, got \"{}\"",
                    date
                ))
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MinKey {
    #[serde(rename = "$minKey")]
    value: u8,
}

impl MinKey {
    pub(crate) fn parse(self) -> Result<Bson> {
        if self.value == 1 {
            Ok(Bson::MinKey)
        } else {
            Err(Error::invalid_argument(format!(
                "the value of $minKey must be 1, got {}",
                self.value
            )))
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MaxKey {
    #[serde(rename = "$maxKey")]
    value: u8,
}

impl MaxKey {
    pub(crate) fn parse(self) -> Result<Bson> {
        if self.value == 1 {
            Ok(Bson::MaxKey)
        } else {
            Err(Error::invalid_argument(format!(
                "the value of $maxKey must be 1, got {}",
                self.value
            )))
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DbPointer {
    #[serde(rename = "$dbPointer")]
    body: DbPointerBody,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DbPointerBody {
    #[serde(rename = "$ref")]
    ref_ns: String,

    #[serde(rename = "$id")]
    id: ObjectId,
}

impl DbPointer {
    pub(crate) fn parse(self) -> Result<crate::DbPointer> {
        Ok(crate::DbPointer {
            namespace: self.body.ref_ns,
            id: self.body.id.parse()?,
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Undefined {
    #[serde(rename = "$undefined")]
    value: bool,
}

impl Undefined {
    pub(crate) fn parse(self) -> Result<Bson> {
        if self.value {
            Ok(Bson::Undefined)
        } else {
            Err(Error::invalid_argument("$undefined must always be true"))
        }
    }
}
