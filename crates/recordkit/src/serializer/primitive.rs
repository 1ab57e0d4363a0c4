// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive leaf serializer.
//!
//! Each primitive kind has its own [`LeafFormat`]. Decoding is lenient: a
//! leaf is accepted in any of the formats this module can write, so a tree
//! written with one configuration can be read with another.

use super::tree::{bytes_from_text, bytes_text, date_text, datetime_text, time_text, Node};
use crate::error::{Error, Result};
use crate::schema::PrimitiveKind;
use crate::value::Value;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Representation of a primitive leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafFormat {
    /// Typed node, left to the text format.
    #[default]
    Native,
    /// Text: `Y`/`N` booleans, decimal numbers, ISO-8601 temporals, base64 bytes.
    Text,
    /// Integer temporals: `yyyymmdd`, `hhmmssfff`, `yyyymmddhhmmssfff`.
    IsoInt,
}

/// Per-kind leaf formats. Strings are always written as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveSerializer {
    pub boolean: LeafFormat,
    pub int: LeafFormat,
    pub long: LeafFormat,
    pub float: LeafFormat,
    pub date: LeafFormat,
    pub time: LeafFormat,
    pub datetime: LeafFormat,
    pub uuid: LeafFormat,
    pub bytes: LeafFormat,
}

impl PrimitiveSerializer {
    /// Typed nodes for every kind.
    pub fn native() -> Self {
        Self::default()
    }

    /// Text for every kind.
    pub fn text() -> Self {
        Self::uniform(LeafFormat::Text)
    }

    /// Booleans and numbers native, everything else text.
    pub fn json() -> Self {
        Self {
            boolean: LeafFormat::Native,
            int: LeafFormat::Native,
            long: LeafFormat::Native,
            float: LeafFormat::Native,
            ..Self::text()
        }
    }

    /// Like [`json`](Self::json) but with integer temporals.
    pub fn iso_int() -> Self {
        Self {
            date: LeafFormat::IsoInt,
            time: LeafFormat::IsoInt,
            datetime: LeafFormat::IsoInt,
            ..Self::json()
        }
    }

    fn uniform(format: LeafFormat) -> Self {
        Self {
            boolean: format,
            int: format,
            long: format,
            float: format,
            date: format,
            time: format,
            datetime: format,
            uuid: format,
            bytes: format,
        }
    }

    pub fn format_for(&self, kind: PrimitiveKind) -> LeafFormat {
        match kind {
            PrimitiveKind::Bool => self.boolean,
            PrimitiveKind::Int => self.int,
            PrimitiveKind::Long => self.long,
            PrimitiveKind::Float => self.float,
            PrimitiveKind::String => LeafFormat::Native,
            PrimitiveKind::Date => self.date,
            PrimitiveKind::Time => self.time,
            PrimitiveKind::DateTime => self.datetime,
            PrimitiveKind::Uuid => self.uuid,
            PrimitiveKind::Bytes => self.bytes,
        }
    }

    /// Integer temporals are only defined for date and time kinds.
    pub fn validate(&self) -> Result<()> {
        let non_temporal = [
            ("boolean", self.boolean),
            ("int", self.int),
            ("long", self.long),
            ("float", self.float),
            ("uuid", self.uuid),
            ("bytes", self.bytes),
        ];
        for (name, format) in non_temporal {
            if format == LeafFormat::IsoInt {
                return Err(Error::Config(format!(
                    "iso_int format is not defined for {} leaves",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Encode a primitive value declared with `kind`.
    pub fn serialize(&self, value: &Value, kind: PrimitiveKind, path: &str) -> Result<Node> {
        use LeafFormat::*;
        let format = self.format_for(kind);
        let node = match (kind, value, format) {
            (PrimitiveKind::Bool, Value::Bool(v), Native) => Node::Bool(*v),
            (PrimitiveKind::Bool, Value::Bool(v), _) => Node::from(if *v { "Y" } else { "N" }),
            (PrimitiveKind::Int, Value::Int(v), Native) => Node::Int(i64::from(*v)),
            (PrimitiveKind::Int, Value::Int(v), _) => Node::String(v.to_string()),
            (PrimitiveKind::Long, Value::Long(v), Native) => Node::Int(*v),
            (PrimitiveKind::Long, Value::Long(v), _) => Node::String(v.to_string()),
            (PrimitiveKind::Float, Value::Float(v), Native) => Node::Float(*v),
            (PrimitiveKind::Float, Value::Float(v), _) => Node::String(v.to_string()),
            (PrimitiveKind::String, Value::String(v), _) => Node::String(v.clone()),
            (PrimitiveKind::Date, Value::Date(v), Native) => Node::Date(*v),
            (PrimitiveKind::Date, Value::Date(v), Text) => Node::String(date_text(v)),
            (PrimitiveKind::Date, Value::Date(v), IsoInt) => Node::Int(date_to_int(v)),
            (PrimitiveKind::Time, Value::Time(v), Native) => Node::Time(*v),
            (PrimitiveKind::Time, Value::Time(v), Text) => Node::String(time_text(v)),
            (PrimitiveKind::Time, Value::Time(v), IsoInt) => Node::Int(time_to_int(v, path)?),
            (PrimitiveKind::DateTime, Value::DateTime(v), Native) => Node::DateTime(*v),
            (PrimitiveKind::DateTime, Value::DateTime(v), Text) => {
                Node::String(datetime_text(v))
            }
            (PrimitiveKind::DateTime, Value::DateTime(v), IsoInt) => {
                let date = date_to_int(&v.date_naive());
                Node::Int(date * 1_000_000_000 + time_to_int(&v.time(), path)?)
            }
            (PrimitiveKind::Uuid, Value::Uuid(v), Native) => Node::Uuid(*v),
            (PrimitiveKind::Uuid, Value::Uuid(v), _) => Node::String(v.hyphenated().to_string()),
            (PrimitiveKind::Bytes, Value::Bytes(v), Native) => Node::Bytes(v.clone()),
            (PrimitiveKind::Bytes, Value::Bytes(v), _) => Node::String(bytes_text(v)),
            (_, other, _) => {
                return Err(Error::TypeMismatch {
                    path: path.to_string(),
                    expected: kind.name().to_string(),
                    actual: other.kind_name(),
                })
            }
        };
        Ok(node)
    }

    /// Decode a leaf declared with `kind`, accepting any supported format.
    pub fn deserialize(&self, node: &Node, kind: PrimitiveKind, path: &str) -> Result<Value> {
        let bad = || {
            Error::structural(
                path,
                format!("cannot read {} from {} leaf", kind.name(), node.kind_name()),
            )
        };
        let value = match (kind, node) {
            (PrimitiveKind::Bool, Node::Bool(v)) => Value::Bool(*v),
            (PrimitiveKind::Bool, Node::String(s)) => match s.as_str() {
                "Y" | "y" | "true" | "True" => Value::Bool(true),
                "N" | "n" | "false" | "False" => Value::Bool(false),
                _ => return Err(bad()),
            },
            (PrimitiveKind::Int, Node::Int(v)) => {
                Value::Int(i32::try_from(*v).map_err(|_| bad())?)
            }
            (PrimitiveKind::Int, Node::String(s)) => Value::Int(s.trim().parse().map_err(|_| bad())?),
            (PrimitiveKind::Long, Node::Int(v)) => Value::Long(*v),
            (PrimitiveKind::Long, Node::String(s)) => {
                Value::Long(s.trim().parse().map_err(|_| bad())?)
            }
            (PrimitiveKind::Float, Node::Float(v)) => Value::Float(*v),
            (PrimitiveKind::Float, Node::Int(v)) => Value::Float(*v as f64),
            (PrimitiveKind::Float, Node::String(s)) => {
                Value::Float(s.trim().parse().map_err(|_| bad())?)
            }
            (PrimitiveKind::String, Node::String(s)) => Value::String(s.clone()),
            (PrimitiveKind::Date, Node::Date(v)) => Value::Date(*v),
            (PrimitiveKind::Date, Node::String(s)) => Value::Date(
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| bad())?,
            ),
            (PrimitiveKind::Date, Node::Int(v)) => Value::Date(date_from_int(*v).ok_or_else(bad)?),
            (PrimitiveKind::Time, Node::Time(v)) => Value::Time(*v),
            (PrimitiveKind::Time, Node::String(s)) => Value::Time(
                NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f").map_err(|_| bad())?,
            ),
            (PrimitiveKind::Time, Node::Int(v)) => Value::Time(time_from_int(*v).ok_or_else(bad)?),
            (PrimitiveKind::DateTime, Node::DateTime(v)) => Value::DateTime(*v),
            (PrimitiveKind::DateTime, Node::String(s)) => {
                Value::DateTime(datetime_from_text(s.trim()).ok_or_else(bad)?)
            }
            (PrimitiveKind::DateTime, Node::Int(v)) => {
                Value::DateTime(datetime_from_int(*v).ok_or_else(bad)?)
            }
            (PrimitiveKind::Uuid, Node::Uuid(v)) => Value::Uuid(*v),
            (PrimitiveKind::Uuid, Node::String(s)) => {
                Value::Uuid(Uuid::parse_str(s.trim()).map_err(|_| bad())?)
            }
            (PrimitiveKind::Bytes, Node::Bytes(v)) => Value::Bytes(v.clone()),
            (PrimitiveKind::Bytes, Node::String(s)) => {
                Value::Bytes(bytes_from_text(s).ok_or_else(bad)?)
            }
            _ => return Err(bad()),
        };
        Ok(value)
    }
}

/// Text token for a primitive key field.
pub(crate) fn format_token(value: &Value, kind: PrimitiveKind, path: &str) -> Result<String> {
    match PrimitiveSerializer::text().serialize(value, kind, path)? {
        Node::String(s) => Ok(s),
        other => Err(Error::structural(
            path,
            format!("{} leaf has no text form", other.kind_name()),
        )),
    }
}

/// Primitive key field from its text token.
pub(crate) fn parse_token(token: &str, kind: PrimitiveKind, path: &str) -> Result<Value> {
    PrimitiveSerializer::text().deserialize(&Node::String(token.to_string()), kind, path)
}

// ----------------------------------------------------------------------------
// Integer temporals
// ----------------------------------------------------------------------------

fn date_to_int(value: &NaiveDate) -> i64 {
    i64::from(value.year()) * 10_000 + i64::from(value.month()) * 100 + i64::from(value.day())
}

fn date_from_int(value: i64) -> Option<NaiveDate> {
    let year = i32::try_from(value / 10_000).ok()?;
    let month = u32::try_from((value / 100) % 100).ok()?;
    let day = u32::try_from(value % 100).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn time_to_int(value: &NaiveTime, path: &str) -> Result<i64> {
    if value.nanosecond() % 1_000_000 != 0 {
        return Err(Error::Validation {
            type_name: "time".to_string(),
            path: path.to_string(),
            reason: "sub-millisecond precision cannot be written as an integer".to_string(),
        });
    }
    let millis = i64::from(value.nanosecond() / 1_000_000);
    Ok(((i64::from(value.hour()) * 100 + i64::from(value.minute())) * 100
        + i64::from(value.second()))
        * 1_000
        + millis)
}

fn time_from_int(value: i64) -> Option<NaiveTime> {
    let millis = u32::try_from(value % 1_000).ok()?;
    let second = u32::try_from((value / 1_000) % 100).ok()?;
    let minute = u32::try_from((value / 100_000) % 100).ok()?;
    let hour = u32::try_from(value / 10_000_000).ok()?;
    NaiveTime::from_hms_milli_opt(hour, minute, second, millis)
}

fn datetime_from_int(value: i64) -> Option<DateTime<Utc>> {
    let date = date_from_int(value / 1_000_000_000)?;
    let time = time_from_int(value % 1_000_000_000)?;
    Some(NaiveDateTime::new(date, time).and_utc())
}

fn datetime_from_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|value| value.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, 31)
            .and_then(|d| d.and_hms_milli_opt(10, 15, 30, 250))
            .expect("datetime")
            .and_utc()
    }

    #[test]
    fn test_text_formats() {
        let text = PrimitiveSerializer::text();
        let node = text
            .serialize(&Value::Bool(true), PrimitiveKind::Bool, "flag")
            .expect("bool");
        assert_eq!(node, Node::from("Y"));
        let node = text
            .serialize(&Value::DateTime(datetime()), PrimitiveKind::DateTime, "ts")
            .expect("datetime");
        assert_eq!(node, Node::from("2024-01-31T10:15:30.250Z"));
    }

    #[test]
    fn test_iso_int_formats() {
        let iso = PrimitiveSerializer::iso_int();
        let node = iso
            .serialize(&Value::DateTime(datetime()), PrimitiveKind::DateTime, "ts")
            .expect("datetime");
        assert_eq!(node, Node::Int(20240131101530250));
        let back = iso
            .deserialize(&node, PrimitiveKind::DateTime, "ts")
            .expect("decode");
        assert_eq!(back, Value::DateTime(datetime()));

        let date = NaiveDate::from_ymd_opt(2024, 2, 29).expect("date");
        let node = iso
            .serialize(&Value::Date(date), PrimitiveKind::Date, "d")
            .expect("date");
        assert_eq!(node, Node::Int(20240229));
    }

    #[test]
    fn test_lenient_decoding() {
        let native = PrimitiveSerializer::native();
        assert_eq!(
            native
                .deserialize(&Node::from("N"), PrimitiveKind::Bool, "b")
                .expect("bool"),
            Value::Bool(false)
        );
        assert_eq!(
            native
                .deserialize(&Node::Int(3), PrimitiveKind::Float, "f")
                .expect("float"),
            Value::Float(3.0)
        );
        assert_eq!(
            native
                .deserialize(&Node::from("AQID"), PrimitiveKind::Bytes, "b")
                .expect("bytes"),
            Value::Bytes(vec![1, 2, 3])
        );
        let err = native
            .deserialize(&Node::from("x"), PrimitiveKind::Int, "lines[2].qty")
            .unwrap_err();
        assert!(err.to_string().contains("lines[2].qty"));
    }

    #[test]
    fn test_int_range_checked() {
        let err = PrimitiveSerializer::native()
            .deserialize(&Node::Int(i64::MAX), PrimitiveKind::Int, "n")
            .unwrap_err();
        assert!(matches!(err, Error::Structural { .. }));
    }

    #[test]
    fn test_iso_int_rejected_for_numbers() {
        let config = PrimitiveSerializer {
            float: LeafFormat::IsoInt,
            ..PrimitiveSerializer::native()
        };
        assert!(config.validate().is_err());
        assert!(PrimitiveSerializer::iso_int().validate().is_ok());
    }

    #[test]
    fn test_tokens() {
        let token = format_token(&Value::Long(42), PrimitiveKind::Long, "id").expect("token");
        assert_eq!(token, "42");
        assert_eq!(
            parse_token("42", PrimitiveKind::Long, "id").expect("parse"),
            Value::Long(42)
        );
    }
}
