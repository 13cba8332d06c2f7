//! Flat per-shape persistence records and the line-oriented scene document
//!
//! A record is a type tag plus a flat map of scalar fields. In a document
//! each record sits on its own line:
//!
//! ```text
//! # comment
//! Cube3D color="#000000" fill_color=none size=2 visible=true x=0 y=1 z=0
//! ```
use nalgebra::{Point3, Vector3};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, none_of, one_of, space0, space1},
    combinator::{all_consuming, map, value},
    multi::{fold_many0, many0},
    number::complete::float,
    sequence::{delimited, pair, preceded, separated_pair},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::RecordError;
use crate::shape::{Shape, ShapeId, ShapeKind};
use crate::style::{Color, Style};
use crate::transform::{Pose, RotationState, MAX_SCALE, MIN_SCALE};

/// A single scalar field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Bool(bool),
    Number(f32),
    Text(String),
    Null,
}

impl RecordValue {
    fn kind(&self) -> &'static str {
        match self {
            RecordValue::Bool(_) => "a boolean",
            RecordValue::Number(_) => "a number",
            RecordValue::Text(_) => "a string",
            RecordValue::Null => "null",
        }
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Bool(b) => write!(f, "{b}"),
            RecordValue::Number(n) => write!(f, "{n}"),
            RecordValue::Text(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    if matches!(c, '"' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")
            }
            RecordValue::Null => f.write_str("none"),
        }
    }
}

impl From<f32> for RecordValue {
    fn from(n: f32) -> Self {
        RecordValue::Number(n)
    }
}

impl From<bool> for RecordValue {
    fn from(b: bool) -> Self {
        RecordValue::Bool(b)
    }
}

impl From<&str> for RecordValue {
    fn from(s: &str) -> Self {
        RecordValue::Text(s.to_owned())
    }
}

impl From<Color> for RecordValue {
    fn from(color: Color) -> Self {
        RecordValue::Text(color.to_hex())
    }
}

impl From<Option<Color>> for RecordValue {
    fn from(color: Option<Color>) -> Self {
        color.map_or(RecordValue::Null, RecordValue::from)
    }
}

/// Type tag plus flat fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, RecordValue>,
}

impl ShapeRecord {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RecordValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<RecordValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.fields.get(key)
    }

    fn type_error(&self, key: &str, expected: &'static str) -> RecordError {
        RecordError::FieldType {
            field: key.to_owned(),
            expected,
        }
    }

    /// NaN and infinities are rejected.
    pub fn number(&self, key: &str) -> Result<Option<f32>, RecordError> {
        match self.get(key) {
            None => Ok(None),
            Some(RecordValue::Number(n)) if n.is_finite() => Ok(Some(*n)),
            Some(RecordValue::Number(_)) => Err(RecordError::NonFinite {
                field: key.to_owned(),
            }),
            Some(_) => Err(self.type_error(key, RecordValue::Number(0.0).kind())),
        }
    }

    pub fn boolean(&self, key: &str) -> Result<Option<bool>, RecordError> {
        match self.get(key) {
            None => Ok(None),
            Some(RecordValue::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(self.type_error(key, RecordValue::Bool(false).kind())),
        }
    }

    /// `Ok(None)` for a missing field, `Ok(Some(None))` for an explicit null.
    pub fn color(&self, key: &str) -> Result<Option<Option<Color>>, RecordError> {
        match self.get(key) {
            None => Ok(None),
            Some(RecordValue::Null) => Ok(Some(None)),
            Some(RecordValue::Text(text)) => Color::parse(text)
                .map(|c| Some(Some(c)))
                .ok_or_else(|| RecordError::InvalidColor {
                    field: key.to_owned(),
                    value: text.clone(),
                }),
            Some(_) => Err(self.type_error(key, "a color string")),
        }
    }

    fn number_or(&self, key: &str, default: f32) -> Result<f32, RecordError> {
        Ok(self.number(key)?.unwrap_or(default))
    }
}

impl fmt::Display for ShapeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        for (key, value) in &self.fields {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

impl Shape {
    /// Pose, style and every variant parameter as a flat record.
    pub fn to_record(&self) -> ShapeRecord {
        let Pose {
            position,
            rotation,
            scale,
        } = self.pose;
        let mut record = ShapeRecord::new(self.kind.type_tag())
            .with("x", position.x)
            .with("y", position.y)
            .with("z", position.z)
            .with("rotation_x", rotation.x)
            .with("rotation_y", rotation.y)
            .with("rotation_z", rotation.z)
            .with("scale_x", scale.x)
            .with("scale_y", scale.y)
            .with("scale_z", scale.z)
            .with("color", self.style.line_color)
            .with("fill_color", self.style.fill_color)
            .with("line_width", self.style.line_width)
            .with("visible", self.style.visible);
        for &param in self.kind.params() {
            if let Some(v) = self.kind.param(param) {
                record.insert(param.key(), v);
            }
        }
        record
    }

    /// Rebuild a shape from its record. Unknown type tags yield `Ok(None)`;
    /// missing fields fall back to defaults.
    pub fn from_record(record: &ShapeRecord) -> Result<Option<Shape>, RecordError> {
        let Some(mut kind) = ShapeKind::from_type_tag(&record.kind) else {
            return Ok(None);
        };
        for &param in kind.params() {
            if let Some(v) = record.number(param.key())? {
                kind.set_param(param, v);
            }
        }

        let pose = Pose {
            position: Point3::new(
                record.number_or("x", 0.0)?,
                record.number_or("y", 0.0)?,
                record.number_or("z", 0.0)?,
            ),
            rotation: RotationState::new(
                record.number_or("rotation_x", 0.0)?,
                record.number_or("rotation_y", 0.0)?,
                record.number_or("rotation_z", 0.0)?,
            ),
            scale: Vector3::new(
                record.number_or("scale_x", 1.0)?,
                record.number_or("scale_y", 1.0)?,
                record.number_or("scale_z", 1.0)?,
            )
            .map(|s| s.clamp(MIN_SCALE, MAX_SCALE)),
        };
        let style = Style {
            line_color: record.color("color")?.flatten().unwrap_or(Color::BLACK),
            fill_color: record.color("fill_color")?.flatten(),
            line_width: record.number_or("line_width", 1.0)?,
            visible: record.boolean("visible")?.unwrap_or(true),
        };

        Ok(Some(Shape {
            id: ShapeId::default(),
            kind,
            pose,
            style,
            selected: false,
        }))
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((none_of("\\\""), preceded(char('\\'), one_of("\\\"")))),
            String::new,
            |mut text, c| {
                text.push(c);
                text
            },
        ),
        char('"'),
    )(input)
}

fn record_value(input: &str) -> IResult<&str, RecordValue> {
    alt((
        map(quoted, RecordValue::Text),
        value(RecordValue::Bool(true), tag("true")),
        value(RecordValue::Bool(false), tag("false")),
        value(RecordValue::Null, tag("none")),
        map(float, RecordValue::Number),
    ))(input)
}

fn field(input: &str) -> IResult<&str, (&str, RecordValue)> {
    separated_pair(identifier, char('='), record_value)(input)
}

fn record_line(input: &str) -> IResult<&str, ShapeRecord> {
    map(
        all_consuming(delimited(
            space0,
            pair(identifier, many0(preceded(space1, field))),
            space0,
        )),
        |(kind, fields)| ShapeRecord {
            kind: kind.to_owned(),
            fields: fields
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value))
                .collect(),
        },
    )(input)
}

/// Parse a single record line.
pub fn parse_record(line: &str) -> Result<ShapeRecord, RecordError> {
    parse_record_at(line, 1)
}

fn parse_record_at(line: &str, number: usize) -> Result<ShapeRecord, RecordError> {
    record_line(line)
        .map(|(_, record)| record)
        .map_err(|e| RecordError::Syntax {
            line: number,
            message: match e {
                nom::Err::Error(e) | nom::Err::Failure(e) => {
                    format!("unexpected input near `{}`", preview(e.input))
                }
                nom::Err::Incomplete(_) => "incomplete record".to_owned(),
            },
        })
}

fn preview(input: &str) -> &str {
    let end = input
        .char_indices()
        .nth(16)
        .map_or(input.len(), |(i, _)| i);
    &input[..end]
}

/// Parse a whole document, skipping blank lines and `#` comments.
pub fn parse_document(text: &str) -> Result<Vec<ShapeRecord>, RecordError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| parse_record_at(line, i + 1))
        .collect()
}

/// One record per line.
pub fn write_document(records: &[ShapeRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out
}
