//! Scene data model for the live diagram protocol.
//!
//! A `Scene` is an ordered map from object name to `ShapeRecord`. Records
//! are a closed set of seven shapes; anything else the server sends is kept
//! as `ShapeRecord::Unknown` so it can be echoed back untouched. Field names
//! on the wire are terse (`xc`, `namecb`, ...) and mapped here with
//! `#[serde(rename)]`; fields the client does not model are retained in
//! each shape's `extra` map.

use crate::id::ObjectId;
use crate::protocol::CodecError;
use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

// ─── Colors & strokes ────────────────────────────────────────────────────

/// RGB(A) color with channels in [0.0, 1.0]. Alpha is optional on the wire
/// (curve colors omit it) and defaults to opaque.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
}

impl Color {
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: None }
    }

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a: Some(a) }
    }

    pub fn alpha(&self) -> f64 {
        self.a.unwrap_or(1.0)
    }

    /// 8-bit channels, each `round(255 * c)`.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.alpha()),
        ]
    }

    /// `#rrggbb`, alpha ignored (it is applied as a separate fill opacity).
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Fill color of circles, ellipses and squares. Unlike curve colors, the
/// alpha channel is required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl FillColor {
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

impl From<FillColor> for Color {
    fn from(fill: FillColor) -> Self {
        Color::rgba(fill.r, fill.g, fill.b, fill.a)
    }
}

fn channel(c: f64) -> u8 {
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Curve stroke style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    Solid,
    Dashed,
}

/// A model-space point, `[x, y]` on the wire. Model space is y-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPoint(pub f64, pub f64);

impl ModelPoint {
    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────

/// `CB`: a curve through an ordered list of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    #[serde(rename = "pathcb")]
    pub path: SmallVec<[ModelPoint; 8]>,
    #[serde(rename = "colorcb")]
    pub color: Color,
    #[serde(rename = "stylecb")]
    pub style: StrokeStyle,
    #[serde(rename = "namecb")]
    pub name: ObjectId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `L`: a text label centered on its anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "xl")]
    pub x: f64,
    #[serde(rename = "yl")]
    pub y: f64,
    #[serde(rename = "textl")]
    pub text: String,
    #[serde(rename = "namel")]
    pub name: ObjectId,
    /// Measured pixel width, filled in by the client after the first render.
    #[serde(rename = "wl", default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Measured pixel height, filled in by the client after the first render.
    #[serde(rename = "hl", default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `P`: a point marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    #[serde(rename = "xp")]
    pub x: f64,
    #[serde(rename = "yp")]
    pub y: f64,
    #[serde(rename = "namep")]
    pub name: ObjectId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `C`: a filled circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    #[serde(rename = "xc")]
    pub x: f64,
    #[serde(rename = "yc")]
    pub y: f64,
    pub r: f64,
    #[serde(rename = "colorc")]
    pub color: FillColor,
    #[serde(rename = "namec")]
    pub name: ObjectId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `E`: a filled axis-aligned ellipse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    #[serde(rename = "xe")]
    pub x: f64,
    #[serde(rename = "ye")]
    pub y: f64,
    pub rx: f64,
    pub ry: f64,
    #[serde(rename = "colore")]
    pub color: FillColor,
    #[serde(rename = "namee")]
    pub name: ObjectId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `S`: a filled square centered on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Square {
    #[serde(rename = "xs")]
    pub x: f64,
    #[serde(rename = "ys")]
    pub y: f64,
    pub side: f64,
    #[serde(rename = "colors")]
    pub color: FillColor,
    #[serde(rename = "names")]
    pub name: ObjectId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `A`: an arrow from start to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub startx: f64,
    pub starty: f64,
    pub endx: f64,
    pub endy: f64,
    pub thickness: f64,
    #[serde(rename = "namesa")]
    pub name: ObjectId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One of the seven shapes the client knows how to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", content = "contents")]
pub enum Shape {
    #[serde(rename = "CB")]
    CubicBezier(CubicBezier),
    #[serde(rename = "L")]
    Label(Label),
    #[serde(rename = "P")]
    Point(Dot),
    #[serde(rename = "C")]
    Circle(Circle),
    #[serde(rename = "E")]
    Ellipse(Ellipse),
    #[serde(rename = "S")]
    Square(Square),
    #[serde(rename = "A")]
    Arrow(Arrow),
}

impl Shape {
    /// The identity name carried inside the record.
    pub fn name(&self) -> ObjectId {
        match self {
            Shape::CubicBezier(s) => s.name,
            Shape::Label(s) => s.name,
            Shape::Point(s) => s.name,
            Shape::Circle(s) => s.name,
            Shape::Ellipse(s) => s.name,
            Shape::Square(s) => s.name,
            Shape::Arrow(s) => s.name,
        }
    }

    /// The wire tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Shape::CubicBezier(_) => "CB",
            Shape::Label(_) => "L",
            Shape::Point(_) => "P",
            Shape::Circle(_) => "C",
            Shape::Ellipse(_) => "E",
            Shape::Square(_) => "S",
            Shape::Arrow(_) => "A",
        }
    }
}

/// A scene entry: a known shape, or a record with a tag this client does not
/// render.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeRecord {
    Known(Shape),
    Unknown { tag: String, contents: Value },
}

impl ShapeRecord {
    /// Decode the record stored under scene key `name`.
    ///
    /// # Errors
    /// Fails when the record is not an object, has no string `tag`, or a
    /// known tag's contents are missing or mistyped.
    pub fn decode(name: &str, value: Value) -> Result<Self, CodecError> {
        let mut record = match value {
            Value::Object(record) => record,
            other => {
                return Err(CodecError::NotARecord {
                    name: name.to_string(),
                    found: describe(&other),
                });
            }
        };
        let tag = match record.remove("tag") {
            Some(Value::String(tag)) => tag,
            _ => {
                return Err(CodecError::MissingTag {
                    name: name.to_string(),
                });
            }
        };
        let contents = record.remove("contents").unwrap_or(Value::Null);

        let shape = match tag.as_str() {
            "CB" => Shape::CubicBezier(contents_of(name, &tag, contents)?),
            "L" => Shape::Label(contents_of(name, &tag, contents)?),
            "P" => Shape::Point(contents_of(name, &tag, contents)?),
            "C" => Shape::Circle(contents_of(name, &tag, contents)?),
            "E" => Shape::Ellipse(contents_of(name, &tag, contents)?),
            "S" => Shape::Square(contents_of(name, &tag, contents)?),
            "A" => Shape::Arrow(contents_of(name, &tag, contents)?),
            _ => {
                log::debug!("object `{name}` has unknown tag `{tag}`, forwarding unrendered");
                return Ok(ShapeRecord::Unknown { tag, contents });
            }
        };

        if let Shape::CubicBezier(curve) = &shape
            && curve.path.len() < 2
        {
            return Err(CodecError::TooFewPoints {
                name: name.to_string(),
                count: curve.path.len(),
            });
        }

        Ok(ShapeRecord::Known(shape))
    }

    pub fn shape(&self) -> Option<&Shape> {
        match self {
            ShapeRecord::Known(shape) => Some(shape),
            ShapeRecord::Unknown { .. } => None,
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            ShapeRecord::Known(shape) => shape.tag(),
            ShapeRecord::Unknown { tag, .. } => tag,
        }
    }
}

fn contents_of<T: DeserializeOwned>(name: &str, tag: &str, contents: Value) -> Result<T, CodecError> {
    serde_json::from_value(contents).map_err(|source| CodecError::InvalidShape {
        name: name.to_string(),
        tag: tag.to_string(),
        source,
    })
}

impl Serialize for ShapeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ShapeRecord::Known(shape) => shape.serialize(serializer),
            ShapeRecord::Unknown { tag, contents } => {
                let mut record = serializer.serialize_struct("ShapeRecord", 2)?;
                record.serialize_field("tag", tag)?;
                record.serialize_field("contents", contents)?;
                record.end()
            }
        }
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// Object name → record, in wire order (which is also paint order).
///
/// Decoded records keep their wire JSON alongside, so re-encoding echoes
/// every number and field exactly as the server sent it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    objects: IndexMap<String, ShapeRecord>,
    received: IndexMap<String, Value>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a scene from an already-parsed JSON value.
    ///
    /// # Errors
    /// Fails on the first entry that does not decode; no partial scene is
    /// returned.
    pub fn from_value(value: Value) -> Result<Self, CodecError> {
        let entries = match value {
            Value::Object(entries) => entries,
            other => {
                return Err(CodecError::NotAScene {
                    found: describe(&other),
                });
            }
        };
        let mut objects = IndexMap::with_capacity(entries.len());
        let mut received = IndexMap::with_capacity(entries.len());
        for (name, raw) in entries {
            let record = ShapeRecord::decode(&name, raw.clone())?;
            received.insert(name.clone(), raw);
            objects.insert(name, record);
        }
        Ok(Self { objects, received })
    }

    /// Insert or replace a record. A replaced record is re-encoded from the
    /// model rather than echoed.
    pub fn insert(&mut self, key: impl Into<String>, record: ShapeRecord) {
        let key = key.into();
        self.received.shift_remove(&key);
        self.objects.insert(key, record);
    }

    pub fn get(&self, key: &str) -> Option<&ShapeRecord> {
        self.objects.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ShapeRecord)> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Identity names of every known shape in the scene.
    pub fn names(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects
            .values()
            .filter_map(ShapeRecord::shape)
            .map(Shape::name)
    }

    /// Store the measured size of the label under `key`.
    /// Returns `false` if `key` is not a label.
    pub fn record_label_extent(&mut self, key: &str, width: f64, height: f64) -> bool {
        match self.objects.get_mut(key) {
            Some(ShapeRecord::Known(Shape::Label(label))) => {
                label.width = Some(width);
                label.height = Some(height);
            }
            _ => return false,
        }
        if let Some(Value::Object(contents)) = self
            .received
            .get_mut(key)
            .and_then(|raw| raw.get_mut("contents"))
        {
            contents.insert("wl".to_string(), Value::from(width));
            contents.insert("hl".to_string(), Value::from(height));
        }
        true
    }
}

impl Serialize for Scene {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.objects.len()))?;
        for (name, record) in &self.objects {
            match self.received.get(name) {
                Some(raw) => map.serialize_entry(name, raw)?,
                None => map.serialize_entry(name, record)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Scene {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Scene::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// JSON type name for diagnostics.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
