use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::DEFAULT_UNIT;

/// A furniture listing as projected by the catalog queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Furniture {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ambiente: Option<Ambiente>,
    #[serde(default)]
    pub measurements: Option<Measurements>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<ImageRef>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Furniture {
    /// The slug exactly as stored, only when it is defined and not blank.
    pub fn slug_str(&self) -> Option<&str> {
        self.slug
            .as_ref()
            .map(|s| s.current.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn cover(&self) -> Option<&ImageRef> {
        self.images.first()
    }

    /// Trimmed, non-empty text fields; blank strings count as absent.
    pub fn description_text(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    pub fn material_text(&self) -> Option<&str> {
        non_blank(self.material.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slug {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: String,
}

impl Slug {
    pub fn new(current: impl Into<String>) -> Self {
        Self { current: current.into() }
    }
}

/// Room the piece is meant for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Ambiente {
    Comedor,
    Dormitorio,
    Oficina,
    Bano,
    Exterior,
    #[serde(other)]
    Otro,
}

impl Ambiente {
    pub const ALL: [Ambiente; 6] = [
        Ambiente::Comedor,
        Ambiente::Dormitorio,
        Ambiente::Oficina,
        Ambiente::Bano,
        Ambiente::Exterior,
        Ambiente::Otro,
    ];

    /// Stored value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ambiente::Comedor => "comedor",
            Ambiente::Dormitorio => "dormitorio",
            Ambiente::Oficina => "oficina",
            Ambiente::Bano => "bano",
            Ambiente::Exterior => "exterior",
            Ambiente::Otro => "otro",
        }
    }

    /// Editor/display label.
    pub fn label(&self) -> &'static str {
        match self {
            Ambiente::Comedor => "Comedor",
            Ambiente::Dormitorio => "Dormitorio",
            Ambiente::Oficina => "Oficina",
            Ambiente::Bano => "Baño",
            Ambiente::Exterior => "Exterior",
            Ambiente::Otro => "Otro",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Measurements {
    #[serde(default)]
    pub alto: Option<f64>,
    #[serde(default)]
    pub ancho: Option<f64>,
    #[serde(default)]
    pub profundidad: Option<f64>,
    #[serde(default)]
    pub unidad: Option<String>,
}

impl Measurements {
    pub fn unit(&self) -> &str {
        non_blank(self.unidad.as_deref()).unwrap_or(DEFAULT_UNIT)
    }
}

/// An image entry of the `images` array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRef {
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    pub asset: AssetRef,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub hotspot: Option<Hotspot>,
    #[serde(default)]
    pub crop: Option<Crop>,
}

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            key: None,
            asset: AssetRef { reference: reference.into() },
            alt: None,
            hotspot: None,
            crop: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// Identity used by the gallery.
    pub fn reference(&self) -> &str {
        &self.asset.reference
    }

    /// Alt text, falling back to the listing title.
    pub fn alt_or<'a>(&'a self, title: &'a str) -> &'a str {
        non_blank(self.alt.as_deref()).unwrap_or(title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

/// Focal point, all values as fractions of the source image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
    #[serde(default = "one")]
    pub height: f64,
    #[serde(default = "one")]
    pub width: f64,
}

/// Crop insets, as fractions of the source image.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Crop {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
}

fn one() -> f64 {
    1.0
}

/// GROQ projections return `null` for missing attributes.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
