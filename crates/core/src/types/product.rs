//! Product catalog types.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A label that is not part of a fixed vocabulary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownLabel {
    /// Which vocabulary was searched (`category`, `gender`, `color`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownLabel {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Product category.
///
/// The shop sells from a fixed set of categories; products coming back from
/// the backend keep their category as free text (see [`Product::category`])
/// so an unexpected label never breaks catalog loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "sharee")]
    Sharee,
    #[serde(rename = "panjabi")]
    Panjabi,
    #[serde(rename = "t-shirt")]
    TShirt,
    #[serde(rename = "watch")]
    Watch,
    #[serde(rename = "bag")]
    Bag,
    #[serde(rename = "hijab")]
    Hijab,
    #[serde(rename = "collection")]
    Collection,
    #[serde(rename = "cloths")]
    Cloths,
}

impl Category {
    /// Every category, in the order the admin form lists them.
    pub const ALL: [Self; 8] = [
        Self::Sharee,
        Self::Panjabi,
        Self::TShirt,
        Self::Watch,
        Self::Bag,
        Self::Hijab,
        Self::Collection,
        Self::Cloths,
    ];

    /// The wire label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sharee => "sharee",
            Self::Panjabi => "panjabi",
            Self::TShirt => "t-shirt",
            Self::Watch => "watch",
            Self::Bag => "bag",
            Self::Hijab => "hijab",
            Self::Collection => "collection",
            Self::Cloths => "cloths",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLabel::new("category", s))
    }
}

/// Target gender of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Men,
    Women,
}

impl Gender {
    /// The wire label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Men => "men",
            Self::Women => "women",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "men" => Ok(Self::Men),
            "women" => Ok(Self::Women),
            _ => Err(UnknownLabel::new("gender", s)),
        }
    }
}

/// A named color swatch from the shop palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Swatch {
    Black,
    White,
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Pink,
    Purple,
    Navy,
}

impl Swatch {
    /// The full palette, in display order.
    pub const ALL: [Self; 10] = [
        Self::Black,
        Self::White,
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Orange,
        Self::Pink,
        Self::Purple,
        Self::Navy,
    ];

    /// The wire label.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Navy => "navy",
        }
    }

    /// CSS hex code used when rendering the swatch.
    #[must_use]
    pub const fn hex(&self) -> &'static str {
        match self {
            Self::Black => "#000000",
            Self::White => "#ffffff",
            Self::Red => "#ff0000",
            Self::Blue => "#2196f3",
            Self::Green => "#00b050",
            Self::Yellow => "#ffeb3b",
            Self::Orange => "#ff9800",
            Self::Pink => "#e91e63",
            Self::Purple => "#9c27b0",
            Self::Navy => "#000080",
        }
    }
}

impl fmt::Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Swatch {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLabel::new("color", s))
    }
}

/// A product as served by the backend.
///
/// Read-only from the storefront's point of view; only the admin console
/// creates, edits or deletes products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Category label as stored by the backend.
    #[serde(default)]
    pub category: String,
    /// Empty or unrecognized values are treated as "not set".
    #[serde(
        default,
        deserialize_with = "lenient_gender",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<Gender>,
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
}

impl Product {
    /// Whether the product belongs to `category` (case-insensitive).
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        self.category.trim().eq_ignore_ascii_case(category.trim())
    }
}

fn lenient_gender<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Gender>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}
