use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::ItemId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemError {
    #[error("item id cannot be empty")]
    EmptyId,

    #[error("item name cannot be empty")]
    EmptyName,

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown meridian: {0}")]
    UnknownMeridian(String),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Body region an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Head,
    Face,
    UpperLimb,
    Trunk,
    LowerLimb,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Head,
        Category::Face,
        Category::UpperLimb,
        Category::Trunk,
        Category::LowerLimb,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Category::Head => "head",
            Category::Face => "face",
            Category::UpperLimb => "upper_limb",
            Category::Trunk => "trunk",
            Category::LowerLimb => "lower_limb",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Head => "頭部",
            Category::Face => "顔面",
            Category::UpperLimb => "上肢",
            Category::Trunk => "体幹",
            Category::LowerLimb => "下肢",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| ItemError::UnknownCategory(s.to_owned()))
    }
}

//
// ─── MERIDIAN ──────────────────────────────────────────────────────────────────
//

/// Anatomical grouping derived from the item id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Meridian {
    Gv,
    Cv,
    Lu,
    Li,
    St,
    Sp,
    Ht,
    Si,
    Bl,
    Ki,
    Pc,
    Te,
    Gb,
    Lr,
}

impl Meridian {
    /// Display order: governing, conception, then the twelve regular channels.
    pub const ORDER: [Meridian; 14] = [
        Meridian::Gv,
        Meridian::Cv,
        Meridian::Lu,
        Meridian::Li,
        Meridian::St,
        Meridian::Sp,
        Meridian::Ht,
        Meridian::Si,
        Meridian::Bl,
        Meridian::Ki,
        Meridian::Pc,
        Meridian::Te,
        Meridian::Gb,
        Meridian::Lr,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Meridian::Gv => "GV",
            Meridian::Cv => "CV",
            Meridian::Lu => "LU",
            Meridian::Li => "LI",
            Meridian::St => "ST",
            Meridian::Sp => "SP",
            Meridian::Ht => "HT",
            Meridian::Si => "SI",
            Meridian::Bl => "BL",
            Meridian::Ki => "KI",
            Meridian::Pc => "PC",
            Meridian::Te => "TE",
            Meridian::Gb => "GB",
            Meridian::Lr => "LR",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Meridian::Gv => "督脈",
            Meridian::Cv => "任脈",
            Meridian::Lu => "手太陰肺経",
            Meridian::Li => "手陽明大腸経",
            Meridian::St => "足陽明胃経",
            Meridian::Sp => "足太陰脾経",
            Meridian::Ht => "手少陰心経",
            Meridian::Si => "手太陽小腸経",
            Meridian::Bl => "足太陽膀胱経",
            Meridian::Ki => "足少陰腎経",
            Meridian::Pc => "手厥陰心包経",
            Meridian::Te => "手少陽三焦経",
            Meridian::Gb => "足少陽胆経",
            Meridian::Lr => "足厥陰肝経",
        }
    }

    /// Number of points on the channel in the standard 361-point set.
    #[must_use]
    pub fn point_count(self) -> usize {
        match self {
            Meridian::Gv => 28,
            Meridian::Cv => 24,
            Meridian::Lu => 11,
            Meridian::Li => 20,
            Meridian::St => 45,
            Meridian::Sp => 21,
            Meridian::Ht => 9,
            Meridian::Si => 19,
            Meridian::Bl => 67,
            Meridian::Ki => 27,
            Meridian::Pc => 9,
            Meridian::Te => 23,
            Meridian::Gb => 44,
            Meridian::Lr => 14,
        }
    }

    /// Resolves the group of an item from its id prefix; `None` for ids outside the 14 channels.
    #[must_use]
    pub fn from_item_id(id: &ItemId) -> Option<Self> {
        id.prefix().parse().ok()
    }
}

impl fmt::Display for Meridian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Meridian {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Meridian::ORDER
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| ItemError::UnknownMeridian(s.to_owned()))
    }
}

//
// ─── ITEM ──────────────────────────────────────────────────────────────────────
//

/// One learnable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    reading: String,
    location: String,
    effect: String,
    category: Category,
}

impl Item {
    /// Creates a validated item.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyId` or `ItemError::EmptyName` for blank fields.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        reading: impl Into<String>,
        location: impl Into<String>,
        effect: impl Into<String>,
        category: Category,
    ) -> Result<Self, ItemError> {
        let name = name.into();
        if id.as_str().trim().is_empty() {
            return Err(ItemError::EmptyId);
        }
        if name.trim().is_empty() {
            return Err(ItemError::EmptyName);
        }

        Ok(Self {
            id,
            name,
            reading: reading.into(),
            location: location.into(),
            effect: effect.into(),
            category,
        })
    }

    /// Re-checks the invariants of `new` on a deserialized item.
    pub(crate) fn validate(&self) -> Result<(), ItemError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ItemError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(ItemError::EmptyName);
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn reading(&self) -> &str {
        &self.reading
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn effect(&self) -> &str {
        &self.effect
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn meridian(&self) -> Option<Meridian> {
        Meridian::from_item_id(&self.id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
