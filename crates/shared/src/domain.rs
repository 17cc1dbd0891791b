use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(SpreadId);
id_newtype!(ReadingId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Upright,
    Reversed,
}

impl Orientation {
    pub fn from_reversed(reversed: bool) -> Self {
        if reversed {
            Self::Reversed
        } else {
            Self::Upright
        }
    }
}

/// A card as drawn into a spread position. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub reversed: bool,
    pub position: u32,
    #[serde(default)]
    pub orientation: Orientation,
}

impl Card {
    pub fn new(name: impl Into<String>, position: u32, reversed: bool) -> Self {
        Self {
            name: name.into(),
            reversed,
            position,
            orientation: Orientation::from_reversed(reversed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadInfo {
    pub id: SpreadId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub card_count: u32,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub usage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadPosition {
    pub index: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub significance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadDetail {
    pub info: SpreadInfo,
    pub positions: Vec<SpreadPosition>,
}

/// Outcome of one reading. `individual_readings` stays raw JSON: its
/// per-card records are loosely shaped and only read for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReadingResult {
    pub success: bool,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub question_category: String,
    #[serde(default)]
    pub spread_type: SpreadId,
    #[serde(default)]
    pub spread_name: String,
    #[serde(default)]
    pub drawn_cards: Vec<Card>,
    #[serde(default)]
    pub individual_readings: Vec<serde_json::Value>,
    #[serde(default)]
    pub combined_reading: String,
    #[serde(default)]
    pub reading_summary: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub fallback_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingHistoryEntry {
    #[serde(default)]
    pub id: ReadingId,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub user_question: String,
    #[serde(default)]
    pub question_category: String,
    #[serde(default)]
    pub spread_type: SpreadId,
    #[serde(default)]
    pub reading_summary: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub total_readings: u64,
    #[serde(default)]
    pub question_types: BTreeMap<String, u64>,
    #[serde(default)]
    pub spread_types: BTreeMap<String, u64>,
    #[serde(default)]
    pub most_recent: Option<String>,
    #[serde(default)]
    pub oldest: Option<String>,
    #[serde(default)]
    pub average_per_month: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardList {
    pub cards: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    pub readings: Vec<ReadingHistoryEntry>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadRecommendation {
    pub spread_id: SpreadId,
    pub spread: Option<SpreadDetail>,
    pub reason: String,
}
