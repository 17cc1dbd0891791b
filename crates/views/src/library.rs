//! Card reference library.

use std::{convert::Infallible, str::FromStr};

use client_core::TarotApi;
use tracing::{info, warn};

use crate::DataSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arcana {
    Major,
    Minor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardCategory {
    #[default]
    All,
    MajorArcana,
    MinorArcana,
}

impl CardCategory {
    fn includes(self, arcana: Arcana) -> bool {
        match self {
            Self::All => true,
            Self::MajorArcana => arcana == Arcana::Major,
            Self::MinorArcana => arcana == Arcana::Minor,
        }
    }
}

impl FromStr for CardCategory {
    type Err = Infallible;

    /// Unknown words read as `all`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw.trim() {
            "major_arcana" | "major" => Self::MajorArcana,
            "minor_arcana" | "minor" => Self::MinorArcana,
            _ => Self::All,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEntry {
    pub id: String,
    pub name: String,
    pub arcana: Arcana,
    pub number: Option<u32>,
    pub keywords: Vec<String>,
    pub description: String,
}

impl CardEntry {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .keywords
                .iter()
                .any(|keyword| keyword.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuitEntry {
    pub suit: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const SUITS: [SuitEntry; 4] = [
    SuitEntry {
        suit: "cups",
        name: "圣杯",
        description: "代表情感、爱情、人际关系和精神层面。",
    },
    SuitEntry {
        suit: "wands",
        name: "权杖",
        description: "象征激情、创造力、行动力和事业发展。",
    },
    SuitEntry {
        suit: "swords",
        name: "宝剑",
        description: "代表思想、沟通、冲突和理性分析。",
    },
    SuitEntry {
        suit: "pentacles",
        name: "星币",
        description: "象征物质、金钱、健康和实用层面。",
    },
];

/// (id, name, number, keywords, description)
const MAJOR_ARCANA: &[(&str, &str, u32, &str, &str)] = &[
    ("fool", "愚者", 0, "新开始, 冒险, 纯真", "代表新的开始和无限的可能性，鼓励我们以开放的心态面对未知。"),
    ("magician", "魔术师", 1, "意志力, 创造, 技能", "象征着将想法转化为现实的能力，提醒我们拥有改变生活的力量。"),
    ("high_priestess", "女祭司", 2, "直觉, 神秘, 内在智慧", "代表内在的智慧和直觉，引导我们倾听内心的声音。"),
    ("empress", "皇后", 3, "丰富, 创造力, 母性", "象征丰饶与创造力，代表生命的孕育和成长。"),
    ("emperor", "皇帝", 4, "权威, 结构, 领导", "代表秩序与权威，强调建立稳固的基础和领导能力。"),
    ("hierophant", "教皇", 5, "传统, 学习, 指导", "象征传统智慧和精神指导，提醒我们学习和传承的重要性。"),
];

fn builtin_cards() -> Vec<CardEntry> {
    MAJOR_ARCANA
        .iter()
        .map(|(id, name, number, keywords, description)| CardEntry {
            id: id.to_string(),
            name: name.to_string(),
            arcana: Arcana::Major,
            number: Some(*number),
            keywords: keywords.split(", ").map(str::to_string).collect(),
            description: description.to_string(),
        })
        .collect()
}

/// Minor cards are named after their suit, e.g. `权杖王牌`.
fn arcana_of(name: &str) -> Arcana {
    if SUITS.iter().any(|suit| name.contains(suit.name)) {
        Arcana::Minor
    } else {
        Arcana::Major
    }
}

/// A name from the backend, enriched with built-in details when known.
fn entry_for(name: &str, builtin: &[CardEntry]) -> CardEntry {
    if let Some(known) = builtin.iter().find(|card| card.name == name) {
        return known.clone();
    }
    CardEntry {
        id: name.to_string(),
        name: name.to_string(),
        arcana: arcana_of(name),
        number: None,
        keywords: Vec::new(),
        description: String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryListing<'a> {
    pub cards: Vec<&'a CardEntry>,
    /// Suits are listed for `all` and `minor_arcana` and are not searched.
    pub suits: Vec<&'a SuitEntry>,
}

#[derive(Debug, Clone)]
pub struct CardLibrary {
    cards: Vec<CardEntry>,
    suits: Vec<SuitEntry>,
    source: DataSource,
}

impl CardLibrary {
    /// Loads the full card list from the backend. Falls back to the built-in
    /// major arcana when the request fails or returns nothing.
    pub async fn load(api: &dyn TarotApi) -> Self {
        match api.search_cards(None).await {
            Ok(list) if !list.cards.is_empty() => {
                let builtin = builtin_cards();
                let cards = list
                    .cards
                    .iter()
                    .map(|name| entry_for(name, &builtin))
                    .collect::<Vec<_>>();
                info!(count = cards.len(), total = list.total, "library: cards loaded");
                Self {
                    cards,
                    suits: SUITS.to_vec(),
                    source: DataSource::Backend,
                }
            }
            Ok(_) => {
                warn!("library: backend returned no cards; using built-in set");
                Self::builtin()
            }
            Err(err) => {
                warn!(error = %err, "library: load failed; using built-in set");
                Self::builtin()
            }
        }
    }

    pub fn builtin() -> Self {
        Self {
            cards: builtin_cards(),
            suits: SUITS.to_vec(),
            source: DataSource::BuiltIn,
        }
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn cards(&self) -> &[CardEntry] {
        &self.cards
    }

    pub fn card(&self, id: &str) -> Option<&CardEntry> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// Case-insensitive search over name and keywords within `category`.
    pub fn filter(&self, category: CardCategory, search: &str) -> LibraryListing<'_> {
        let needle = search.trim().to_lowercase();
        let cards = self
            .cards
            .iter()
            .filter(|card| category.includes(card.arcana))
            .filter(|card| needle.is_empty() || card.matches(&needle))
            .collect();
        let suits = if category == CardCategory::MajorArcana {
            Vec::new()
        } else {
            self.suits.iter().collect()
        };
        LibraryListing { cards, suits }
    }
}

#[cfg(test)]
#[path = "tests/library_tests.rs"]
mod tests;
