use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{ReadingHistoryEntry, SpreadDetail, SpreadId, SpreadInfo, SpreadPosition, Statistics},
    error::ApiStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub api: ApiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReadingRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread_type: Option<SpreadId>,
    pub save_result: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadsResponse {
    #[serde(flatten)]
    pub api: ApiStatus,
    #[serde(default)]
    pub spreads: Option<Vec<SpreadInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub significance: String,
}

/// Full spread configuration as the backend stores it. It carries no id of
/// its own; `positions` is keyed by the 1-based position number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub card_count: u32,
    #[serde(default)]
    pub positions: BTreeMap<String, PositionConfig>,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub difficulty: String,
}

impl SpreadConfig {
    pub fn into_detail(self, id: SpreadId) -> SpreadDetail {
        let mut positions = self
            .positions
            .into_iter()
            .filter_map(|(key, position)| {
                let index = key.trim().parse::<u32>().ok()?;
                Some(SpreadPosition {
                    index,
                    name: position.name,
                    description: position.description,
                    significance: position.significance,
                })
            })
            .collect::<Vec<_>>();
        positions.sort_by_key(|position| position.index);

        SpreadDetail {
            info: SpreadInfo {
                id,
                name: self.name,
                description: self.description,
                card_count: self.card_count,
                difficulty: self.difficulty,
                usage: self.usage,
            },
            positions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadDetailResponse {
    #[serde(flatten)]
    pub api: ApiStatus,
    #[serde(default)]
    pub spread: Option<SpreadConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardsResponse {
    #[serde(flatten)]
    pub api: ApiStatus,
    #[serde(default)]
    pub cards: Option<Vec<String>>,
    #[serde(default)]
    pub total: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(flatten)]
    pub api: ApiStatus,
    #[serde(default)]
    pub readings: Option<Vec<ReadingHistoryEntry>>,
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsResponse {
    #[serde(flatten)]
    pub api: ApiStatus,
    #[serde(default)]
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendSpreadRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendSpreadResponse {
    #[serde(flatten)]
    pub api: ApiStatus,
    #[serde(default)]
    pub recommended_spread: Option<SpreadId>,
    #[serde(default)]
    pub spread_info: Option<SpreadConfig>,
    #[serde(default)]
    pub reason: String,
}
