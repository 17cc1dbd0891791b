//! Spread reference: what each spread is for and what its positions mean.

use client_core::{ClientError, TarotApi};
use shared::domain::{SpreadDetail, SpreadId, SpreadInfo, SpreadPosition};
use tracing::{info, warn};

use crate::DataSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadGuideEntry {
    pub info: SpreadInfo,
    pub layout: String,
    pub positions: Vec<SpreadPosition>,
    pub tips: String,
}

impl SpreadGuideEntry {
    fn from_detail(detail: SpreadDetail, builtin: Option<&SpreadGuideEntry>) -> Self {
        Self {
            info: detail.info,
            layout: builtin.map(|entry| entry.layout.clone()).unwrap_or_default(),
            positions: detail.positions,
            tips: builtin.map(|entry| entry.tips.clone()).unwrap_or_default(),
        }
    }
}

struct GuideData {
    id: &'static str,
    name: &'static str,
    card_count: u32,
    difficulty: &'static str,
    layout: &'static str,
    description: &'static str,
    positions: &'static [(&'static str, &'static str)],
    usage: &'static str,
    tips: &'static str,
}

const GUIDES: &[GuideData] = &[
    GuideData {
        id: "single",
        name: "单张牌占卜",
        card_count: 1,
        difficulty: "简单",
        layout: "●",
        description: "最简单的占卜方式，适合日常指引和快速问答。",
        positions: &[("当前状况", "针对问题的直接指导和建议")],
        usage: "适用于日常决策、情绪指导、每日灵感等简单问题。",
        tips: "专注于一个具体问题，让直觉引导你选择合适的牌。",
    },
    GuideData {
        id: "three_card",
        name: "三张牌占卜",
        card_count: 3,
        difficulty: "中等",
        layout: "● ● ●",
        description: "经典的时间线占卜，揭示事件的发展轨迹。",
        positions: &[
            ("过去", "影响当前情况的过去因素"),
            ("现在", "当前的状况和挑战"),
            ("未来", "可能的发展和结果"),
        ],
        usage: "适用于了解事件发展、关系进展、项目规划等需要时间维度的问题。",
        tips: "关注三张牌之间的联系，它们共同讲述了一个完整的故事。",
    },
    GuideData {
        id: "celtic_cross",
        name: "凯尔特十字",
        card_count: 10,
        difficulty: "高级",
        layout: "复杂十字布局",
        description: "最全面的占卜牌阵，提供深度洞察和全方位分析。",
        positions: &[
            ("当前状况", "问题的核心和当前状态"),
            ("挑战/机遇", "需要面对的挑战或可能的机遇"),
            ("遥远过去", "深层的根源和基础"),
            ("近期过去", "最近发生的相关事件"),
            ("可能未来", "如果保持现状的发展方向"),
            ("近期未来", "接下来会发生的事"),
            ("你的方法", "你处理问题的方式"),
            ("外部影响", "环境和他人的影响"),
            ("内心感受", "你的真实想法和感受"),
            ("最终结果", "问题的最终走向和结果"),
        ],
        usage: "适用于复杂的人生问题、重大决策、深度自我分析等需要全面了解的情况。",
        tips: "需要较长的解读时间，建议在安静的环境中进行，仔细分析每个位置的含义。",
    },
];

fn builtin_guides() -> Vec<SpreadGuideEntry> {
    GUIDES
        .iter()
        .map(|guide| SpreadGuideEntry {
            info: SpreadInfo {
                id: SpreadId::from(guide.id),
                name: guide.name.to_string(),
                description: guide.description.to_string(),
                card_count: guide.card_count,
                difficulty: guide.difficulty.to_string(),
                usage: guide.usage.to_string(),
            },
            layout: guide.layout.to_string(),
            positions: guide
                .positions
                .iter()
                .zip(1..)
                .map(|((name, description), index)| SpreadPosition {
                    index,
                    name: name.to_string(),
                    description: description.to_string(),
                    significance: String::new(),
                })
                .collect(),
            tips: guide.tips.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SpreadGuide {
    entries: Vec<SpreadGuideEntry>,
    source: DataSource,
}

impl SpreadGuide {
    /// Backend spreads, each paired with a built-in position guide when one
    /// exists. Falls back to the built-in guides on failure or an empty list.
    pub async fn load(api: &dyn TarotApi) -> Self {
        match api.list_spreads().await {
            Ok(spreads) if !spreads.is_empty() => {
                let builtin = builtin_guides();
                let entries = spreads
                    .into_iter()
                    .map(|info| {
                        let known = builtin.iter().find(|entry| entry.info.id == info.id);
                        SpreadGuideEntry {
                            layout: known.map(|entry| entry.layout.clone()).unwrap_or_default(),
                            positions: known.map(|entry| entry.positions.clone()).unwrap_or_default(),
                            tips: known.map(|entry| entry.tips.clone()).unwrap_or_default(),
                            info,
                        }
                    })
                    .collect::<Vec<_>>();
                info!(count = entries.len(), "guide: spreads loaded");
                Self {
                    entries,
                    source: DataSource::Backend,
                }
            }
            Ok(_) => {
                warn!("guide: backend returned no spreads; using built-in guides");
                Self::builtin()
            }
            Err(err) => {
                warn!(error = %err, "guide: load failed; using built-in guides");
                Self::builtin()
            }
        }
    }

    pub fn builtin() -> Self {
        Self {
            entries: builtin_guides(),
            source: DataSource::BuiltIn,
        }
    }

    pub fn entries(&self) -> &[SpreadGuideEntry] {
        &self.entries
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn get(&self, id: &SpreadId) -> Option<&SpreadGuideEntry> {
        self.entries.iter().find(|entry| &entry.info.id == id)
    }

    /// Full guide for one spread with the backend's own positions. A spread
    /// the backend does not know yields `None`; any other failure falls back
    /// to the loaded entry.
    pub async fn detail(&self, api: &dyn TarotApi, id: &SpreadId) -> Option<SpreadGuideEntry> {
        let builtin = builtin_guides();
        let known = builtin.iter().find(|entry| &entry.info.id == id);
        match api.get_spread_detail(id).await {
            Ok(detail) => Some(SpreadGuideEntry::from_detail(detail, known)),
            Err(ClientError::NotFound(_)) => {
                info!(spread = %id, "guide: spread not found");
                None
            }
            Err(err) => {
                warn!(spread = %id, error = %err, "guide: detail load failed; using cached entry");
                self.get(id).cloned()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/guide_tests.rs"]
mod tests;
