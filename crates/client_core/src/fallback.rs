//! Built-in data used when the backend cannot be reached.

use chrono::Utc;
use shared::domain::{Card, ReadingResult, SpreadId, SpreadInfo, SpreadRecommendation};

pub const FALLBACK_CATEGORY: &str = "general";
pub const FALLBACK_SPREAD_NAME: &str = "占卜";
pub const FALLBACK_COMBINED_READING: &str =
    "🔮 由于AI占卜师暂时无法连接，为您提供了基础的塔罗指引。请静心感受这些牌带给您的直觉启发。";
pub const FALLBACK_SUMMARY: &str = "相信直觉，静心感受牌的指引。";

/// Every spread the backend knows about: id, display name, card count.
const KNOWN_SPREADS: &[(&str, &str, u32)] = &[
    ("single", "单张牌占卜", 1),
    ("three_card", "三张牌占卜", 3),
    ("love_spread", "恋爱牌阵", 5),
    ("career_spread", "事业牌阵", 6),
    ("decision_spread", "决策牌阵", 7),
    ("celtic_cross", "凯尔特十字", 10),
];

const LOVE_KEYWORDS: &[&str] = &["爱情", "感情", "恋爱", "婚姻", "伴侣"];
const CAREER_KEYWORDS: &[&str] = &["工作", "事业", "职业", "职场", "升职"];
const DECISION_KEYWORDS: &[&str] = &["选择", "决定", "应该", "还是"];

pub fn spread_display_name(spread_id: &str) -> Option<&'static str> {
    KNOWN_SPREADS
        .iter()
        .find(|(id, _, _)| *id == spread_id)
        .map(|(_, name, _)| *name)
}

pub fn spread_card_count(spread_id: &str) -> Option<u32> {
    KNOWN_SPREADS
        .iter()
        .find(|(id, _, _)| *id == spread_id)
        .map(|(_, _, count)| *count)
}

pub fn builtin_spreads() -> Vec<SpreadInfo> {
    vec![
        SpreadInfo {
            id: SpreadId::from("single"),
            name: "单张牌占卜".into(),
            description: "简单快速的日常指引".into(),
            card_count: 1,
            difficulty: "简单".into(),
            usage: "日常问题".into(),
        },
        SpreadInfo {
            id: SpreadId::from("three_card"),
            name: "三张牌占卜".into(),
            description: "过去现在未来的时间线分析".into(),
            card_count: 3,
            difficulty: "中等".into(),
            usage: "发展趋势".into(),
        },
        SpreadInfo {
            id: SpreadId::from("celtic_cross"),
            name: "凯尔特十字".into(),
            description: "复杂问题的全面解析".into(),
            card_count: 10,
            difficulty: "高级".into(),
            usage: "深度分析".into(),
        },
    ]
}

/// Result shown when the reading request fails. It reports `success: true`
/// so the wizard always ends on a result page.
pub fn fallback_result(question: &str, spread: &SpreadInfo, cards: &[Card]) -> ReadingResult {
    let spread_name = if spread.name.trim().is_empty() {
        FALLBACK_SPREAD_NAME.to_string()
    } else {
        spread.name.clone()
    };

    ReadingResult {
        success: true,
        question: question.to_string(),
        question_category: FALLBACK_CATEGORY.to_string(),
        spread_type: spread.id.clone(),
        spread_name,
        drawn_cards: cards.to_vec(),
        individual_readings: Vec::new(),
        combined_reading: FALLBACK_COMBINED_READING.to_string(),
        reading_summary: FALLBACK_SUMMARY.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        error: None,
        fallback_mode: true,
    }
}

/// Keyword and length heuristic matching the backend's own recommender.
pub fn recommend_locally(question: &str) -> SpreadRecommendation {
    let lower = question.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|keyword| lower.contains(keyword));
    let length = question.chars().count();

    let spread_id = if mentions(LOVE_KEYWORDS) {
        "love_spread"
    } else if mentions(CAREER_KEYWORDS) {
        "career_spread"
    } else if mentions(DECISION_KEYWORDS) {
        "decision_spread"
    } else if length > 30 {
        "celtic_cross"
    } else if length < 10 {
        "single"
    } else {
        "three_card"
    };

    let name = spread_display_name(spread_id).unwrap_or(FALLBACK_SPREAD_NAME);
    SpreadRecommendation {
        spread_id: SpreadId::from(spread_id),
        spread: None,
        reason: format!("根据您的问题类型和复杂度，推荐使用{name}"),
    }
}
