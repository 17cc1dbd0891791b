//! View models for the reading wizard.
//!
//! A front end renders [`StepView::render`] for every snapshot it receives and
//! turns user input into [`Intent`]s for [`dispatch`]. Nothing here holds
//! session state of its own.

use std::{sync::Arc, time::Duration};

use client_core::{ReadingStep, SessionController, SessionError, SessionSnapshot};
use serde_json::Value;
use shared::domain::{Card, Orientation, SpreadId, SpreadInfo};
use tracing::debug;

pub const MYSTICAL_LINE_INTERVAL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SubmitQuestion(String),
    SelectSpread(SpreadId),
    StartDraw,
    Reset,
}

/// Applies one user intent to the controller. The outcome of a draw is
/// observed through the controller's snapshots, not returned here.
pub async fn dispatch(
    controller: &Arc<SessionController>,
    intent: Intent,
) -> Result<(), SessionError> {
    debug!(intent = ?intent, "views: dispatching intent");
    match intent {
        Intent::SubmitQuestion(text) => controller.submit_question(&text).await,
        Intent::SelectSpread(spread_id) => controller.select_spread(&spread_id).await,
        Intent::StartDraw => controller.start_draw().await.map(|_| ()),
        Intent::Reset => {
            controller.reset().await;
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn of(step: ReadingStep) -> Self {
        Self {
            current: step.progress(),
            total: ReadingStep::PROGRESS_SEGMENTS,
        }
    }

    pub fn is_reached(&self, segment: usize) -> bool {
        segment <= self.current
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFace {
    pub position: u32,
    pub name: String,
    pub orientation: Orientation,
}

impl CardFace {
    pub fn orientation_label(&self) -> &'static str {
        match self.orientation {
            Orientation::Upright => "正位",
            Orientation::Reversed => "逆位",
        }
    }
}

/// `reversed` is the authority: backend cards may omit `orientation`, which
/// then deserializes as upright.
impl From<&Card> for CardFace {
    fn from(card: &Card) -> Self {
        Self {
            position: card.position,
            name: card.name.clone(),
            orientation: Orientation::from_reversed(card.reversed),
        }
    }
}

/// Per-card interpretation pulled out of the backend's loosely shaped
/// `individual_readings` entries. Missing fields come through empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInterpretation {
    pub card_name: String,
    pub position_name: String,
    pub reversed: bool,
    pub reading: String,
}

impl CardInterpretation {
    fn from_value(value: &Value) -> Option<Self> {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let reading = text("reading");
        if reading.is_empty() {
            return None;
        }
        Some(Self {
            card_name: text("card_name"),
            position_name: text("position_name"),
            reversed: value
                .get("reversed")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            reading,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub question: String,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadSelectionView {
    pub question: String,
    pub options: Vec<SpreadInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDrawView {
    pub question: String,
    pub spread: Option<SpreadInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingView {
    pub spread_name: String,
    pub cards: Vec<CardFace>,
    pub loading: bool,
    pub ticker: MysticalTicker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub question: String,
    pub category: String,
    pub spread_name: String,
    pub cards: Vec<CardFace>,
    pub interpretations: Vec<CardInterpretation>,
    pub combined_reading: String,
    pub summary: String,
    pub timestamp: String,
    pub fallback: bool,
    /// Advisory message when the backend failed; the result is still shown.
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepView {
    Question(QuestionView),
    SpreadSelection(SpreadSelectionView),
    CardDraw(CardDrawView),
    Drawing(DrawingView),
    Result(ResultView),
}

impl StepView {
    pub fn render(snapshot: &SessionSnapshot) -> Self {
        let session = &snapshot.session;
        match session.step {
            ReadingStep::Question => Self::Question(QuestionView {
                question: session.question.clone(),
                notice: session.error.clone(),
            }),
            ReadingStep::Spread => Self::SpreadSelection(SpreadSelectionView {
                question: session.question.clone(),
                options: snapshot.spreads.clone(),
            }),
            ReadingStep::Cards => Self::CardDraw(CardDrawView {
                question: session.question.clone(),
                spread: snapshot.selected_spread().cloned(),
            }),
            ReadingStep::Drawing => {
                let spread_id = session
                    .spread_id
                    .as_ref()
                    .map(SpreadId::as_str)
                    .unwrap_or_default();
                Self::Drawing(DrawingView {
                    spread_name: snapshot
                        .selected_spread()
                        .map(|spread| spread.name.clone())
                        .unwrap_or_default(),
                    cards: session.drawn_cards.iter().map(CardFace::from).collect(),
                    loading: snapshot.loading,
                    ticker: MysticalTicker::for_spread(spread_id),
                })
            }
            ReadingStep::Result => Self::Result(render_result(snapshot)),
        }
    }

    pub fn step(&self) -> ReadingStep {
        match self {
            Self::Question(_) => ReadingStep::Question,
            Self::SpreadSelection(_) => ReadingStep::Spread,
            Self::CardDraw(_) => ReadingStep::Cards,
            Self::Drawing(_) => ReadingStep::Drawing,
            Self::Result(_) => ReadingStep::Result,
        }
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self.step())
    }
}

fn render_result(snapshot: &SessionSnapshot) -> ResultView {
    let session = &snapshot.session;
    let Some(result) = session.result.as_ref() else {
        return ResultView {
            question: session.question.clone(),
            category: String::new(),
            spread_name: String::new(),
            cards: session.drawn_cards.iter().map(CardFace::from).collect(),
            interpretations: Vec::new(),
            combined_reading: String::new(),
            summary: String::new(),
            timestamp: String::new(),
            fallback: false,
            notice: session.error.clone(),
        };
    };

    let cards = if result.drawn_cards.is_empty() {
        &session.drawn_cards
    } else {
        &result.drawn_cards
    };
    ResultView {
        question: result.question.clone(),
        category: result.question_category.clone(),
        spread_name: result.spread_name.clone(),
        cards: cards.iter().map(CardFace::from).collect(),
        interpretations: result
            .individual_readings
            .iter()
            .filter_map(CardInterpretation::from_value)
            .collect(),
        combined_reading: result.combined_reading.clone(),
        summary: result.reading_summary.clone(),
        timestamp: result.timestamp.clone(),
        fallback: result.fallback_mode,
        notice: session.error.clone(),
    }
}

/// Estimated duration and atmosphere lines for one spread's drawing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingTimeInfo {
    pub duration: &'static str,
    pub lines: &'static [&'static str],
}

const SINGLE_TIME_INFO: ReadingTimeInfo = ReadingTimeInfo {
    duration: "约15秒",
    lines: &[
        "🔮 单张神谕正在显现...",
        "✨ 宇宙的智慧即将为您揭晓",
        "🌟 命运之轮缓缓转动，答案即将浮现",
    ],
};

/// Unknown spreads read as `single`.
pub fn reading_time_info(spread_id: &str) -> ReadingTimeInfo {
    match spread_id {
        "three_card" => ReadingTimeInfo {
            duration: "约45秒",
            lines: &[
                "🌙 过去、现在、未来的脉络正在交织...",
                "✨ 时间之河的三重奥秘即将显现",
                "🔮 三重神谕正在汇聚时空的能量",
            ],
        },
        "love_spread" => ReadingTimeInfo {
            duration: "约1分钟",
            lines: &[
                "💕 爱神维纳斯正在为您解读情感密码...",
                "🌹 五重心灵连接正在建立神秘链接",
                "✨ 情感的星辰正在为您重新排列",
            ],
        },
        "career_spread" => ReadingTimeInfo {
            duration: "约1分钟",
            lines: &[
                "⚡ 事业之神墨丘利正在为您指引方向...",
                "🏛️ 六重智慧之门正在为您开启",
                "✨ 成功的星座正在为您重新连线",
            ],
        },
        "decision_spread" => ReadingTimeInfo {
            duration: "约1分钟",
            lines: &[
                "⚖️ 智慧女神雅典娜正在为您权衡选择...",
                "🔮 七重决策之光正在照亮前路",
                "✨ 命运的天平正在为您寻找平衡",
            ],
        },
        "celtic_cross" => ReadingTimeInfo {
            duration: "约2分钟",
            lines: &[
                "🌟 古老的凯尔特智慧正在苏醒...",
                "🔮 十重神圣几何正在构建宇宙真理",
                "✨ 最深层的奥秘即将为您完全展开",
            ],
        },
        _ => SINGLE_TIME_INFO,
    }
}

/// Rotates through a spread's mystical lines while a reading is pending.
/// Pure function of elapsed time so any render loop can drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MysticalTicker {
    info: ReadingTimeInfo,
    interval: Duration,
}

impl MysticalTicker {
    pub fn for_spread(spread_id: &str) -> Self {
        Self {
            info: reading_time_info(spread_id),
            interval: MYSTICAL_LINE_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn duration(&self) -> &'static str {
        self.info.duration
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn line_at(&self, elapsed: Duration) -> &'static str {
        let lines = self.info.lines;
        if lines.is_empty() {
            return "";
        }
        let ticks = match self.interval.as_millis() {
            0 => 0,
            interval => elapsed.as_millis() / interval,
        };
        lines[(ticks % lines.len() as u128) as usize]
    }
}

#[cfg(test)]
#[path = "tests/steps_tests.rs"]
mod tests;
