//! Reading history: load once, then filter, search, sort and page locally.

use std::{
    collections::{BTreeMap, BTreeSet},
    convert::Infallible,
    str::FromStr,
};

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};
use client_core::{fallback, TarotApi};
use shared::domain::{ReadingHistoryEntry, ReadingId, SpreadId, Statistics};
use tracing::{info, warn};

use crate::{pagination::paginate, DataSource, Page};

pub const HISTORY_PAGE_SIZE: usize = 6;
pub const RECENT_WINDOW_DAYS: i64 = 7;
/// How many records one load asks the backend for.
pub const HISTORY_FETCH_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    /// Strictly newer than seven days before `now`.
    Recent,
    /// Exact `question_category` match, e.g. `love`, `career`, `general`.
    Category(String),
}

impl FromStr for HistoryFilter {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw.trim() {
            "" | "all" => Self::All,
            "recent" => Self::Recent,
            category => Self::Category(category.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: ReadingId,
    pub question: String,
    pub category: String,
    pub spread_type: SpreadId,
    pub spread_name: String,
    pub summary: String,
    pub timestamp: String,
    pub cards_count: u32,
    /// `None` when `timestamp` does not parse; such records sort last and
    /// never count as recent.
    pub recorded_at: Option<DateTime<Utc>>,
}

impl From<ReadingHistoryEntry> for HistoryRecord {
    fn from(entry: ReadingHistoryEntry) -> Self {
        let spread_name = fallback::spread_display_name(entry.spread_type.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| entry.spread_type.to_string());
        let cards_count = fallback::spread_card_count(entry.spread_type.as_str()).unwrap_or(1);
        Self {
            recorded_at: parse_timestamp(&entry.timestamp),
            id: entry.id,
            question: entry.user_question,
            category: entry.question_category,
            spread_type: entry.spread_type,
            spread_name,
            summary: entry.reading_summary,
            timestamp: entry.timestamp,
            cards_count,
        }
    }
}

impl HistoryRecord {
    fn is_recent(&self, now: DateTime<Utc>) -> bool {
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        self.recorded_at.is_some_and(|at| at > cutoff)
    }

    fn matches(&self, needle: &str) -> bool {
        self.question.to_lowercase().contains(needle) || self.summary.to_lowercase().contains(needle)
    }
}

/// Accepts RFC 3339 and the backend's zone-less ISO format, which is read
/// as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryStats {
    pub total: usize,
    pub this_week: usize,
    pub by_category: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct HistoryView {
    records: Vec<HistoryRecord>,
    source: DataSource,
}

impl HistoryView {
    /// Loads history from the backend, or the built-in sample records when
    /// the request fails. An empty backend history stays empty.
    pub async fn load(api: &dyn TarotApi) -> Self {
        match api.get_history(Some(HISTORY_FETCH_LIMIT), None).await {
            Ok(page) => {
                info!(count = page.readings.len(), total = page.total, "history: loaded");
                Self::from_entries(page.readings, DataSource::Backend)
            }
            Err(err) => {
                warn!(error = %err, "history: load failed; showing sample records");
                Self::builtin()
            }
        }
    }

    pub fn from_entries(entries: Vec<ReadingHistoryEntry>, source: DataSource) -> Self {
        Self {
            records: entries.into_iter().map(HistoryRecord::from).collect(),
            source,
        }
    }

    pub fn builtin() -> Self {
        Self::from_entries(sample_entries(), DataSource::BuiltIn)
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn get(&self, id: &ReadingId) -> Option<&HistoryRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Applies `filter` and a case-insensitive search over question and
    /// summary, newest first. Equal timestamps keep load order.
    pub fn filtered(
        &self,
        filter: &HistoryFilter,
        search: &str,
        now: DateTime<Utc>,
    ) -> Vec<&HistoryRecord> {
        let needle = search.trim().to_lowercase();
        let mut records = self
            .records
            .iter()
            .filter(|record| match filter {
                HistoryFilter::All => true,
                HistoryFilter::Recent => record.is_recent(now),
                HistoryFilter::Category(category) => &record.category == category,
            })
            .filter(|record| needle.is_empty() || record.matches(&needle))
            .collect::<Vec<_>>();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        records
    }

    pub fn page<'a>(
        records: &'a [&'a HistoryRecord],
        page: usize,
    ) -> Page<'a, &'a HistoryRecord> {
        paginate(records, page, HISTORY_PAGE_SIZE)
    }

    /// Same aggregates the backend's `/statistics` reports, computed over the
    /// loaded records.
    pub fn statistics(&self) -> Statistics {
        let mut question_types = BTreeMap::new();
        let mut spread_types = BTreeMap::new();
        for record in &self.records {
            *question_types.entry(record.category.clone()).or_insert(0) += 1;
            *spread_types.entry(record.spread_type.to_string()).or_insert(0) += 1;
        }
        let mut dated = self
            .records
            .iter()
            .filter(|record| record.recorded_at.is_some())
            .collect::<Vec<_>>();
        dated.sort_by_key(|record| record.recorded_at);
        let months = dated
            .iter()
            .filter_map(|record| record.recorded_at)
            .map(|at| (at.year(), at.month()))
            .collect::<BTreeSet<_>>();

        Statistics {
            total_readings: self.records.len() as u64,
            question_types,
            spread_types,
            most_recent: dated.last().map(|record| record.timestamp.clone()),
            oldest: dated.first().map(|record| record.timestamp.clone()),
            average_per_month: self.records.len() as f64 / months.len().max(1) as f64,
        }
    }

    pub fn stats(&self, now: DateTime<Utc>) -> HistoryStats {
        let mut by_category = BTreeMap::new();
        for record in &self.records {
            *by_category.entry(record.category.clone()).or_insert(0) += 1;
        }
        HistoryStats {
            total: self.records.len(),
            this_week: self.records.iter().filter(|r| r.is_recent(now)).count(),
            by_category,
        }
    }
}

/// Backend statistics, or the same figures computed over the built-in
/// sample records when the request fails.
pub async fn load_statistics(api: &dyn TarotApi) -> (Statistics, DataSource) {
    match api.get_statistics().await {
        Ok(statistics) => (statistics, DataSource::Backend),
        Err(err) => {
            warn!(error = %err, "history: statistics unavailable; using sample records");
            (HistoryView::builtin().statistics(), DataSource::BuiltIn)
        }
    }
}

fn sample_entries() -> Vec<ReadingHistoryEntry> {
    [
        ("1", "我的事业发展如何？", "career", "three_card", "事业运势上升，需要把握时机", "2024-08-13T10:30:00Z"),
        ("2", "这段感情的未来走向？", "love", "celtic_cross", "感情稳定发展，需要更多沟通", "2024-08-12T15:45:00Z"),
        ("3", "今日运势如何？", "general", "single", "保持积极心态，好运将至", "2024-08-11T08:20:00Z"),
        ("4", "应该换工作吗？", "career", "three_card", "时机尚未成熟，继续积累经验", "2024-08-10T14:15:00Z"),
        ("5", "健康状况需要注意什么？", "general", "single", "注意休息，保持身心平衡", "2024-08-09T11:30:00Z"),
    ]
    .into_iter()
    .map(|(id, question, category, spread, summary, timestamp)| ReadingHistoryEntry {
        id: ReadingId::from(id),
        timestamp: timestamp.to_string(),
        user_question: question.to_string(),
        question_category: category.to_string(),
        spread_type: SpreadId::from(spread),
        reading_summary: summary.to_string(),
    })
    .collect()
}

#[cfg(test)]
#[path = "tests/history_tests.rs"]
mod tests;
