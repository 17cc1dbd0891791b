//! Plain-text output for the reference commands and the wizard.

use shared::domain::Statistics;
use views::{
    guide::SpreadGuideEntry,
    history::{HistoryRecord, HistoryStats},
    library::LibraryListing,
    steps::{CardFace, ResultView},
    DataSource, Page,
};

pub fn print_cards(cards: &[CardFace]) {
    for card in cards {
        println!("  {}. {} ({})", card.position, card.name, card.orientation_label());
    }
}

pub fn print_result(result: &ResultView) {
    println!();
    println!("问题: {}", result.question);
    println!("牌阵: {}  类别: {}", result.spread_name, result.category);
    print_cards(&result.cards);
    for interpretation in &result.interpretations {
        let orientation = if interpretation.reversed { "逆位" } else { "正位" };
        println!();
        println!(
            "【{}】{} ({orientation})",
            interpretation.position_name, interpretation.card_name
        );
        println!("  {}", interpretation.reading);
    }
    println!();
    println!("{}", result.combined_reading);
    if !result.summary.is_empty() {
        println!();
        println!("总结: {}", result.summary);
    }
    if let Some(notice) = &result.notice {
        println!();
        println!("(离线解读: {notice})");
    }
}

pub fn print_guide_entry(entry: &SpreadGuideEntry) {
    let info = &entry.info;
    println!(
        "{} [{}] {} 张牌 · {}",
        info.name, info.id, info.card_count, info.difficulty
    );
    if !info.description.is_empty() {
        println!("  {}", info.description);
    }
    if !entry.layout.is_empty() {
        println!("  布局: {}", entry.layout);
    }
    for position in &entry.positions {
        println!("  {}. {}: {}", position.index, position.name, position.description);
    }
    if !info.usage.is_empty() {
        println!("  适用: {}", info.usage);
    }
    if !entry.tips.is_empty() {
        println!("  提示: {}", entry.tips);
    }
    println!();
}

pub fn print_library(listing: &LibraryListing<'_>) {
    for card in &listing.cards {
        let number = card.number.map(|n| format!("{n} ")).unwrap_or_default();
        println!("{number}{} {}", card.name, card.keywords.join(", "));
        if !card.description.is_empty() {
            println!("  {}", card.description);
        }
    }
    if !listing.suits.is_empty() {
        println!();
        for suit in &listing.suits {
            println!("{} ({}): {}", suit.name, suit.suit, suit.description);
        }
    }
}

pub fn print_history(stats: &HistoryStats, page: &Page<'_, &HistoryRecord>) {
    let categories = stats
        .by_category
        .iter()
        .map(|(category, count)| format!("{category}={count}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!("共 {} 次 · 本周 {} 次 · {categories}", stats.total, stats.this_week);
    println!();

    if page.items.is_empty() {
        println!("没有匹配的记录");
    }
    for record in page.items {
        println!(
            "[{}] {} · {} ({} 张) · {}",
            record.id, record.timestamp, record.spread_name, record.cards_count, record.category
        );
        println!("  {}", record.question);
        println!("  {}", record.summary);
    }
    if page.total_pages > 1 {
        println!();
        println!("第 {}/{} 页", page.number, page.total_pages);
    }
}

pub fn print_statistics(statistics: &Statistics, source: DataSource) {
    if source == DataSource::BuiltIn {
        println!("(backend unavailable; sample data)");
    }
    println!("total_readings: {}", statistics.total_readings);
    println!("average_per_month: {:.1}", statistics.average_per_month);
    if let Some(most_recent) = &statistics.most_recent {
        println!("most_recent: {most_recent}");
    }
    if let Some(oldest) = &statistics.oldest {
        println!("oldest: {oldest}");
    }
    for (category, count) in &statistics.question_types {
        println!("question_type {category}: {count}");
    }
    for (spread, count) in &statistics.spread_types {
        println!("spread_type {spread}: {count}");
    }
}
