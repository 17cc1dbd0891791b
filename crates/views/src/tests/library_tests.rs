use super::*;

use client_core::OfflineTarotApi;

use crate::fake_api::FakeApi;

fn names<'a>(listing: &LibraryListing<'a>) -> Vec<&'a str> {
    listing.cards.iter().map(|&card| card.name.as_str()).collect()
}

#[tokio::test]
async fn failed_load_uses_builtin_major_arcana() {
    let library = CardLibrary::load(&OfflineTarotApi).await;
    assert_eq!(library.source(), DataSource::BuiltIn);
    assert_eq!(library.cards().len(), 6);
    assert_eq!(library.card("fool").map(|card| card.number), Some(Some(0)));
}

#[tokio::test]
async fn empty_backend_list_uses_builtin_set() {
    let api = FakeApi {
        cards: Some(Vec::new()),
        ..FakeApi::default()
    };
    assert_eq!(CardLibrary::load(&api).await.source(), DataSource::BuiltIn);
}

#[tokio::test]
async fn backend_cards_are_enriched_and_classified() {
    let api = FakeApi {
        cards: Some(vec!["愚者".into(), "权杖王牌".into(), "月亮".into(), "圣杯三".into()]),
        ..FakeApi::default()
    };
    let library = CardLibrary::load(&api).await;
    assert_eq!(library.source(), DataSource::Backend);

    let fool = &library.cards()[0];
    assert_eq!(fool.id, "fool");
    assert_eq!(fool.keywords, ["新开始", "冒险", "纯真"]);

    let major = library.filter(CardCategory::MajorArcana, "");
    assert_eq!(names(&major), ["愚者", "月亮"]);
    assert!(major.suits.is_empty());

    let minor = library.filter(CardCategory::MinorArcana, "");
    assert_eq!(names(&minor), ["权杖王牌", "圣杯三"]);
    assert_eq!(minor.suits.len(), 4);
}

#[test]
fn search_covers_names_and_keywords() {
    let library = CardLibrary::builtin();
    assert_eq!(names(&library.filter(CardCategory::All, "皇")), ["皇后", "皇帝", "教皇"]);
    assert_eq!(names(&library.filter(CardCategory::All, " 直觉 ")), ["女祭司"]);
    assert!(library.filter(CardCategory::All, "不存在").cards.is_empty());
}

#[test]
fn all_category_lists_cards_and_suits() {
    let library = CardLibrary::builtin();
    let listing = library.filter(CardCategory::All, "");
    assert_eq!(listing.cards.len(), 6);
    assert_eq!(listing.suits.len(), 4);
    assert_eq!(listing.suits[0].suit, "cups");
}

#[test]
fn category_parses_with_all_as_default() {
    assert_eq!("major_arcana".parse::<CardCategory>(), Ok(CardCategory::MajorArcana));
    assert_eq!("minor".parse::<CardCategory>(), Ok(CardCategory::MinorArcana));
    assert_eq!("whatever".parse::<CardCategory>(), Ok(CardCategory::All));
}
