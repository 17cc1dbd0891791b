use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode as AxumStatus,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::Orientation;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct BackendState {
    bodies: Arc<Mutex<Vec<Value>>>,
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn spawn_backend(app: Router) -> std::io::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/api"))
}

async fn handle_reading(State(state): State<BackendState>, Json(body): Json<Value>) -> Json<Value> {
    state.bodies.lock().await.push(body.clone());
    Json(json!({
        "success": true,
        "question": body["question"],
        "question_category": "career",
        "spread_type": body["spread_type"],
        "spread_name": "三张牌占卜",
        "drawn_cards": [
            {"name": "星星", "reversed": false, "position": 1, "orientation": "upright"},
            {"name": "塔", "reversed": true, "position": 2, "orientation": "reversed"},
            {"name": "太阳", "reversed": false, "position": 3, "orientation": "upright"}
        ],
        "individual_readings": [{"card": "星星", "interpretation": "希望"}],
        "combined_reading": "事业稳步上升",
        "reading_summary": "把握时机",
        "timestamp": "2024-08-13T10:30:00.123456"
    }))
}

async fn handle_cards(
    State(state): State<BackendState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.queries.lock().await.push(query.clone());
    let cards = match query.get("search").map(String::as_str) {
        Some("星") => vec!["星星", "星币王牌"],
        _ => vec!["愚者", "魔术师", "女祭司"],
    };
    Json(json!({"success": true, "cards": cards, "total": cards.len()}))
}

async fn handle_history(
    State(state): State<BackendState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.queries.lock().await.push(query.clone());
    let limit = query
        .get("limit")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(10);
    let offset = query
        .get("offset")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    Json(json!({
        "success": true,
        "readings": [{
            "id": "reading_20240813_103000",
            "timestamp": "2024-08-13T10:30:00",
            "user_question": "我的事业发展如何？",
            "question_category": "career",
            "spread_type": "three_card",
            "reading_summary": "事业运势上升",
            "drawn_cards": []
        }],
        "total": 21,
        "limit": limit,
        "offset": offset
    }))
}

async fn handle_spread_detail(Path(id): Path<String>) -> (AxumStatus, Json<Value>) {
    if id != "three_card" {
        return (
            AxumStatus::NOT_FOUND,
            Json(json!({"success": false, "error": format!("未知牌阵: {id}")})),
        );
    }
    (
        AxumStatus::OK,
        Json(json!({
            "success": true,
            "spread": {
                "name": "三张牌占卜",
                "description": "过去-现在-未来",
                "card_count": 3,
                "positions": {
                    "3": {"name": "未来", "description": "可能的结果", "significance": "趋势"},
                    "1": {"name": "过去", "description": "根源", "significance": "历史因素"},
                    "2": {"name": "现在", "description": "当前状况", "significance": "现实"}
                },
                "usage": "中期规划",
                "difficulty": "初级"
            }
        })),
    )
}

fn backend_router(state: BackendState) -> Router {
    Router::new()
        .route(
            "/api/health",
            get(|| async { Json(json!({"status": "healthy", "message": "ok"})) }),
        )
        .route("/api/reading", post(handle_reading))
        .route(
            "/api/spreads",
            get(|| async {
                Json(json!({
                    "success": true,
                    "spreads": [
                        {"id": "single", "name": "单张牌占卜", "description": "d", "card_count": 1, "difficulty": "初级", "usage": "u"},
                        {"id": "three_card", "name": "三张牌占卜", "description": "d", "card_count": 3, "difficulty": "初级", "usage": "u"},
                        {"id": "celtic_cross", "name": "凯尔特十字牌阵", "description": "d", "card_count": 10, "difficulty": "高级", "usage": "u"}
                    ]
                }))
            }),
        )
        .route("/api/spreads/:id", get(handle_spread_detail))
        .route("/api/cards", get(handle_cards))
        .route("/api/history", get(handle_history))
        .route(
            "/api/statistics",
            get(|| async {
                Json(json!({
                    "success": true,
                    "statistics": {
                        "total_readings": 0,
                        "question_types": {},
                        "spread_types": {},
                        "most_recent": null,
                        "oldest": null
                    }
                }))
            }),
        )
        .route(
            "/api/recommend-spread",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "success": true,
                    "recommended_spread": "career_spread",
                    "spread_info": {
                        "name": "事业牌阵",
                        "description": "事业问题",
                        "card_count": 6,
                        "usage": "职业规划",
                        "difficulty": "中级"
                    },
                    "reason": format!("question={}", body["question"].as_str().unwrap_or_default())
                }))
            }),
        )
        .with_state(state)
}

async fn spawn_default_backend() -> (HttpTarotApi, BackendState) {
    let state = BackendState::default();
    let base_url = spawn_backend(backend_router(state.clone()))
        .await
        .expect("spawn backend");
    (HttpTarotApi::new(base_url), state)
}

async fn spawn_failing_backend(status: AxumStatus, body: &'static str) -> HttpTarotApi {
    let app = Router::new()
        .route("/api/reading", post(move || async move { (status, body) }))
        .route("/api/spreads", get(move || async move { (status, body) }));
    HttpTarotApi::new(spawn_backend(app).await.expect("spawn backend"))
}

#[tokio::test]
async fn health_reads_status_field_when_success_is_absent() {
    let (api, _) = spawn_default_backend().await;
    let health = api.check_health().await.expect("health");
    assert!(health.healthy);
    assert_eq!(health.message.as_deref(), Some("ok"));
}

#[tokio::test]
async fn create_reading_sends_question_spread_and_persist_flag() {
    let (api, state) = spawn_default_backend().await;

    let result = api
        .create_reading("我该如何提升我的事业运势？", &SpreadId::from("three_card"), true)
        .await
        .expect("reading");

    assert!(result.success);
    assert_eq!(result.spread_type, SpreadId::from("three_card"));
    assert_eq!(result.drawn_cards.len(), 3);
    assert_eq!(result.drawn_cards[1].orientation, Orientation::Reversed);
    assert_eq!(result.individual_readings.len(), 1);
    assert!(!result.fallback_mode);

    let bodies = state.bodies.lock().await;
    assert_eq!(
        bodies.as_slice(),
        &[json!({
            "question": "我该如何提升我的事业运势？",
            "spread_type": "three_card",
            "save_result": true
        })]
    );
}

#[tokio::test]
async fn blank_question_is_rejected_before_sending() {
    let (api, state) = spawn_default_backend().await;
    let err = api
        .create_reading("   ", &SpreadId::from("single"), false)
        .await
        .expect_err("blank question");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(state.bodies.lock().await.is_empty());
}

#[tokio::test]
async fn success_false_body_is_an_application_error() {
    let api = spawn_failing_backend(
        AxumStatus::OK,
        r#"{"success": false, "error": "占卜过程中发生错误"}"#,
    )
    .await;

    let err = api
        .create_reading("今日运势？", &SpreadId::from("single"), true)
        .await
        .expect_err("application failure");
    assert_eq!(err.kind(), ErrorKind::Application);
    assert!(err.to_string().contains("占卜过程中发生错误"));

    let err = api.list_spreads().await.expect_err("application failure");
    assert_eq!(err.kind(), ErrorKind::Application);
}

#[tokio::test]
async fn non_success_status_is_a_network_error_regardless_of_body() {
    let api = spawn_failing_backend(
        AxumStatus::INTERNAL_SERVER_ERROR,
        r#"{"success": true, "spreads": []}"#,
    )
    .await;

    let err = api.list_spreads().await.expect_err("500");
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(matches!(err, ClientError::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn unparseable_body_is_a_protocol_error() {
    let api = spawn_failing_backend(AxumStatus::OK, "<html>gateway</html>").await;
    let err = api
        .create_reading("今日运势？", &SpreadId::from("single"), true)
        .await
        .expect_err("malformed");
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn missing_payload_field_is_a_protocol_error() {
    let api = spawn_failing_backend(AxumStatus::OK, r#"{"success": true}"#).await;
    let err = api.list_spreads().await.expect_err("missing spreads");
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(err.to_string().contains("spreads"));
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = HttpTarotApi::new(format!("http://{addr}/api"));
    let err = api.check_health().await.expect_err("nothing listening");
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn list_spreads_preserves_backend_order() {
    let (api, _) = spawn_default_backend().await;
    let spreads = api.list_spreads().await.expect("spreads");
    assert_eq!(
        spreads
            .iter()
            .map(|spread| spread.id.as_str())
            .collect::<Vec<_>>(),
        vec!["single", "three_card", "celtic_cross"]
    );
    assert_eq!(spreads[2].card_count, 10);
}

#[tokio::test]
async fn spread_detail_orders_positions_and_keeps_requested_id() {
    let (api, _) = spawn_default_backend().await;
    let detail = api
        .get_spread_detail(&SpreadId::from("three_card"))
        .await
        .expect("detail");
    assert_eq!(detail.info.id, SpreadId::from("three_card"));
    assert_eq!(detail.info.card_count, 3);
    assert_eq!(
        detail
            .positions
            .iter()
            .map(|position| (position.index, position.name.as_str()))
            .collect::<Vec<_>>(),
        vec![(1, "过去"), (2, "现在"), (3, "未来")]
    );
}

#[tokio::test]
async fn unknown_spread_detail_is_not_found() {
    let (api, _) = spawn_default_backend().await;
    let err = api
        .get_spread_detail(&SpreadId::from("tree_of_life"))
        .await
        .expect_err("404");
    assert!(matches!(&err, ClientError::NotFound(id) if id.as_str() == "tree_of_life"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn search_cards_sends_term_only_when_present() {
    let (api, state) = spawn_default_backend().await;

    let all = api.search_cards(None).await.expect("all cards");
    assert_eq!(all.total, 3);
    let blank = api.search_cards(Some("  ")).await.expect("blank term");
    assert_eq!(blank.cards, all.cards);
    let matches = api.search_cards(Some("星")).await.expect("search");
    assert_eq!(matches.cards, vec!["星星".to_string(), "星币王牌".to_string()]);

    let queries = state.queries.lock().await;
    assert!(queries[0].is_empty());
    assert!(queries[1].is_empty());
    assert_eq!(queries[2].get("search").map(String::as_str), Some("星"));
}

#[tokio::test]
async fn history_forwards_pagination_parameters() {
    let (api, state) = spawn_default_backend().await;

    let page = api.get_history(Some(6), Some(12)).await.expect("history");
    assert_eq!(page.total, 21);
    assert_eq!(page.limit, 6);
    assert_eq!(page.offset, 12);
    assert_eq!(page.readings.len(), 1);
    assert_eq!(page.readings[0].user_question, "我的事业发展如何？");

    let defaults = api.get_history(None, None).await.expect("history");
    assert_eq!(defaults.limit, 10);
    assert_eq!(defaults.offset, 0);

    let queries = state.queries.lock().await;
    assert_eq!(queries[0].get("limit").map(String::as_str), Some("6"));
    assert_eq!(queries[0].get("offset").map(String::as_str), Some("12"));
    assert!(queries[1].is_empty());
}

#[tokio::test]
async fn statistics_tolerate_empty_history() {
    let (api, _) = spawn_default_backend().await;
    let statistics = api.get_statistics().await.expect("statistics");
    assert_eq!(statistics.total_readings, 0);
    assert!(statistics.most_recent.is_none());
    assert_eq!(statistics.average_per_month, 0.0);
}

#[tokio::test]
async fn recommendation_carries_spread_detail() {
    let (api, _) = spawn_default_backend().await;
    let recommendation = api
        .recommend_spread("我该如何提升我的事业运势？")
        .await
        .expect("recommend");
    assert_eq!(recommendation.spread_id, SpreadId::from("career_spread"));
    assert_eq!(recommendation.reason, "question=我该如何提升我的事业运势？");
    let spread = recommendation.spread.expect("spread info");
    assert_eq!(spread.info.id, SpreadId::from("career_spread"));
    assert_eq!(spread.info.card_count, 6);
    assert!(spread.positions.is_empty());
}

#[tokio::test]
async fn offline_api_fails_every_call_as_network_error() {
    let api = OfflineTarotApi;
    assert_eq!(
        api.list_spreads().await.expect_err("offline").kind(),
        ErrorKind::Network
    );
    assert_eq!(
        api.create_reading("q", &SpreadId::from("single"), true)
            .await
            .expect_err("offline")
            .kind(),
        ErrorKind::Network
    );
}

#[test]
fn from_settings_resolves_relative_base_path() {
    let api = HttpTarotApi::from_settings(&ClientSettings::default()).expect("client");
    assert_eq!(api.base_url(), "http://localhost:8011/api");
}

#[test]
fn trailing_slash_is_trimmed_from_base_url() {
    let api = HttpTarotApi::new("http://127.0.0.1:8011/api/");
    assert_eq!(api.base_url(), "http://127.0.0.1:8011/api");
}
