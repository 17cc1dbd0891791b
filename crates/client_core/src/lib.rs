use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{
        CardList, HealthStatus, HistoryPage, ReadingResult, SpreadDetail, SpreadId, SpreadInfo,
        SpreadRecommendation, Statistics,
    },
    protocol::{
        CardsQuery, CardsResponse, CreateReadingRequest, HealthResponse, HistoryQuery,
        HistoryResponse, RecommendSpreadRequest, RecommendSpreadResponse, SpreadDetailResponse,
        SpreadsResponse, StatisticsResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

pub mod config;
pub mod draw;
pub mod error;
pub mod fallback;
pub mod session;

pub use config::{load_settings_from, ClientSettings};
pub use error::{ClientError, ErrorKind};
pub use session::{
    ReadingSession, ReadingStep, SessionController, SessionError, SessionEvent, SessionOptions,
    SessionSnapshot, SpreadSource,
};

/// Outbound surface of the tarot backend. Each call issues exactly one
/// request and never retries; dropping the future abandons the call.
#[async_trait]
pub trait TarotApi: Send + Sync {
    async fn check_health(&self) -> Result<HealthStatus, ClientError>;
    async fn create_reading(
        &self,
        question: &str,
        spread_id: &SpreadId,
        persist: bool,
    ) -> Result<ReadingResult, ClientError>;
    async fn list_spreads(&self) -> Result<Vec<SpreadInfo>, ClientError>;
    async fn get_spread_detail(&self, spread_id: &SpreadId) -> Result<SpreadDetail, ClientError>;
    async fn search_cards(&self, term: Option<&str>) -> Result<CardList, ClientError>;
    async fn get_history(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<HistoryPage, ClientError>;
    async fn get_statistics(&self) -> Result<Statistics, ClientError>;
    async fn recommend_spread(&self, question: &str) -> Result<SpreadRecommendation, ClientError>;
}

/// Stand-in used where no backend is configured; every call fails with a
/// network error so callers take their fallback paths.
pub struct OfflineTarotApi;

#[async_trait]
impl TarotApi for OfflineTarotApi {
    async fn check_health(&self) -> Result<HealthStatus, ClientError> {
        Err(offline("/health"))
    }

    async fn create_reading(
        &self,
        _question: &str,
        _spread_id: &SpreadId,
        _persist: bool,
    ) -> Result<ReadingResult, ClientError> {
        Err(offline("/reading"))
    }

    async fn list_spreads(&self) -> Result<Vec<SpreadInfo>, ClientError> {
        Err(offline("/spreads"))
    }

    async fn get_spread_detail(&self, spread_id: &SpreadId) -> Result<SpreadDetail, ClientError> {
        Err(offline(&format!("/spreads/{spread_id}")))
    }

    async fn search_cards(&self, _term: Option<&str>) -> Result<CardList, ClientError> {
        Err(offline("/cards"))
    }

    async fn get_history(
        &self,
        _limit: Option<usize>,
        _offset: Option<usize>,
    ) -> Result<HistoryPage, ClientError> {
        Err(offline("/history"))
    }

    async fn get_statistics(&self) -> Result<Statistics, ClientError> {
        Err(offline("/statistics"))
    }

    async fn recommend_spread(&self, _question: &str) -> Result<SpreadRecommendation, ClientError> {
        Err(offline("/recommend-spread"))
    }
}

fn offline(endpoint: &str) -> ClientError {
    ClientError::Network {
        endpoint: endpoint.to_string(),
        message: "backend is offline".to_string(),
    }
}

pub struct HttpTarotApi {
    http: Client,
    base_url: String,
}

impl HttpTarotApi {
    /// `base_url` must already be absolute, e.g. `http://localhost:8011/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let base_url = settings.resolved_base_url()?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|err| ClientError::Network {
                endpoint: base_url.clone(),
                message: format!("failed to build http client: {err}"),
            })?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        debug!(endpoint, "api: sending request");
        let response = request.send().await.map_err(|err| {
            warn!(endpoint, error = %err, "api: request failed");
            ClientError::network(endpoint, err)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "api: non-success status");
            return Err(ClientError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| ClientError::network(endpoint, err))?;
        serde_json::from_str(&body).map_err(|err| {
            warn!(endpoint, error = %err, "api: malformed response body");
            ClientError::protocol(endpoint, err.to_string())
        })
    }
}

fn require<T>(value: Option<T>, endpoint: &str, field: &str) -> Result<T, ClientError> {
    value.ok_or_else(|| ClientError::protocol(endpoint, format!("missing `{field}` field")))
}

fn reject_failure(api: shared::error::ApiStatus) -> Result<(), ClientError> {
    match api.into_failure() {
        Some(failure) => Err(ClientError::Application(failure.message)),
        None => Ok(()),
    }
}

#[async_trait]
impl TarotApi for HttpTarotApi {
    async fn check_health(&self) -> Result<HealthStatus, ClientError> {
        let endpoint = "/health";
        let response: HealthResponse = self
            .execute(endpoint, self.http.get(self.url(endpoint)))
            .await?;
        let healthy = response
            .api
            .success
            .unwrap_or_else(|| response.status.as_deref() == Some("healthy"));
        reject_failure(response.api)?;
        Ok(HealthStatus {
            healthy,
            message: response.message,
        })
    }

    async fn create_reading(
        &self,
        question: &str,
        spread_id: &SpreadId,
        persist: bool,
    ) -> Result<ReadingResult, ClientError> {
        if question.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "question must not be blank".to_string(),
            ));
        }

        let endpoint = "/reading";
        let request = CreateReadingRequest {
            question: question.to_string(),
            spread_type: Some(spread_id.clone()),
            save_result: persist,
        };
        let result: ReadingResult = self
            .execute(endpoint, self.http.post(self.url(endpoint)).json(&request))
            .await?;

        if !result.success {
            return Err(ClientError::Application(result.error.unwrap_or_else(|| {
                "reading failed without an error message".to_string()
            })));
        }
        Ok(result)
    }

    async fn list_spreads(&self) -> Result<Vec<SpreadInfo>, ClientError> {
        let endpoint = "/spreads";
        let response: SpreadsResponse = self
            .execute(endpoint, self.http.get(self.url(endpoint)))
            .await?;
        reject_failure(response.api)?;
        require(response.spreads, endpoint, "spreads")
    }

    async fn get_spread_detail(&self, spread_id: &SpreadId) -> Result<SpreadDetail, ClientError> {
        let mut url = Url::parse(&self.url("/spreads"))
            .map_err(|err| ClientError::InvalidInput(format!("invalid api base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidInput("api base url cannot carry a path".into()))?
            .push(spread_id.as_str());
        let endpoint = format!("/spreads/{spread_id}");

        let response: SpreadDetailResponse =
            match self.execute(&endpoint, self.http.get(url)).await {
                Ok(response) => response,
                Err(ClientError::HttpStatus { status, .. })
                    if status == StatusCode::NOT_FOUND.as_u16() =>
                {
                    return Err(ClientError::NotFound(spread_id.clone()));
                }
                Err(err) => return Err(err),
            };
        reject_failure(response.api)?;
        Ok(require(response.spread, &endpoint, "spread")?.into_detail(spread_id.clone()))
    }

    async fn search_cards(&self, term: Option<&str>) -> Result<CardList, ClientError> {
        let endpoint = "/cards";
        let query = CardsQuery {
            search: term
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string),
        };
        let response: CardsResponse = self
            .execute(endpoint, self.http.get(self.url(endpoint)).query(&query))
            .await?;
        reject_failure(response.api)?;
        let cards = require(response.cards, endpoint, "cards")?;
        let total = response.total.unwrap_or(cards.len());
        Ok(CardList { cards, total })
    }

    async fn get_history(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<HistoryPage, ClientError> {
        let endpoint = "/history";
        let query = HistoryQuery { limit, offset };
        let response: HistoryResponse = self
            .execute(endpoint, self.http.get(self.url(endpoint)).query(&query))
            .await?;
        reject_failure(response.api)?;
        let readings = require(response.readings, endpoint, "readings")?;
        Ok(HistoryPage {
            total: response.total.unwrap_or(readings.len()),
            limit: response.limit.or(limit).unwrap_or(readings.len()),
            offset: response.offset.or(offset).unwrap_or(0),
            readings,
        })
    }

    async fn get_statistics(&self) -> Result<Statistics, ClientError> {
        let endpoint = "/statistics";
        let response: StatisticsResponse = self
            .execute(endpoint, self.http.get(self.url(endpoint)))
            .await?;
        reject_failure(response.api)?;
        require(response.statistics, endpoint, "statistics")
    }

    async fn recommend_spread(&self, question: &str) -> Result<SpreadRecommendation, ClientError> {
        if question.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "question must not be blank".to_string(),
            ));
        }

        let endpoint = "/recommend-spread";
        let request = RecommendSpreadRequest {
            question: question.to_string(),
        };
        let response: RecommendSpreadResponse = self
            .execute(endpoint, self.http.post(self.url(endpoint)).json(&request))
            .await?;
        reject_failure(response.api)?;
        let spread_id = require(response.recommended_spread, endpoint, "recommended_spread")?;
        Ok(SpreadRecommendation {
            spread: response
                .spread_info
                .map(|config| config.into_detail(spread_id.clone())),
            spread_id,
            reason: response.reason,
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
