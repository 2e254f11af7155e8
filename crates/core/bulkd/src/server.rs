//! The axum routes wiring HTTP ingestion to the batch executors.
//!
//! Every bulk endpoint is a thin handler that pushes the request payload
//! into its executor and answers immediately; the matching `_sync` and
//! `_async` endpoints write a single document per request and exist as
//! baselines for load comparisons.

use crate::config::BulkdConfig;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use batcher::BatchExecutor;
use batcher::SinkError;
use bulk_sink::AggregateSink;
use bulk_sink::ChunkedBulkSink;
use bulk_sink::DirectBulkSink;
use bulk_sink::IncrementSink;
use bulk_sink::InMemoryStore;
use bulk_sink::RecordStore;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

/// JSON payload of the counter endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CounterHit {
    pub id: i64,
}

pub type LogStore = InMemoryStore<Value, i64>;

pub struct AppState {
    store: Arc<LogStore>,
    insert_bulk: BatchExecutor<Value>,
    insert_group: BatchExecutor<Value>,
    increase_bulk: BatchExecutor<CounterHit>,
    increase_reduce_bulk: BatchExecutor<CounterHit>,
}

fn hit_key(hit: &CounterHit) -> i64 {
    hit.id
}

impl AppState {
    pub fn new(config: &BulkdConfig) -> anyhow::Result<AppState> {
        let store = Arc::new(LogStore::new());

        let insert_bulk = BatchExecutor::new(
            config.insert_bulk_batching()?,
            DirectBulkSink::new(Arc::clone(&store)),
        );
        let insert_group = BatchExecutor::new(
            config.insert_group_batching()?,
            ChunkedBulkSink::new(Arc::clone(&store), config.insert_group_chunk_size)?,
        );
        let increase_bulk = BatchExecutor::new(
            config.increase_bulk_batching()?,
            IncrementSink::new(Arc::clone(&store), hit_key),
        );
        let increase_reduce_bulk = BatchExecutor::new(
            config.increase_bulk_batching()?,
            AggregateSink::new(Arc::clone(&store), hit_key),
        );

        Ok(AppState {
            store,
            insert_bulk,
            insert_group,
            increase_bulk,
            increase_reduce_bulk,
        })
    }

    /// Flush every executor and await the deliveries.
    ///
    /// Called on shutdown, after the HTTP server has stopped accepting
    /// requests, so no items can be lost behind a closed socket.
    pub async fn drain(&self) {
        let flushes = [
            ("insert_bulk", self.insert_bulk.flush().await),
            ("insert_group", self.insert_group.flush().await),
            ("increase_bulk", self.increase_bulk.flush().await),
            ("increase_reduce_bulk", self.increase_reduce_bulk.flush().await),
        ];

        for (executor, result) in flushes {
            if let Err(err) = result {
                error!("Draining the {executor} executor failed: {err}");
            }
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ok_baseline).post(ok_baseline))
        .route("/insert_sync", post(insert_sync))
        .route("/insert_async", post(insert_async))
        .route("/insert_bulk", post(insert_bulk))
        .route("/insert_group", post(insert_group))
        .route("/increase_sync", post(increase_sync))
        .route("/increase_async", post(increase_async))
        .route("/increase_bulk", post(increase_bulk))
        .route("/increase_reduce_bulk", post(increase_reduce_bulk))
        .route("/stats", get(stats))
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error("store write failed: {0}")]
    Store(#[source] SinkError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("Request failed: {self}");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Empty responder measuring the framework overhead.
async fn ok_baseline() -> &'static str {
    "Ok"
}

async fn insert_sync(
    State(state): State<Arc<AppState>>,
    Json(record): Json<Value>,
) -> Result<&'static str, Error> {
    state.store.insert_one(record).await.map_err(Error::Store)?;
    Ok("Ok")
}

async fn insert_async(State(state): State<Arc<AppState>>, Json(record): Json<Value>) -> &'static str {
    let store = Arc::clone(&state.store);
    tokio::spawn(async move {
        if let Err(err) = store.insert_one(record).await {
            error!("Background insert failed: {err}");
        }
    });
    "Ok"
}

async fn insert_bulk(State(state): State<Arc<AppState>>, Json(record): Json<Value>) -> &'static str {
    state.insert_bulk.push(record);
    "Ok"
}

async fn insert_group(State(state): State<Arc<AppState>>, Json(record): Json<Value>) -> &'static str {
    state.insert_group.push(record);
    "Ok"
}

async fn increase_sync(
    State(state): State<Arc<AppState>>,
    Json(hit): Json<CounterHit>,
) -> Result<&'static str, Error> {
    state
        .store
        .increment_many(vec![(hit.id, 1)])
        .await
        .map_err(Error::Store)?;
    Ok("Ok")
}

async fn increase_async(
    State(state): State<Arc<AppState>>,
    Json(hit): Json<CounterHit>,
) -> &'static str {
    let store = Arc::clone(&state.store);
    tokio::spawn(async move {
        if let Err(err) = store.increment_many(vec![(hit.id, 1)]).await {
            error!("Background increment failed: {err}");
        }
    });
    "Ok"
}

async fn increase_bulk(
    State(state): State<Arc<AppState>>,
    Json(hit): Json<CounterHit>,
) -> &'static str {
    state.increase_bulk.push(hit);
    "Ok"
}

async fn increase_reduce_bulk(
    State(state): State<Arc<AppState>>,
    Json(hit): Json<CounterHit>,
) -> &'static str {
    state.increase_reduce_bulk.push(hit);
    "Ok"
}

#[derive(Debug, Serialize)]
struct ExecutorStats {
    pending: u64,
    processed: u64,
    dropped: u64,
}

impl ExecutorStats {
    fn of<B>(executor: &BatchExecutor<B>) -> ExecutorStats {
        ExecutorStats {
            pending: executor.pending_count(),
            processed: executor.processed_count(),
            dropped: executor.dropped_count(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    records: usize,
    counters: usize,
    insert_bulk: ExecutorStats,
    insert_group: ExecutorStats,
    increase_bulk: ExecutorStats,
    increase_reduce_bulk: ExecutorStats,
}

/// Counter snapshot used to detect a completed drain during load tests.
async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        records: state.store.record_count(),
        counters: state.store.counter_count(),
        insert_bulk: ExecutorStats::of(&state.insert_bulk),
        insert_group: ExecutorStats::of(&state.insert_group),
        increase_bulk: ExecutorStats::of(&state.increase_bulk),
        increase_reduce_bulk: ExecutorStats::of(&state.increase_reduce_bulk),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use clap::Parser;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let config = BulkdConfig::parse_from(["bulkd"]);
        Arc::new(AppState::new(&config).unwrap())
    }

    async fn request(router: &Router, method: &str, uri: &str, body: &str) -> Response {
        router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_owned()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn baseline_routes_respond_ok() {
        let router = router(test_state());

        let response = request(&router, "GET", "/", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Ok");

        let response = request(&router, "POST", "/", "").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let router = router(test_state());

        let response = request(&router, "POST", "/insert_nowhere", "{}").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn insert_sync_writes_immediately() {
        let state = test_state();
        let router = router(Arc::clone(&state));

        let response = request(&router, "POST", "/insert_sync", r#"{"title":"t"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.store.record_count(), 1);
    }

    #[tokio::test]
    async fn insert_bulk_lands_in_the_store_after_a_flush() {
        let state = test_state();
        let router = router(Arc::clone(&state));

        for _ in 0..3 {
            let response = request(&router, "POST", "/insert_bulk", r#"{"title":"t"}"#).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(state.store.record_count(), 0);

        state.insert_bulk.flush().await.unwrap();
        assert_eq!(state.store.record_count(), 3);
        assert_eq!(state.insert_bulk.processed_count(), 3);
    }

    #[tokio::test]
    async fn increase_reduce_bulk_collapses_repeated_ids() {
        let state = test_state();
        let router = router(Arc::clone(&state));

        request(&router, "POST", "/increase_reduce_bulk", r#"{"id":1}"#).await;
        request(&router, "POST", "/increase_reduce_bulk", r#"{"id":1}"#).await;
        request(&router, "POST", "/increase_reduce_bulk", r#"{"id":2}"#).await;
        state.increase_reduce_bulk.flush().await.unwrap();

        assert_eq!(state.store.counter_value(&1), Some(2));
        assert_eq!(state.store.counter_value(&2), Some(1));
    }

    #[tokio::test]
    async fn drain_flushes_every_executor() {
        let state = test_state();
        let router = router(Arc::clone(&state));

        request(&router, "POST", "/insert_bulk", r#"{"title":"t"}"#).await;
        request(&router, "POST", "/insert_group", r#"{"title":"t"}"#).await;
        request(&router, "POST", "/increase_bulk", r#"{"id":7}"#).await;

        state.drain().await;

        assert_eq!(state.store.record_count(), 2);
        assert_eq!(state.store.counter_value(&7), Some(1));
    }

    #[tokio::test]
    async fn stats_reports_executor_counters() {
        let state = test_state();
        let router = router(Arc::clone(&state));

        request(&router, "POST", "/insert_bulk", r#"{"title":"t"}"#).await;
        state.insert_bulk.flush().await.unwrap();

        let response = request(&router, "GET", "/stats", "").await;
        assert_eq!(response.status(), StatusCode::OK);

        let stats: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(stats["records"], 1);
        assert_eq!(stats["insert_bulk"]["processed"], 1);
        assert_eq!(stats["insert_bulk"]["pending"], 0);
        assert_eq!(stats["insert_bulk"]["dropped"], 0);
    }
}
