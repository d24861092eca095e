mod metrics;

use std::net::SocketAddr;
use std::sync::Arc;

use analysis_models::{AnalysisReport, AnalyzeRequest, ApiError, ModelStats, SampleLogsResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use threat_detection::{DetectError, ThreatDetector};
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

const DEFAULT_TRAIN_SAMPLES: usize = 2000;

#[derive(Clone)]
struct AppState {
    detector: Arc<RwLock<ThreatDetector>>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<AnalysisReport> {
    metrics::record_analyze_request();

    if req.logs.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No logs provided"));
    }

    let parsed = log_parser::parse(&req.logs);
    let detector = state.detector.read().await;
    match detector.analyze(&parsed) {
        Ok(report) => {
            metrics::record_threats(report.threats_detected);
            tracing::info!(
                total_logs = report.total_logs,
                threats = report.threats_detected,
                risk = report.risk_score,
                "analysis complete"
            );
            Ok(Json(report))
        }
        Err(DetectError::NotTrained) => {
            metrics::record_analyze_rejected();
            Err(api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "Model not trained yet",
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "analysis failed");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Model stats, or a 200 training placeholder so pollers can tell
/// "still starting" apart from "down".
async fn stats(State(state): State<AppState>) -> Response {
    metrics::record_stats_request();
    let detector = state.detector.read().await;
    match detector.stats() {
        Ok(s) => Json(s).into_response(),
        Err(_) => Json(ApiError {
            error: "Model not trained yet".to_string(),
        })
        .into_response(),
    }
}

async fn sample_logs_handler() -> Json<SampleLogsResponse> {
    metrics::record_sample_logs_request();
    Json(SampleLogsResponse {
        logs: sample_logs::generate_sample_logs(),
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn metrics_handler() -> String {
    metrics::encode_metrics()
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/stats", get(stats))
        .route("/api/sample-logs", get(sample_logs_handler))
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env();
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn train_sample_count() -> usize {
    std::env::var("LOGWARDEN_TRAIN_SAMPLES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TRAIN_SAMPLES)
}

#[tokio::main]
async fn main() {
    init_tracing();

    let state = AppState {
        detector: Arc::new(RwLock::new(ThreatDetector::new())),
    };

    // Train in the background so the listener comes up immediately;
    // /api/stats reports the training placeholder until this finishes.
    let training_state = state.clone();
    tokio::spawn(async move {
        let samples = train_sample_count();
        let outcome = tokio::task::spawn_blocking(move || {
            let corpus = sample_logs::generate_training_corpus(samples);
            let mut detector = ThreatDetector::new();
            detector.train(&corpus).map(|()| detector)
        })
        .await;

        match outcome {
            Ok(Ok(detector)) => {
                *training_state.detector.write().await = detector;
                tracing::info!(samples, "model trained");
            }
            Ok(Err(e)) => tracing::error!(error = %e, "model training failed"),
            Err(e) => tracing::error!(error = %e, "training task panicked"),
        }
    });

    let addr: SocketAddr = std::env::var("LOGWARDEN_HTTP_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()
        .expect("invalid LOGWARDEN_HTTP_ADDR");

    tracing::info!("logwarden_http listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), router(state))
        .await
        .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained_state() -> AppState {
        let corpus = sample_logs::generate_training_corpus(256);
        let mut detector = ThreatDetector::new();
        detector.train(&corpus).unwrap();
        AppState {
            detector: Arc::new(RwLock::new(detector)),
        }
    }

    fn untrained_state() -> AppState {
        AppState {
            detector: Arc::new(RwLock::new(ThreatDetector::new())),
        }
    }

    async fn serve(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn empty_input_is_a_bad_request() {
        let base = serve(trained_state()).await;
        let client = reqwest_client();
        let resp = client
            .post(format!("{base}/api/analyze"))
            .json(&serde_json::json!({"logs": "   \n  "}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "No logs provided");
    }

    #[tokio::test]
    async fn untrained_model_rejects_analysis_with_503() {
        let base = serve(untrained_state()).await;
        let client = reqwest_client();
        let resp = client
            .post(format!("{base}/api/analyze"))
            .json(&serde_json::json!({"logs": "Failed password for admin"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 503);
    }

    #[tokio::test]
    async fn stats_reports_training_placeholder_then_real_numbers() {
        let base = serve(untrained_state()).await;
        let client = reqwest_client();
        let body: serde_json::Value = client
            .get(format!("{base}/api/stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["error"], "Model not trained yet");

        let base = serve(trained_state()).await;
        let stats: ModelStats = client
            .get(format!("{base}/api/stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats.feature_count, 22);
        assert!(stats.rf_estimators > 0);
    }

    #[tokio::test]
    async fn analyze_round_trip_flags_suspicious_lines() {
        let base = serve(trained_state()).await;
        let client = reqwest_client();
        let logs = "Jan 15 10:38:55 server sshd[1234]: Failed password for admin from 203.0.113.45 port 22 ssh2\n\
                    Jan 15 10:39:02 server sshd[1234]: Failed password for admin from 203.0.113.45 port 22 ssh2";
        let report: AnalysisReport = client
            .post(format!("{base}/api/analyze"))
            .json(&serde_json::json!({"logs": logs}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(report.total_logs, 2);
        assert!(report.threats_detected >= 1);
        assert!(report.threat_types.iter().any(|t| t == "brute_force"));
    }

    #[tokio::test]
    async fn sample_logs_endpoint_returns_newline_joined_text() {
        let base = serve(untrained_state()).await;
        let client = reqwest_client();
        let body: serde_json::Value = client
            .get(format!("{base}/api/sample-logs"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let logs = body["logs"].as_str().unwrap();
        assert_eq!(logs.lines().count(), 20);
    }

    fn reqwest_client() -> reqwest::Client {
        reqwest::Client::new()
    }
}
