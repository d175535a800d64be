mod data_routes;
mod report_routes;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{dev::Server, get, web, App, HttpRequest, HttpResponse, HttpServer, Responder, ResponseError};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use crate::domain::error::AppError;
use crate::infrastructure::config::AppConfig;
use crate::interfaces::AppState;

/// Header carrying the caller's identity, set by whatever authenticates
/// requests in front of this service
pub const USER_HEADER: &str = "X-User-Id";

const LOG_CAPACITY: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub app_state: Arc<AppState>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl HttpState {
    pub fn new(app_state: Arc<AppState>, logs: Arc<Mutex<Vec<LogEntry>>>) -> Self {
        Self { app_state, logs }
    }

    pub(crate) fn info(&self, source: &str, message: &str) {
        add_log(&self.logs, "INFO", source, message);
    }

    /// Record a failed request and hand the error back for the response
    pub(crate) fn fail(&self, source: &str, context: &str, err: AppError) -> AppError {
        add_log(&self.logs, "ERROR", source, &format!("{}: {}", context, err));
        err
    }
}

#[derive(Serialize)]
pub(crate) struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    data: T,
}

pub(crate) fn respond<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    HttpResponse::build(status).json(Envelope {
        success: true,
        count: None,
        data,
    })
}

pub(crate) fn respond_list<T: Serialize>(items: Vec<T>) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        success: true,
        count: Some(items.len()),
        data: items,
    })
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) | AppError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::IoError(_) | AppError::DatabaseError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::ValidationError(msg)
            | AppError::UnsupportedFormat(msg)
            | AppError::InsufficientData(msg)
            | AppError::Timeout(msg) => msg.clone(),
            other => {
                error!(error = %other, "Request failed");
                "Server Error".to_string()
            }
        };

        HttpResponse::build(status).json(ErrorBody {
            success: false,
            error: message,
        })
    }
}

/// Identity of the caller, from [`USER_HEADER`]
pub(crate) fn caller_id(req: &HttpRequest) -> Result<String, AppError> {
    req.headers()
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Unauthorized("Missing caller identity".to_string()))
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    match data.logs.lock() {
        Ok(logs) => HttpResponse::Ok().json(&*logs),
        Err(_) => AppError::Internal("Activity log is unavailable".to_string()).error_response(),
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };

    match level {
        "ERROR" => error!(source, "{}", message),
        "WARN" => warn!(source, "{}", message),
        _ => info!(source, "{}", message),
    }

    if let Ok(mut logs) = logs.lock() {
        logs.push(entry.clone());
        if logs.len() > LOG_CAPACITY {
            logs.remove(0);
        }
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

/// Register every route; shared by the server and the handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::scope("/api")
            .service(get_logs)
            .service(data_routes::scope())
            .service(report_routes::scope())
            .service(report_routes::render_narrative),
    );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub fn start_server(
    app_state: Arc<AppState>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
    config: &AppConfig,
) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState::new(app_state, logs));
    let max_upload_bytes = config.max_upload_bytes;

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(json_config())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use actix_web::test as actix_test;

    async fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_health() {
        let app = actix_test::init_service(App::new().configure(configure)).await;
        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(resp).await, "OK");
    }

    #[actix_web::test]
    async fn test_logs_capture_activity() {
        let state = http_state().await;
        state.info("Test", "first entry");

        let app =
            actix_test::init_service(App::new().app_data(state.clone()).configure(app_config)).await;
        let req = actix_test::TestRequest::get().uri("/api/logs").to_request();
        let logs: Vec<LogEntry> = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "first entry");
    }

    #[test]
    fn test_log_buffer_is_bounded() {
        let logs = Mutex::new(Vec::new());
        for i in 0..(LOG_CAPACITY + 5) {
            add_log(&logs, "INFO", "Test", &format!("entry {}", i));
        }
        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), LOG_CAPACITY);
        assert_eq!(logs[0].message, "entry 5");
    }

    #[actix_web::test]
    async fn test_error_envelope() {
        let resp = AppError::NotFound("Report not found".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Report not found");
    }

    #[actix_web::test]
    async fn test_internal_errors_are_masked() {
        let resp = AppError::DatabaseError("disk I/O error".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["error"], "Server Error");
    }

    #[actix_web::test]
    async fn test_missing_identity_is_unauthorized() {
        let req = actix_test::TestRequest::default().to_http_request();
        assert!(matches!(caller_id(&req), Err(AppError::Unauthorized(_))));

        let req = actix_test::TestRequest::default()
            .insert_header((USER_HEADER, " user-7 "))
            .to_http_request();
        assert_eq!(caller_id(&req).unwrap(), "user-7");
    }
}
