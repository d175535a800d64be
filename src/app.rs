use std::sync::{Arc, Mutex};

use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::{add_log, start_server, LogEntry};

pub fn run() -> std::io::Result<()> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();
            error!(error = %err, "Failed to load configuration");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, err));
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .try_init();

    actix_web::rt::System::new().block_on(serve(config))
}

async fn serve(config: AppConfig) -> std::io::Result<()> {
    let app_state = crate::infrastructure::bootstrap::setup(&config)
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
    add_log(
        &logs,
        "INFO",
        "System",
        &format!("Listening on http://{}:{}", config.host, config.port),
    );

    start_server(app_state, logs, &config)?.await
}
