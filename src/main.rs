use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use storelens::mail::{LogMailer, Mailer, SmtpMailer};
use storelens::user::UserService;
use storelens::web::{AppState, WebServer};
use storelens::{Config, Database};

#[tokio::main]
async fn main() -> ExitCode {
    let path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = storelens::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        storelens::logging::init_console_only(&config.logging.level);
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> storelens::Result<()> {
    config.validate()?;

    info!("StoreLens gateway starting");
    info!(path = %config.database.path, "Opening database");
    let db = Database::open(&config.database.path).await?;

    if let Some(admin) = &config.admin {
        UserService::new(&db)
            .bootstrap_admin(&admin.mail, &admin.name, &admin.password)
            .await?;
    }

    let mailer: Arc<dyn Mailer> = if config.mail.enabled {
        let smtp = SmtpMailer::new(&config.mail)
            .map_err(|e| storelens::StoreLensError::Config(format!("mail: {e}")))?;
        info!(host = %config.mail.smtp_host, port = config.mail.smtp_port, "SMTP delivery enabled");
        Arc::new(smtp)
    } else {
        info!("Mail delivery disabled, verification codes are logged");
        Arc::new(LogMailer)
    };

    let state = AppState::new(&config, db, mailer)?;
    info!(analytics = %config.analytics.base_url, "Analytics service configured");

    WebServer::new(&config, state)?.run().await?;
    Ok(())
}
