use crate::components::{
    CalendarService, GoogleCalendarClient, IntentClassifier, MessagingService, OpenAiClassifier,
    ReminderScheduler, ReminderSchedulerHandle, TwilioClient,
};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::shutdown;
use crate::web::{self, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,hyper=warn,reqwest=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Construct every service once and wire them into the handler state
pub fn build_state(config: &Config) -> miette::Result<(AppState, ReminderSchedulerHandle)> {
    let timezone = config.tz()?;

    let calendar: Arc<dyn CalendarService> = Arc::new(GoogleCalendarClient::new(config));
    let messaging: Arc<dyn MessagingService> = Arc::new(TwilioClient::new(config));
    let classifier: Arc<dyn IntentClassifier> = Arc::new(OpenAiClassifier::new(config));

    let scheduler = ReminderSchedulerHandle::new(Arc::clone(&messaging));
    let scheduler_service: Arc<dyn ReminderScheduler> = Arc::new(scheduler.clone());

    if config.uses_placeholder_recipient() {
        warn!(
            "DEFAULT_REMINDER_RECIPIENT is not set; reminders go to placeholder {}",
            config.default_recipient
        );
    }

    let dispatcher = Dispatcher::new(
        Arc::clone(&calendar),
        Arc::clone(&messaging),
        scheduler_service,
        config.default_recipient.clone(),
        timezone,
    );

    let state = AppState {
        dispatcher,
        classifier,
        calendar,
        messaging,
        timezone,
    };

    Ok((state, scheduler))
}

/// Serve the HTTP API until a shutdown signal arrives
pub async fn start_server(config: Config) -> miette::Result<()> {
    let (state, scheduler) = build_state(&config)?;
    let app = web::router(state);

    let listener = TcpListener::bind(config.bind_address.as_str()).await.map_err(Error::from)?;
    info!("Listening on {}", config.bind_address);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await;

    shutdown::shutdown_services(&scheduler).await;

    result.map_err(|e| Error::Other(format!("Server error: {}", e)).into())
}
