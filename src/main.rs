use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tippbot::gateway::{
    Authorizer, LogNotifier, Notifier, ReminderRunner, StaticAuthorizer, StoredReminderScheduler,
    TelegramClient,
};
use tippbot::{
    api, config::Config, db::init_db, Clock, GameSettings, Leaderboard, LifecycleManager,
    Repository, SessionStore, SystemClock,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (notifier, authorizer): (Arc<dyn Notifier>, Arc<dyn Authorizer>) =
        match &config.telegram_bot_token {
            Some(token) => {
                let client = Arc::new(TelegramClient::new(
                    config.telegram_api_url.clone(),
                    token.clone(),
                ));
                tracing::info!("Using Telegram for messages and admin checks");
                let notifier: Arc<dyn Notifier> = client.clone();
                let authorizer: Arc<dyn Authorizer> = client;
                (notifier, authorizer)
            }
            None => {
                tracing::info!(
                    admins = config.admin_users.len(),
                    "No Telegram token, using static admin list"
                );
                let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
                let authorizer: Arc<dyn Authorizer> =
                    Arc::new(StaticAuthorizer::new(config.admin_users.iter().copied()));
                (notifier, authorizer)
            }
        };

    let scheduler = Arc::new(StoredReminderScheduler::new(repo.clone()));
    let lifecycle = Arc::new(LifecycleManager::new(
        repo.clone(),
        scheduler,
        clock.clone(),
        GameSettings::from_config(&config),
    ));
    let leaderboard = Arc::new(Leaderboard::new(repo.clone(), config.leaderboard_limit));
    let sessions = Arc::new(SessionStore::new(chrono::Duration::seconds(
        config.session_timeout_secs,
    )));

    let runner = ReminderRunner::new(
        repo.clone(),
        notifier,
        clock.clone(),
        Duration::from_millis(config.reminder_poll_ms),
    );
    tokio::spawn(runner.run());

    // Picks are also purged on every new selection; this catches idle chats.
    let purge_sessions = sessions.clone();
    let purge_clock = clock.clone();
    let purge_every = Duration::from_secs(config.session_timeout_secs.unsigned_abs());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_every);
        loop {
            ticker.tick().await;
            let purged = purge_sessions.purge_expired(purge_clock.now()).await;
            if purged > 0 {
                tracing::debug!(purged, "Expired prediction sessions purged");
            }
        }
    });

    let app = api::create_router(api::AppState::new(
        repo,
        lifecycle,
        leaderboard,
        authorizer,
        sessions,
    ));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
