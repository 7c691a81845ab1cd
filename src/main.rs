use callwatch::config::Config;
use callwatch::logger::{self, LogTag};
use callwatch::monitor::MonitorService;
use callwatch::probe::EndpointProber;
use callwatch::subscribers::SubscriberDb;
use callwatch::telegram::{self, CommandContext, TelegramBot};
use std::sync::Arc;
use tokio::sync::Notify;

const DEFAULT_CONFIG_PATH: &str = "callwatch.toml";

#[tokio::main]
async fn main() {
    logger::init();
    logger::info(LogTag::System, "Callwatch starting up");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // Configuration errors are fatal: refuse to run a vacuous monitor
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            logger::error(LogTag::Config, &format!("{}", e));
            std::process::exit(1);
        }
    };

    let db = match SubscriberDb::open(&config.store.db_path) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            logger::error(LogTag::Db, &format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let prober = match EndpointProber::new() {
        Ok(prober) => Arc::new(prober),
        Err(e) => {
            logger::error(LogTag::Probe, &format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let bot = match TelegramBot::new(&config.telegram.bot_token) {
        Ok(bot) => Arc::new(bot),
        Err(e) => {
            logger::error(LogTag::Telegram, &e);
            std::process::exit(1);
        }
    };

    let bot_username = match bot.validate().await {
        Ok(username) => username,
        Err(e) => {
            logger::error(LogTag::Telegram, &e);
            std::process::exit(1);
        }
    };

    // Ctrl-C stops the polling loop and the monitor task
    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            shutdown.notify_waiters();
        }) {
            logger::error(
                LogTag::System,
                &format!("Failed to install shutdown handler: {}", e),
            );
            std::process::exit(1);
        }
    }

    let monitor = MonitorService::new(
        prober.clone(),
        config.endpoints.clone(),
        db.clone(),
        bot.clone(),
        config.check_interval(),
    );
    let monitor_handle = tokio::spawn(monitor.run(shutdown.clone()));

    let ctx = CommandContext {
        db,
        prober,
        endpoints: config.endpoints.clone(),
    };
    telegram::polling::run(bot, bot_username, ctx, shutdown).await;

    if let Err(e) = monitor_handle.await {
        logger::error(LogTag::System, &format!("Monitor task panicked: {}", e));
    }

    logger::info(LogTag::System, "Callwatch stopped");
}
