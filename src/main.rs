use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use orderbell::state::{MessageSummary, OrderStatus, OrderSummary};
use orderbell::sync::{update_channel, StoreUpdate};
use orderbell::{
    default_rule_table, AuthStore, Config, DashboardStore, NotificationBootstrap,
    NotificationStore, RodioBackend, SoundContextSource, SoundEngine, User, UserKind, UserRole,
};

/// Initialize logging: daily-rotated file in the platform config directory,
/// plus console output in debug builds.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("orderbell").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "orderbell.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Scripted walkthrough of the sound rules against a simulated live feed.
fn main() {
    initialize_tracing();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let backend = match RodioBackend::new(&config.sound_dir, config.volume) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            eprintln!("Failed to initialize audio output: {}", e);
            eprintln!("Check that an audio device is available.");
            std::process::exit(1);
        }
    };

    let store = NotificationStore::new();
    let engine = Arc::new(SoundEngine::new(
        store.clone(),
        backend.clone(),
        default_rule_table(),
    ));

    // Sign a cashier in so the order rules can fire.
    let auth = AuthStore::new();
    auth.set_user(User {
        id: "u-1".to_string(),
        name: "Amina".to_string(),
        kind: UserKind::Restaurant,
        role: UserRole::Caissier,
    });
    let context = SoundContextSource::new(auth, DashboardStore::new());

    let mut bootstrap = NotificationBootstrap::new(store, Arc::clone(&engine), context);
    let (feed_tx, feed_rx) = update_channel();
    bootstrap.with_socket_feed(feed_rx);
    bootstrap.with_sla_watch(
        Duration::from_millis(config.sla_grace_ms),
        Duration::from_millis(config.sla_check_interval_ms),
    );
    bootstrap.with_message_sound(backend, &config.message_sound);
    bootstrap.attach();

    tracing::info!("Demo: a new order arrives, the cashier bell repeats until it is accepted");
    let order = OrderSummary {
        id: "o-1001".to_string(),
        status: OrderStatus::Nouvelle,
        placed_at_ms: unix_millis(),
        promised_for_ms: None,
    };
    let _ = feed_tx.send(StoreUpdate::OrderUpserted(order.clone()));
    thread::sleep(Duration::from_secs(7));

    tracing::info!("Demo: the order is accepted, the bell stops");
    let _ = feed_tx.send(StoreUpdate::OrderUpserted(OrderSummary {
        status: OrderStatus::EnPreparation,
        ..order
    }));
    thread::sleep(Duration::from_secs(2));

    tracing::info!("Demo: a message arrives, one chime");
    let _ = feed_tx.send(StoreUpdate::UnreadMessages(vec![MessageSummary {
        id: "m-1".to_string(),
        sender: "siege".to_string(),
        preview: "Nouveau menu valide".to_string(),
    }]));
    thread::sleep(Duration::from_secs(2));

    bootstrap.detach();
    tracing::info!("Demo finished");
}
