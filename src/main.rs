use admin_notify_lib::config::{ConfigLoader, NotifyConfig};
use admin_notify_lib::shutdown::{register_signal_handlers, ShutdownState};
use admin_notify_lib::transport::PushListener;
use admin_notify_lib::{HttpNotificationApi, LogPresenter, NotificationService, ServiceOptions};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Admin notification client - gates and presents admin notifications for a user session
#[derive(Parser, Debug)]
#[command(name = "admin-notify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the marketplace API
    #[arg(long, env = "ADMIN_NOTIFY_API_URL")]
    api_url: Option<String>,

    /// Bearer token for the user session
    #[arg(long, env = "ADMIN_NOTIFY_TOKEN")]
    token: Option<String>,

    /// WebSocket URL of the push channel (push disabled when unset)
    #[arg(long, env = "ADMIN_NOTIFY_WS_URL")]
    ws_url: Option<String>,

    /// Seconds between full refreshes of the active set
    #[arg(long)]
    refresh_secs: Option<u64>,
}

impl Cli {
    /// Apply command-line overrides on top of the file config
    fn apply(&self, config: &mut NotifyConfig) {
        if let Some(ref url) = self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(ref token) = self.token {
            config.api.auth_token = Some(token.clone());
        }
        if let Some(ref ws_url) = self.ws_url {
            config.push.ws_url = Some(ws_url.clone());
        }
        if let Some(secs) = self.refresh_secs {
            config.refresh.interval_secs = secs;
        }
    }
}

fn load_config(cli: &Cli) -> Result<NotifyConfig> {
    let loader = match cli.config {
        Some(ref path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };

    let mut config = loader.load()?;
    cli.apply(&mut config);
    admin_notify_lib::config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let api = HttpNotificationApi::new(&config.api).context("Failed to create API client")?;
    let service = NotificationService::new(
        Arc::new(api),
        Arc::new(LogPresenter::new()),
        ServiceOptions::from_config(&config),
    );

    let shutdown_state = ShutdownState::with_token(service.cancellation_token());
    if let Err(e) = register_signal_handlers(shutdown_state.clone()) {
        log::warn!("Failed to register signal handlers: {}", e);
    }

    // Failures are logged; the refresh loop recovers
    if service.initialize().await.is_ok() {
        log::info!(
            "Loaded {} notifications ({} unread)",
            service.notifications().await.len(),
            service.unread_count().await
        );
    }

    let refresh = service.spawn_refresh_loop();
    let push = config.push.ws_url.clone().map(|url| {
        PushListener::new(url, config.api.auth_token.clone(), &config.push, service.clone())
            .spawn()
    });
    if push.is_none() {
        log::info!("No push channel configured, relying on periodic refresh");
    }

    shutdown_state.wait().await;
    service.shutdown();

    let _ = refresh.await;
    if let Some(push) = push {
        let _ = push.await;
    }

    log::info!("Shutdown complete");
    Ok(())
}
