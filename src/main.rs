//! Notification tail: connects as the configured user and logs the feed.

use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};

use job_notifications::adapters::realtime::{ConnectionManager, HttpTransportFactory};
use job_notifications::application::{NotificationDropdown, NotificationSession};
use job_notifications::config::{AppConfig, TelemetryConfig, ValidationError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.telemetry)?;

    let user = config
        .identity
        .as_ref()
        .ok_or(ValidationError::MissingRequired("IDENTITY__USER_ID"))?
        .user()?;

    let factory = HttpTransportFactory::new(
        config.realtime.transport_config(),
        config.realtime.transport_kinds()?,
    )?;
    let connections = ConnectionManager::new(Arc::new(factory), config.realtime.client_options());
    let session = NotificationSession::start(user, &connections, config.feed.capacity)?;

    let mut snapshots = session.feed().subscribe();
    let mut states = session.client().state_changes();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let dropdown = NotificationDropdown::from_snapshot(&snapshots.borrow_and_update());
                info!(
                    badge = dropdown.badge.as_deref().unwrap_or("-"),
                    items = dropdown.items.len(),
                    "Feed updated"
                );
                if let Some(latest) = dropdown.items.first() {
                    info!(
                        from = %latest.sender_name,
                        route = %latest.chat_route,
                        unread = latest.unread,
                        "{}",
                        latest.preview
                    );
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                info!(state = ?state, "Connection state changed");
            }
        }
    }

    info!(user_id = %session.user().id(), "Shutting down");
    Ok(())
}

fn init_tracing(config: &TelemetryConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let builder = tracing_subscriber::fmt().with_env_filter(config.env_filter()?);
    if config.json {
        builder.json().try_init()?;
    } else {
        builder.try_init()?;
    }
    Ok(())
}
