use std::str::FromStr;

use anyhow::Context;
use dotenv::dotenv;
use tokio::sync::watch;
use tracing_subscriber::filter::LevelFilter;

use workdesk::{
    config::Config, dtos::userdtos::LoginUserDto, service::polling::Visibility, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let level = LevelFilter::from_str(&config.log_level).unwrap_or(LevelFilter::DEBUG);
    tracing_subscriber::fmt().with_max_level(level).init();
    let app_state = AppState::new(config.clone()).context("Failed to build client")?;

    let session = match app_state.auth_service.restore() {
        Some(session) => session,
        None => {
            let (email, password) = match (config.email.clone(), config.password.clone()) {
                (Some(email), Some(password)) => (email, password),
                _ => anyhow::bail!(
                    "No stored session; set WORKDESK_EMAIL and WORKDESK_PASSWORD to log in"
                ),
            };
            app_state
                .auth_service
                .login(LoginUserDto { email, password })
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message().text))?
        }
    };
    tracing::info!(
        "Signed in as {} ({})",
        session.user.email,
        session.role().to_str()
    );

    let (_visibility_tx, visibility) = watch::channel(Visibility::Visible);
    app_state.notification_service.start(visibility);

    let mut inbox = app_state
        .chat_service
        .open_conversation_list()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message().text))?;

    let mut feed = app_state.notification_service.subscribe();
    let mut conversations = inbox.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
            changed = feed.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = feed.borrow_and_update().clone();
                tracing::info!(
                    "Notifications: {} unread of {}",
                    snapshot.unread_count,
                    snapshot.notifications.len()
                );
                for notification in snapshot.notifications.iter().filter(|n| !n.is_read()) {
                    tracing::info!(
                        "  [{}] {}: {} -> {:?}",
                        notification.notification_type,
                        notification.title,
                        notification.message,
                        notification.route()
                    );
                }
            }
            changed = conversations.changed() => {
                if changed.is_err() {
                    break;
                }
                let unread: i64 = conversations
                    .borrow_and_update()
                    .iter()
                    .map(|c| c.unread_count)
                    .sum();
                tracing::info!("Conversations updated, {} unread messages", unread);
            }
        }
    }

    inbox.unmount();
    app_state.notification_service.stop();
    Ok(())
}
