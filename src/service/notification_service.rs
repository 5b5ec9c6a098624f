// service/notification_service.rs
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{
    api::{notificationapi::NotificationExt, ResourceClient},
    error::ClientError,
    models::notificationmodel::{Notification, NotificationFeed},
    navigation::{navigate_once, Navigator, Route},
    service::polling::{spawn_poll, PollHandle, PollerState, Visibility},
};

#[derive(Debug)]
struct FeedState {
    client: Arc<ResourceClient>,
    feed: watch::Sender<NotificationFeed>,
    state: watch::Sender<PollerState>,
}

impl FeedState {
    async fn refresh(&self) -> Result<NotificationFeed, ClientError> {
        let feed = self.client.get_notifications().await?;
        tracing::debug!(
            "Fetched {} notifications, {} unread",
            feed.notifications.len(),
            feed.unread_count
        );
        self.feed.send_replace(feed.clone());
        Ok(feed)
    }
}

/// Notification badge and list, kept in sync by polling while a session
/// exists and the view is visible.
#[derive(Debug, Clone)]
pub struct NotificationService {
    inner: Arc<FeedState>,
    period: Duration,
    supervisor: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl NotificationService {
    pub fn new(client: Arc<ResourceClient>, period: Duration) -> Self {
        let (feed, _) = watch::channel(NotificationFeed::default());
        let (state, _) = watch::channel(PollerState::Idle);
        Self {
            inner: Arc::new(FeedState { client, feed, state }),
            period,
            supervisor: Arc::new(Mutex::new(None)),
        }
    }

    pub fn feed(&self) -> NotificationFeed {
        self.inner.feed.borrow().clone()
    }

    pub fn unread_count(&self) -> i64 {
        self.inner.feed.borrow().unread_count
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationFeed> {
        self.inner.feed.subscribe()
    }

    pub fn state(&self) -> PollerState {
        *self.inner.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PollerState> {
        self.inner.state.subscribe()
    }

    /// Replaces the feed with the server's current list.
    pub async fn refresh(&self) -> Result<NotificationFeed, ClientError> {
        self.inner.refresh().await
    }

    /// Starts following session and visibility changes. Calling it again
    /// replaces the previous supervisor.
    pub fn start(&self, visibility: watch::Receiver<Visibility>) {
        let inner = self.inner.clone();
        let period = self.period;
        let task = tokio::spawn(supervise(inner, period, visibility));

        if let Ok(mut slot) = self.supervisor.lock() {
            if let Some(previous) = slot.replace(task) {
                previous.abort();
            }
        }
    }

    /// Stops polling for good; the tick task goes down with the supervisor.
    pub fn stop(&self) {
        if let Ok(mut slot) = self.supervisor.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
        self.inner.state.send_replace(PollerState::Idle);
        tracing::info!("Notification poller stopped");
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<NotificationFeed, ClientError> {
        self.inner.client.mark_notification_read(id).await?;
        self.refresh().await
    }

    pub async fn mark_all_as_read(&self) -> Result<NotificationFeed, ClientError> {
        self.inner.client.mark_all_notifications_read().await?;
        self.refresh().await
    }

    /// Click handling: go where the notification points and mark it read.
    /// Clicking again while already on that view does not navigate twice.
    pub async fn open(&self, notification: &Notification, navigator: &dyn Navigator) -> Route {
        let route = notification.route();
        navigate_once(navigator, route.clone());

        if !notification.is_read() {
            if let Err(e) = self.mark_as_read(&notification.id).await {
                tracing::warn!("Failed to mark notification {} read: {}", notification.id, e);
            }
        }
        route
    }
}

async fn supervise(
    inner: Arc<FeedState>,
    period: Duration,
    mut visibility: watch::Receiver<Visibility>,
) {
    let mut session = inner.client.session().subscribe();
    let mut poll: Option<PollHandle> = None;

    loop {
        let signed_in = session.borrow_and_update().is_some();
        let visible = *visibility.borrow_and_update() == Visibility::Visible;

        match (signed_in && visible, poll.is_some()) {
            (true, false) => {
                let tick_state = inner.clone();
                poll = Some(spawn_poll("notifications", period, true, move || {
                    let tick_state = tick_state.clone();
                    async move {
                        if let Err(e) = tick_state.refresh().await {
                            tracing::warn!("Notification poll failed: {}", e);
                        }
                    }
                }));
                inner.state.send_replace(PollerState::Polling);
                tracing::info!("Notification poller polling every {:?}", period);
            }
            (false, true) => {
                poll = None;
                inner.state.send_replace(PollerState::Idle);
                tracing::info!(
                    "Notification poller idle (signed_in: {}, visible: {})",
                    signed_in,
                    visible
                );
            }
            _ => {}
        }

        if !signed_in && *inner.feed.borrow() != NotificationFeed::default() {
            inner.feed.send_replace(NotificationFeed::default());
        }

        tokio::select! {
            changed = session.changed() => if changed.is_err() { break },
            changed = visibility.changed() => if changed.is_err() { break },
        }
    }

    drop(poll);
    inner.state.send_replace(PollerState::Idle);
}
