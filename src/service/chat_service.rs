// service/chat_service.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use validator::Validate;

use crate::{
    api::{chatapi::ChatExt, ResourceClient},
    dtos::chatdtos::SendMessageDto,
    error::ClientError,
    models::{
        chatmodels::{sort_messages, Conversation, Message},
        usermodel::Session,
        workrequestmodel::{WorkRequest, WorkRequestStatus},
    },
    service::{
        polling::{spawn_poll, PollHandle},
        work_request_service::WorkRequestService,
    },
};

#[derive(Debug, Clone)]
pub struct ChatService {
    client: Arc<ResourceClient>,
    chat_period: Duration,
    conversations_period: Duration,
    work_requests: WorkRequestService,
}

impl ChatService {
    /// `work_requests` must be the service the rest of the app updates
    /// through, so mounted views see its status changes.
    pub fn new(
        client: Arc<ResourceClient>,
        work_requests: WorkRequestService,
        chat_period: Duration,
        conversations_period: Duration,
    ) -> Self {
        Self {
            client,
            work_requests,
            chat_period,
            conversations_period,
        }
    }

    pub async fn open_conversation(
        &self,
        request: &WorkRequest,
        other_user_id: i64,
    ) -> Result<ConversationView, ClientError> {
        self.mount(request.id, other_user_id, request.status()).await
    }

    /// Loads history, marks the thread read and starts polling. A failed
    /// history fetch fails the mount; a failed mark-read only logs. The view
    /// closes itself when the work request reaches a terminal status.
    pub async fn mount(
        &self,
        work_request_id: i64,
        other_user_id: i64,
        status: WorkRequestStatus,
    ) -> Result<ConversationView, ClientError> {
        self.client.session().require()?;

        let (messages, _) = watch::channel(Vec::new());
        let shared = Arc::new(ConversationShared {
            client: self.client.clone(),
            work_request_id,
            other_user_id,
            closed: AtomicBool::new(status.is_terminal()),
            sending: AtomicBool::new(false),
            messages,
        });

        shared.refresh().await?;

        if let Err(e) = self
            .client
            .mark_conversation_read(work_request_id, other_user_id)
            .await
        {
            tracing::warn!(
                "Failed to mark conversation {}/{} read: {}",
                work_request_id,
                other_user_id,
                e
            );
        }

        let name = format!("chat-{}-{}", work_request_id, other_user_id);
        let status_listener = PollHandle::adopt(
            format!("{}-status", name),
            tokio::spawn(follow_status(shared.clone(), self.work_requests.subscribe())),
        );

        let tick_shared = shared.clone();
        let poll = spawn_poll(name, self.chat_period, false, move || {
            let tick_shared = tick_shared.clone();
            async move { tick_shared.tick().await }
        });

        tracing::info!(
            "Conversation {}/{} mounted",
            work_request_id,
            other_user_id
        );
        Ok(ConversationView {
            shared,
            poll: Some(poll),
            status_listener: Some(status_listener),
        })
    }

    pub async fn conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        self.client.session().require()?;
        self.client.get_conversations().await
    }

    pub async fn open_conversation_list(&self) -> Result<ConversationListView, ClientError> {
        self.client.session().require()?;

        let (conversations, _) = watch::channel(Vec::new());
        let shared = Arc::new(ListShared {
            client: self.client.clone(),
            conversations,
        });
        shared.refresh().await?;

        let tick_shared = shared.clone();
        let poll = spawn_poll("conversations", self.conversations_period, false, move || {
            let tick_shared = tick_shared.clone();
            async move { tick_shared.tick().await }
        });

        Ok(ConversationListView {
            shared,
            poll: Some(poll),
        })
    }

    /// A client hiring the person they are chatting with.
    pub async fn assign_counterpart(
        &self,
        request: &WorkRequest,
        view: &ConversationView,
    ) -> Result<WorkRequest, ClientError> {
        if view.work_request_id() != request.id {
            return Err(ClientError::InvalidInput(format!(
                "conversation belongs to work request {}, not {}",
                view.work_request_id(),
                request.id
            )));
        }
        self.work_requests
            .assign_provider(request, view.other_user_id())
            .await
    }
}

#[derive(Debug)]
struct ConversationShared {
    client: Arc<ResourceClient>,
    work_request_id: i64,
    other_user_id: i64,
    closed: AtomicBool,
    sending: AtomicBool,
    messages: watch::Sender<Vec<Message>>,
}

impl ConversationShared {
    async fn refresh(&self) -> Result<Vec<Message>, ClientError> {
        let mut messages = self
            .client
            .get_messages(self.work_request_id, self.other_user_id)
            .await?;
        sort_messages(&mut messages);
        self.messages.send_replace(messages.clone());
        Ok(messages)
    }

    // Signed out: nothing is fetched and the thread is emptied.
    async fn tick(&self) {
        if self.client.session().current().is_none() {
            if !self.messages.borrow().is_empty() {
                self.messages.send_replace(Vec::new());
            }
            return;
        }
        if let Err(e) = self.refresh().await {
            tracing::warn!(
                "Chat poll for work request {} failed: {}",
                self.work_request_id,
                e
            );
        }
    }

    fn set_status(&self, status: WorkRequestStatus) {
        let closed = status.is_terminal();
        if self.closed.swap(closed, Ordering::AcqRel) != closed {
            tracing::info!(
                "Conversation for work request {} is now {}",
                self.work_request_id,
                if closed { "closed" } else { "open" }
            );
        }
    }
}

async fn follow_status(
    shared: Arc<ConversationShared>,
    mut updates: broadcast::Receiver<WorkRequest>,
) {
    loop {
        match updates.recv().await {
            Ok(request) if request.id == shared.work_request_id => {
                shared.set_status(request.status())
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Conversation status listener skipped {} updates", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

// Clears the in-flight flag however the send ends.
struct SendingGuard<'a>(&'a AtomicBool);

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One mounted chat thread. Dropping the view stops its poller.
#[derive(Debug)]
pub struct ConversationView {
    shared: Arc<ConversationShared>,
    poll: Option<PollHandle>,
    status_listener: Option<PollHandle>,
}

impl ConversationView {
    pub fn work_request_id(&self) -> i64 {
        self.shared.work_request_id
    }

    pub fn other_user_id(&self) -> i64 {
        self.shared.other_user_id
    }

    pub fn messages(&self) -> Vec<Message> {
        self.shared.messages.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Message>> {
        self.shared.messages.subscribe()
    }

    /// Sending is disabled once the work request is completed or cancelled.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    pub fn set_status(&self, status: WorkRequestStatus) {
        self.shared.set_status(status);
    }

    pub fn is_sending(&self) -> bool {
        self.shared.sending.load(Ordering::Acquire)
    }

    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().map_or(false, PollHandle::is_running)
    }

    pub fn is_own(&self, message: &Message, viewer: &Session) -> bool {
        message.is_own(viewer.user_id(), viewer.role())
    }

    pub async fn refresh(&self) -> Result<Vec<Message>, ClientError> {
        self.shared.refresh().await
    }

    /// Sends `content` and appends the server's echo. Only one send may be
    /// in flight per view.
    pub async fn send(&self, content: &str) -> Result<Message, ClientError> {
        let shared = &self.shared;
        if self.is_closed() {
            return Err(ClientError::ConversationClosed(shared.work_request_id));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(ClientError::InvalidInput(
                "message content is empty".to_string(),
            ));
        }

        if shared
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::SendInFlight);
        }
        let _guard = SendingGuard(&shared.sending);

        let dto = SendMessageDto {
            work_request_id: shared.work_request_id,
            receiver_id: shared.other_user_id,
            content: content.to_string(),
        };
        dto.validate()?;

        let sent = shared.client.send_message(&dto).await?;
        shared.messages.send_modify(|messages| {
            if !messages.iter().any(|m| m.id == sent.id) {
                messages.push(sent.clone());
                sort_messages(messages);
            }
        });

        tracing::debug!(
            "Message {} sent on work request {}",
            sent.id,
            shared.work_request_id
        );
        Ok(sent)
    }

    pub fn unmount(&mut self) {
        self.status_listener.take();
        if let Some(poll) = self.poll.take() {
            poll.stop();
            tracing::info!(
                "Conversation {}/{} unmounted",
                self.shared.work_request_id,
                self.shared.other_user_id
            );
        }
    }
}

#[derive(Debug)]
struct ListShared {
    client: Arc<ResourceClient>,
    conversations: watch::Sender<Vec<Conversation>>,
}

impl ListShared {
    async fn refresh(&self) -> Result<Vec<Conversation>, ClientError> {
        let conversations = self.client.get_conversations().await?;
        self.conversations.send_replace(conversations.clone());
        Ok(conversations)
    }

    async fn tick(&self) {
        if self.client.session().current().is_none() {
            if !self.conversations.borrow().is_empty() {
                self.conversations.send_replace(Vec::new());
            }
            return;
        }
        if let Err(e) = self.refresh().await {
            tracing::warn!("Conversation list poll failed: {}", e);
        }
    }
}

/// The inbox: every conversation of the signed-in user, polled.
#[derive(Debug)]
pub struct ConversationListView {
    shared: Arc<ListShared>,
    poll: Option<PollHandle>,
}

impl ConversationListView {
    pub fn conversations(&self) -> Vec<Conversation> {
        self.shared.conversations.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Conversation>> {
        self.shared.conversations.subscribe()
    }

    pub fn unread_total(&self) -> i64 {
        self.shared
            .conversations
            .borrow()
            .iter()
            .map(|c| c.unread_count)
            .sum()
    }

    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().map_or(false, PollHandle::is_running)
    }

    pub async fn refresh(&self) -> Result<Vec<Conversation>, ClientError> {
        self.shared.refresh().await
    }

    pub fn unmount(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.stop();
        }
    }
}
