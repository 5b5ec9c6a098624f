// service/polling.rs
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Whether the view hosting a poller is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

/// Owns a running poll task. Dropping the handle aborts the task.
#[derive(Debug)]
pub struct PollHandle {
    name: String,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Takes ownership of an already spawned background task.
    pub fn adopt(name: impl Into<String>, task: JoinHandle<()>) -> Self {
        Self {
            name: name.into(),
            task,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        tracing::debug!("Stopping poller {}", self.name);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Shortest period a poller will run at.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Runs `tick` every `period`. With `immediate` the first run happens now,
/// otherwise one period from now. A slow tick delays the next one rather
/// than causing a burst. A zero period is raised to [`MIN_PERIOD`].
pub fn spawn_poll<F, Fut>(
    name: impl Into<String>,
    period: Duration,
    immediate: bool,
    mut tick: F,
) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let name = name.into();
    let task_name = name.clone();
    let period = if period.is_zero() {
        tracing::warn!("Poller {} given a zero period, using {:?}", name, MIN_PERIOD);
        MIN_PERIOD
    } else {
        period
    };

    let task = tokio::spawn(async move {
        let start = if immediate {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut interval = interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!("Poller {} started, every {:?}", task_name, period);
        loop {
            interval.tick().await;
            tick().await;
        }
    });

    PollHandle { name, task }
}
