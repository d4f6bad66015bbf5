//! Output collaborators receiving the generated windows

use crate::common::TrajectoryWindow;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Consumer of generated windows
///
/// Publishing is fire-and-forget: nothing flows back into the generator.
pub trait TrajectorySink: Send {
    fn publish(&mut self, window: TrajectoryWindow);
}

impl<F> TrajectorySink for F
where
    F: FnMut(TrajectoryWindow) + Send,
{
    fn publish(&mut self, window: TrajectoryWindow) {
        self(window)
    }
}

/// Forwards windows into a bounded channel, dropping them when the consumer lags
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<TrajectoryWindow>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<TrajectoryWindow>) -> Self {
        ChannelSink { sender }
    }

    /// Sink plus the receiving end of a channel holding up to `capacity` windows
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<TrajectoryWindow>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (ChannelSink::new(sender), receiver)
    }
}

impl TrajectorySink for ChannelSink {
    fn publish(&mut self, window: TrajectoryWindow) {
        match self.sender.try_send(window) {
            Ok(()) => {}
            Err(TrySendError::Full(window)) => {
                warn!("Output channel full, dropping window {}", window.sequence);
            }
            Err(TrySendError::Closed(window)) => {
                warn!("Output channel closed, dropping window {}", window.sequence);
            }
        }
    }
}
