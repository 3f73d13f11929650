use log::warn;
use tokio::sync::oneshot::Sender;
use uuid::Uuid;
use crate::error::BeamError;
use crate::search::Hypothesis;

/// Reply sent to one requester: the `K` hypotheses of its context row.
pub type SearchReply = Result<Vec<Hypothesis>, BeamError>;

/// A queued search request.
///
/// Pairs one `[1, ...]` context with the channel its hypotheses go back on.
/// The id only exists to follow a request through the logs.
#[derive(Debug)]
pub struct QueueItem<B> {
    id: Uuid,
    context: B,
    sender: Sender<SearchReply>,
}

impl<B> QueueItem<B> {
    pub fn new(context: B, sender: Sender<SearchReply>) -> Self {
        Self {
            id: Uuid::new_v4(),
            context,
            sender,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> &B {
        &self.context
    }

    /// Answers the requester. A requester that stopped waiting is only logged.
    pub fn reply(self, reply: SearchReply) {
        if self.sender.send(reply).is_err() {
            warn!("request {} was dropped before its result arrived", self.id);
        }
    }
}
