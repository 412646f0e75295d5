use crate::{
    log::{Cursor, Entry, Log},
    Error,
};
use futures::{
    channel::{mpsc, oneshot},
    SinkExt,
};

/// Requests handled by the [super::Actor].
pub enum Message {
    Append {
        message: crate::Message,
        response: oneshot::Sender<Result<Cursor, Error>>,
    },
    Actions {
        from: Cursor,
        to: Cursor,
        max: usize,
        response: oneshot::Sender<Result<Vec<Entry>, Error>>,
    },
    Pending {
        from: Cursor,
        max: usize,
        response: oneshot::Sender<Result<Vec<Entry>, Error>>,
    },
    Tip {
        response: oneshot::Sender<Result<Cursor, Error>>,
    },
}

/// A cloneable handle to the [super::Actor].
///
/// Every clone feeds the same mailbox, so appends from all handles are applied in the
/// order the actor receives them.
#[derive(Clone)]
pub struct Mailbox {
    sender: mpsc::Sender<Message>,
}

impl Mailbox {
    pub(super) fn new(sender: mpsc::Sender<Message>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &mut self,
        message: Message,
        receiver: oneshot::Receiver<Result<T, Error>>,
    ) -> Result<T, Error> {
        self.sender
            .send(message)
            .await
            .map_err(|_| Error::MailboxClosed)?;
        receiver.await.map_err(|_| Error::MailboxClosed)?
    }
}

impl Log for Mailbox {
    async fn append(&mut self, message: crate::Message) -> Result<Cursor, Error> {
        let (response, receiver) = oneshot::channel();
        self.request(Message::Append { message, response }, receiver)
            .await
    }

    async fn actions(&mut self, from: Cursor, to: Cursor, max: usize) -> Result<Vec<Entry>, Error> {
        let (response, receiver) = oneshot::channel();
        self.request(
            Message::Actions {
                from,
                to,
                max,
                response,
            },
            receiver,
        )
        .await
    }

    async fn pending(&mut self, from: Cursor, max: usize) -> Result<Vec<Entry>, Error> {
        let (response, receiver) = oneshot::channel();
        self.request(
            Message::Pending {
                from,
                max,
                response,
            },
            receiver,
        )
        .await
    }

    async fn tip(&mut self) -> Result<Cursor, Error> {
        let (response, receiver) = oneshot::channel();
        self.request(Message::Tip { response }, receiver).await
    }
}
