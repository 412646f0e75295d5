use super::{ingress::Message, Config, Mailbox};
use crate::{
    log::{Journal, Log},
    Activity, Error, Reporter,
};
use commonware_runtime::{Handle, Metrics, Spawner};
use futures::{channel::mpsc, StreamExt};
use prometheus_client::metrics::{counter::Counter, gauge::Gauge};
use tracing::debug;

/// Owns a [Journal] and applies requests from every [Mailbox] one at a time.
pub struct Actor<E: Spawner + Metrics, R: Reporter<Activity = Activity>> {
    context: E,
    journal: Journal<R>,

    mailbox: mpsc::Receiver<Message>,

    appended: Counter,
    rejected: Counter,
    queries: Counter,
    entries: Gauge,
}

impl<E: Spawner + Metrics, R: Reporter<Activity = Activity>> Actor<E, R> {
    pub fn new(context: E, cfg: Config<R>) -> (Self, Mailbox) {
        // Initialize metrics
        let appended = Counter::default();
        let rejected = Counter::default();
        let queries = Counter::default();
        let entries = Gauge::default();
        context.register("appended", "messages appended to the log", appended.clone());
        context.register(
            "rejected",
            "messages that failed validation",
            rejected.clone(),
        );
        context.register("queries", "range and tip queries served", queries.clone());
        context.register("entries", "entries in the log", entries.clone());

        let (sender, mailbox) = mpsc::channel(cfg.mailbox_size);
        (
            Self {
                context,
                journal: Journal::new(cfg.reporter),

                mailbox,

                appended,
                rejected,
                queries,
                entries,
            },
            Mailbox::new(sender),
        )
    }

    pub fn start(self) -> Handle<()> {
        self.context.clone().spawn(move |_| self.run())
    }

    async fn run(mut self) {
        while let Some(message) = self.mailbox.next().await {
            match message {
                Message::Append { message, response } => {
                    let result = self.journal.append(message).await;
                    match result {
                        Ok(_) => {
                            self.appended.inc();
                            self.entries.set(self.journal.len() as i64);
                        }
                        Err(Error::Rejected) => {
                            self.rejected.inc();
                        }
                        Err(_) => {}
                    }
                    let _ = response.send(result);
                }
                Message::Actions {
                    from,
                    to,
                    max,
                    response,
                } => {
                    self.queries.inc();
                    let _ = response.send(self.journal.actions(from, to, max).await);
                }
                Message::Pending {
                    from,
                    max,
                    response,
                } => {
                    self.queries.inc();
                    let _ = response.send(self.journal.pending(from, max).await);
                }
                Message::Tip { response } => {
                    self.queries.inc();
                    let _ = response.send(self.journal.tip().await);
                }
            }
        }
        debug!(entries = self.journal.len(), "mailbox closed, shutting down");
    }
}
