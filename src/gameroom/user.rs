use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

/// Distinguishes successive connections of the same user id.
pub type Connection = u64;

static CONNECTIONS: AtomicU64 = AtomicU64::new(1);

/// The lobby's handle on one live connection.
/// Holds the sending side of the connection's outbox and its hangup signal.
#[derive(Debug)]
pub struct User {
    id: String,
    conn: Connection,
    outbox: UnboundedSender<String>,
    hangup: Option<oneshot::Sender<()>>,
}

/// The transport's side of a [`User`]: what the writer worker listens to.
#[derive(Debug)]
pub struct Line {
    pub conn: Connection,
    pub outbox: UnboundedReceiver<String>,
    pub hangup: oneshot::Receiver<()>,
}

impl User {
    /// Opens a new connection for `id`, returning the lobby handle and the transport line.
    pub fn connect(id: &str) -> (Self, Line) {
        let conn = CONNECTIONS.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = unbounded_channel();
        let (hangup_tx, hangup_rx) = oneshot::channel();
        let user = Self {
            id: id.to_string(),
            conn,
            outbox: tx,
            hangup: Some(hangup_tx),
        };
        let line = Line {
            conn,
            outbox: rx,
            hangup: hangup_rx,
        };
        (user, line)
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn conn(&self) -> Connection {
        self.conn
    }
    /// Queues a text frame. Returns false if the writer is gone.
    pub fn send(&self, text: &str) -> bool {
        self.outbox
            .send(text.to_string())
            .inspect_err(|_| log::debug!("[user {}#{}] outbox closed", self.id, self.conn))
            .is_ok()
    }
    /// Tells the writer worker to close the connection.
    pub fn hangup(mut self) {
        if let Some(signal) = self.hangup.take() {
            let _ = signal.send(());
        }
    }
}
