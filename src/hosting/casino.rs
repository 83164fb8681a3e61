use crate::bunga::Bunga;
use crate::gameroom::*;
use futures::StreamExt;
use rand::seq::IndexedRandom;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Letters used for lobby codes. No i or l, which read alike.
const ALPHABET: &[u8] = b"abcdefghjkmnopqrstuvwxyz";
const CODE_LENGTH: usize = 4;

/// A live lobby as the registry knows it.
struct Entry {
    generation: u64,
    inbox: UnboundedSender<Event>,
}

/// Registry of open lobbies, keyed by name.
///
/// Lobbies are created on first join and remove themselves when their
/// session actor shuts down. Each lobby instance gets a generation so that
/// a late removal never evicts a newer lobby of the same name.
pub struct Casino {
    lobbies: RwLock<HashMap<String, Entry>>,
    count: AtomicU64,
    idle: Duration,
}

impl Default for Casino {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl Casino {
    pub fn new(idle: Duration) -> Self {
        Self {
            lobbies: RwLock::new(HashMap::new()),
            count: AtomicU64::new(1),
            idle,
        }
    }

    /// Returns the mailbox of lobby `name`, spawning the lobby if it is
    /// missing or has already shut down.
    pub async fn get_or_create(self: &Arc<Self>, name: &str) -> UnboundedSender<Event> {
        let mut lobbies = self.lobbies.write().await;
        if let Some(entry) = lobbies.get(name).filter(|e| !e.inbox.is_closed()) {
            return entry.inbox.clone();
        }
        let generation = self.count.fetch_add(1, Ordering::Relaxed);
        let (done, closed) = oneshot::channel();
        let inbox = Lobby::<Bunga>::spawn(name, self.idle, done);
        lobbies.insert(
            name.to_string(),
            Entry {
                generation,
                inbox: inbox.clone(),
            },
        );
        let casino = self.clone();
        let owned = name.to_string();
        tokio::spawn(async move {
            let _ = closed.await;
            casino.remove(&owned, generation).await;
        });
        log::info!("[casino] opened lobby {} ({})", name, generation);
        inbox
    }

    /// Forgets lobby `name` if it is still the given instance.
    pub async fn remove(&self, name: &str, generation: u64) -> bool {
        let mut lobbies = self.lobbies.write().await;
        match lobbies.get(name) {
            Some(entry) if entry.generation == generation => {
                lobbies.remove(name);
                log::info!("[casino] closed lobby {} ({})", name, generation);
                true
            }
            _ => false,
        }
    }

    pub async fn exists(&self, name: &str) -> bool {
        self.lobbies
            .read()
            .await
            .get(name)
            .is_some_and(|e| !e.inbox.is_closed())
    }

    /// A lobby code not currently in use.
    pub async fn fresh_name(&self) -> String {
        loop {
            let name = code();
            if !self.exists(&name).await {
                return name;
            }
        }
    }

    /// Connects `user` to lobby `name`, creating it on demand.
    /// Retries once if the lobby shut down between lookup and join.
    pub async fn join(
        self: &Arc<Self>,
        name: &str,
        user: &str,
    ) -> anyhow::Result<(UnboundedSender<Event>, Line)> {
        for _ in 0..2 {
            let inbox = self.get_or_create(name).await;
            let (handle, line) = User::connect(user);
            match inbox.send(Event::Join(handle)) {
                Ok(()) => return Ok((inbox, line)),
                Err(_) => log::warn!("[casino] lobby {} closed during join", name),
            }
        }
        Err(anyhow::anyhow!("lobby {} is unavailable", name))
    }

    /// Joins `user` to lobby `name` and spawns the WebSocket reader and
    /// writer workers for the connection.
    pub async fn bridge(
        self: &Arc<Self>,
        name: &str,
        user: &str,
        session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) -> anyhow::Result<()> {
        let (inbox, mut line) = self
            .join(name, user)
            .await
            .inspect(|_| log::info!("[bridge {}/{}] connected", name, user))?;
        let conn = line.conn;
        let tag = format!("{}/{}", name, user);
        let leave = {
            let user = user.to_string();
            move || Event::Leave {
                user: user.clone(),
                conn,
            }
        };

        let writer = inbox.clone();
        let hangup = leave.clone();
        let mut outgoing = session.clone();
        let label = tag.clone();
        actix_web::rt::spawn(async move {
            'sesh: loop {
                tokio::select! {
                    biased;
                    _ = &mut line.hangup => break 'sesh,
                    msg = line.outbox.recv() => match msg {
                        Some(json) => if outgoing.text(json).await.is_err() {
                            log::debug!("[bridge {}] write failed", label);
                            let _ = writer.send(hangup());
                            break 'sesh
                        },
                        None => break 'sesh,
                    },
                }
            }
            let _ = outgoing.close(None).await;
            log::debug!("[bridge {}] writer done", label);
        });

        let user = user.to_string();
        let mut incoming = session;
        actix_web::rt::spawn(async move {
            'sesh: loop {
                match stream.next().await {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        let text = text.to_string();
                        let user = user.clone();
                        if inbox.send(Event::Message { user, text }).is_err() {
                            break 'sesh;
                        }
                    }
                    Some(Ok(actix_ws::Message::Ping(bytes))) => {
                        if incoming.pong(&bytes).await.is_err() {
                            break 'sesh;
                        }
                    }
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                    _ => continue 'sesh,
                }
            }
            let _ = inbox.send(leave());
            log::info!("[bridge {}] disconnected", tag);
        });
        Ok(())
    }
}

fn code() -> String {
    ALPHABET
        .choose_multiple(&mut rand::rng(), CODE_LENGTH)
        .map(|b| *b as char)
        .collect()
}
