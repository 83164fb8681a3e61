use super::*;
use tokio::sync::mpsc::*;

/// Instructions from a lobby to the game it hosts.
#[derive(Debug, Clone)]
pub enum Signal<C> {
    /// A decoded command and the user id that sent it.
    Command(String, C),
    /// Publish current views again (a user reconnected).
    Refresh,
    /// Stop without publishing anything further.
    Quit,
}

/// Runs a Game in its own async task.
///
/// - Lobby forwards Signal::Command for every game-targeted message
/// - Runner applies it and, if accepted, publishes fresh views
/// - Each publication is tagged with the generation the lobby assigned
/// - Runner stops after publishing a finished game, on Quit, or when the lobby drops it
pub struct Runner<G: Game> {
    generation: u64,
    game: G,
    getter: UnboundedReceiver<Signal<G::Command>>,
    sender: UnboundedSender<(u64, Dispatch<G::View>)>,
}

impl<G: Game> Runner<G> {
    pub fn spawn(
        generation: u64,
        game: G,
        sender: UnboundedSender<(u64, Dispatch<G::View>)>,
    ) -> UnboundedSender<Signal<G::Command>> {
        let (tx, rx) = unbounded_channel();
        let runner = Self {
            generation,
            game,
            sender,
            getter: rx,
        };
        tokio::spawn(runner.run());
        tx
    }
    async fn run(mut self) {
        log::debug!("[game {}] started", self.generation);
        self.publish();
        loop {
            match self.getter.recv().await {
                Some(Signal::Command(player, command)) => {
                    if !self.game.apply(&player, command) {
                        log::trace!("[game {}] ignored move from {}", self.generation, player);
                        continue;
                    }
                    self.publish();
                    if self.game.is_finished() {
                        log::info!("[game {}] finished", self.generation);
                        break;
                    }
                }
                Some(Signal::Refresh) => self.publish(),
                Some(Signal::Quit) | None => {
                    log::debug!("[game {}] stopped", self.generation);
                    break;
                }
            }
        }
    }
    fn publish(&mut self) {
        for dispatch in self.game.project() {
            if self.sender.send((self.generation, dispatch)).is_err() {
                log::warn!("[game {}] lobby is gone", self.generation);
                break;
            }
        }
        self.game.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts to a target; every accepted step is broadcast.
    struct Counter {
        count: u32,
        target: u32,
    }

    impl Game for Counter {
        type Command = u32;
        type View = u32;
        fn create(players: &[String]) -> Self {
            Self {
                count: 0,
                target: players.len() as u32,
            }
        }
        fn decode(envelope: &Envelope) -> Result<u32, ProtocolError> {
            envelope.index("step").map(|n| n as u32)
        }
        fn apply(&mut self, _: &str, step: u32) -> bool {
            (step == 1).then(|| self.count += 1).is_some()
        }
        fn project(&self) -> Vec<Dispatch<u32>> {
            match self.is_finished() {
                true => vec![Dispatch::Final(self.count, Scores::new())],
                false => vec![Dispatch::Broadcast(self.count)],
            }
        }
        fn is_finished(&self) -> bool {
            self.count >= self.target
        }
    }

    fn players(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{}", i)).collect()
    }

    #[tokio::test]
    async fn publishes_on_start_and_accepted_moves() {
        let (tx, mut rx) = unbounded_channel();
        let inbox = Runner::spawn(7, Counter::create(&players(3)), tx);
        assert_eq!(rx.recv().await, Some((7, Dispatch::Broadcast(0))));
        inbox.send(Signal::Command("p0".into(), 2)).unwrap();
        inbox.send(Signal::Command("p0".into(), 1)).unwrap();
        assert_eq!(rx.recv().await, Some((7, Dispatch::Broadcast(1))));
    }

    #[tokio::test]
    async fn refresh_republishes() {
        let (tx, mut rx) = unbounded_channel();
        let inbox = Runner::spawn(1, Counter::create(&players(3)), tx);
        assert_eq!(rx.recv().await, Some((1, Dispatch::Broadcast(0))));
        inbox.send(Signal::Refresh).unwrap();
        assert_eq!(rx.recv().await, Some((1, Dispatch::Broadcast(0))));
    }

    #[tokio::test]
    async fn stops_after_final() {
        let (tx, mut rx) = unbounded_channel();
        let inbox = Runner::spawn(1, Counter::create(&players(1)), tx);
        assert_eq!(rx.recv().await, Some((1, Dispatch::Broadcast(0))));
        inbox.send(Signal::Command("p0".into(), 1)).unwrap();
        assert_eq!(rx.recv().await, Some((1, Dispatch::Final(1, Scores::new()))));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn stops_on_quit() {
        let (tx, mut rx) = unbounded_channel();
        let inbox = Runner::spawn(1, Counter::create(&players(2)), tx);
        assert_eq!(rx.recv().await, Some((1, Dispatch::Broadcast(0))));
        inbox.send(Signal::Quit).unwrap();
        assert_eq!(rx.recv().await, None);
    }
}
