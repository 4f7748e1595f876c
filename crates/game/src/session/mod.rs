use std::collections::VecDeque;

use crate::engine::{EngineConfig, MatchEngine, SwingDisposition};
use crate::event::MatchEvent;
use crate::net::{LinkStats, Message, PlayerProfile};
use crate::settings::MatchSettings;
use crate::swing::SwingEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum LocalCommand {
    Handshake,
    Configure(MatchSettings),
    Start,
    Rematch,
    Pause,
    Resume,
    Ready(bool),
    Profile(PlayerProfile),
    Leave,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    LocalSwing(SwingEvent),
    Remote { payload: Vec<u8>, received_ms: i64 },
    Tick(i64),
    Command { command: LocalCommand, at_ms: i64 },
}

// Serializes local swings, remote payloads, ticks and commands into one
// ordered stream in front of the engine.
pub struct Session {
    engine: MatchEngine,
    inbox: VecDeque<SessionInput>,
    dispositions: VecDeque<SwingDisposition>,
    stats: LinkStats,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_engine(MatchEngine::new(config))
    }

    pub fn with_engine(engine: MatchEngine) -> Self {
        Self {
            engine,
            inbox: VecDeque::new(),
            dispositions: VecDeque::new(),
            stats: LinkStats::default(),
        }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn push(&mut self, input: SessionInput) {
        self.inbox.push_back(input);
    }

    pub fn push_swing(&mut self, event: SwingEvent) {
        self.push(SessionInput::LocalSwing(event));
    }

    pub fn push_remote(&mut self, payload: Vec<u8>, received_ms: i64) {
        self.push(SessionInput::Remote {
            payload,
            received_ms,
        });
    }

    pub fn push_tick(&mut self, now_ms: i64) {
        self.push(SessionInput::Tick(now_ms));
    }

    pub fn push_command(&mut self, command: LocalCommand, at_ms: i64) {
        self.push(SessionInput::Command { command, at_ms });
    }

    pub fn process(&mut self) -> usize {
        let mut processed = 0;
        while let Some(input) = self.inbox.pop_front() {
            self.apply(input);
            processed += 1;
        }
        processed
    }

    pub fn take_outgoing(&mut self) -> Vec<Vec<u8>> {
        let messages: Vec<Message> = self.engine.drain_outbox().collect();
        messages
            .into_iter()
            .map(|message| {
                let bytes = message.encode();
                self.stats.record_sent(bytes.len());
                bytes
            })
            .collect()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = MatchEvent> + '_ {
        self.engine.drain_events()
    }

    pub fn drain_dispositions(&mut self) -> impl Iterator<Item = SwingDisposition> + '_ {
        self.dispositions.drain(..)
    }

    fn apply(&mut self, input: SessionInput) {
        match input {
            SessionInput::LocalSwing(event) => {
                let disposition = self.engine.handle_local_swing(&event);
                self.dispositions.push_back(disposition);
            }
            SessionInput::Remote {
                payload,
                received_ms,
            } => match Message::decode(&payload) {
                Ok(message) => {
                    self.stats.record_received(payload.len());
                    self.engine.poll(received_ms);
                    self.engine.handle_remote(message, received_ms);
                }
                Err(err) => {
                    self.stats.record_dropped(payload.len());
                    log::warn!("dropping {} byte payload: {err}", payload.len());
                }
            },
            SessionInput::Tick(now_ms) => self.engine.poll(now_ms),
            SessionInput::Command { command, at_ms } => self.run_command(command, at_ms),
        }
    }

    fn run_command(&mut self, command: LocalCommand, at_ms: i64) {
        let engine = &mut self.engine;
        match command {
            LocalCommand::Handshake => engine.handshake(),
            LocalCommand::Configure(settings) => engine.configure(settings),
            LocalCommand::Start => engine.start_match(at_ms),
            LocalCommand::Rematch => engine.rematch(at_ms),
            LocalCommand::Pause => engine.pause(at_ms),
            LocalCommand::Resume => engine.resume(at_ms),
            LocalCommand::Ready(ready) => engine.set_ready(ready),
            LocalCommand::Profile(profile) => engine.send_profile(profile),
            LocalCommand::Leave => engine.leave(),
        }
    }
}
