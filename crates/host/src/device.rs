use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use rally::swing::{ClassifierConfig, HARD_OFFSET, MEDIUM_OFFSET};
use rally::{
    EngineConfig, LocalCommand, MatchEngine, MatchPhase, PlayerProfile, Role, Session, Side,
    SwingEvent,
};

use crate::config::HostConfig;
use crate::events::{DeviceReport, FinishReason, HostEvent};
use crate::link::{Clock, Packet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Serve,
    Return { hit_ms: i64 },
}

#[derive(Debug, Clone, Copy)]
struct Plan {
    target: Target,
    at_ms: Option<i64>,
}

// Stands in for a player holding the phone: serves after a short pause and
// returns most balls somewhere inside the hit window.
pub struct Bot {
    rng: ChaCha8Rng,
    accuracy: f64,
    serve_delay_ms: i64,
    soft_max: f32,
    medium_max: f32,
    plan: Option<Plan>,
}

impl Bot {
    pub fn new(seed: u64, accuracy: f64, serve_delay_ms: i64, classifier: &ClassifierConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            accuracy: accuracy.clamp(0.0, 1.0),
            serve_delay_ms,
            soft_max: classifier.base_threshold + MEDIUM_OFFSET,
            medium_max: classifier.base_threshold + HARD_OFFSET,
            plan: None,
        }
    }

    // A swing fires on the first tick at or past its plan and carries the planned time.
    pub fn next_swing(&mut self, engine: &MatchEngine, now_ms: i64) -> Option<SwingEvent> {
        let state = engine.state();
        let local = engine.local();
        let target = match state.phase() {
            _ if state.is_paused() => None,
            MatchPhase::WaitingForServe if state.server() == local => Some(Target::Serve),
            MatchPhase::Rally => state
                .exchange()
                .filter(|exchange| exchange.receiver == local)
                .map(|exchange| Target::Return {
                    hit_ms: exchange.hit_ms,
                }),
            _ => None,
        };
        let Some(target) = target else {
            self.plan = None;
            return None;
        };

        let plan = match self.plan {
            Some(plan) if plan.target == target => plan,
            _ => {
                let at_ms = match target {
                    Target::Serve => Some(now_ms + self.serve_delay_ms),
                    Target::Return { .. } => {
                        let window = state.exchange()?.window;
                        self.rng
                            .gen_bool(self.accuracy)
                            .then(|| self.rng.gen_range(window.start_ms..=window.end_ms))
                    }
                };
                Plan { target, at_ms }
            }
        };

        match plan.at_ms {
            Some(at) if now_ms >= at => {
                self.plan = Some(Plan {
                    at_ms: None,
                    ..plan
                });
                Some(self.swing(at))
            }
            _ => {
                self.plan = Some(plan);
                None
            }
        }
    }

    fn swing(&mut self, at_ms: i64) -> SwingEvent {
        let force = match self.rng.gen_range(0..3) {
            0 => self.rng.gen_range(2.0..self.soft_max),
            1 => self.rng.gen_range(self.soft_max + 1.0..self.medium_max),
            _ => self.rng.gen_range(self.medium_max + 1.0..self.medium_max + 30.0),
        };
        SwingEvent::new(at_ms, force)
            .with_tilt(self.rng.gen_range(-12.0..12.0))
            .with_gyro(self.rng.gen_range(-10.0..10.0), self.rng.gen_range(-10.0..10.0))
    }
}

pub struct Device {
    side: Side,
    session: Session,
    bot: Bot,
    clock: Clock,
    tick: Duration,
    max_match_ms: i64,
    outgoing: Option<mpsc::UnboundedSender<Packet>>,
    incoming: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
    events: mpsc::UnboundedSender<HostEvent>,
    swings: u32,
}

enum Wake {
    Remote(Option<Vec<u8>>),
    Tick,
}

impl Device {
    pub fn new(
        role: Role,
        config: &HostConfig,
        clock: Clock,
        events: mpsc::UnboundedSender<HostEvent>,
    ) -> Self {
        let side = role.side();
        let engine = EngineConfig {
            role,
            settings: config.settings.clone(),
            seed: config.seed.wrapping_add(side.index() as u64),
            ..Default::default()
        };
        let bot = Bot::new(
            config.seed.wrapping_add(100 + side.index() as u64),
            config.accuracy,
            config.serve_delay_ms,
            &engine.classifier,
        );
        Self {
            side,
            session: Session::new(engine),
            bot,
            clock,
            tick: Duration::from_millis(config.tick_ms.max(1)),
            max_match_ms: config.max_match_ms,
            outgoing: None,
            incoming: None,
            events,
            swings: 0,
        }
    }

    pub fn connect(
        &mut self,
        outgoing: mpsc::UnboundedSender<Packet>,
        incoming: mpsc::UnboundedReceiver<Vec<u8>>,
    ) {
        self.outgoing = Some(outgoing);
        self.incoming = Some(incoming);
    }

    pub async fn run(mut self) {
        self.open();
        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let finish = loop {
            let wake = tokio::select! {
                payload = recv(&mut self.incoming) => Wake::Remote(payload),
                _ = ticker.tick() => Wake::Tick,
            };
            let now = self.clock.now_ms();
            match wake {
                Wake::Remote(Some(payload)) => self.session.push_remote(payload, now),
                Wake::Remote(None) => {
                    log::debug!("{} link closed", self.side);
                    self.incoming = None;
                    self.session.process();
                    self.flush(now);
                    break self.finish_reason(now).unwrap_or(FinishReason::PeerLeft);
                }
                Wake::Tick => {
                    // A planned swing may predate this tick, so it goes in ahead of the timers.
                    if let Some(swing) = self.bot.next_swing(self.session.engine(), now) {
                        self.swings += 1;
                        self.session.push_swing(swing);
                    }
                    self.session.push_tick(now);
                }
            }
            self.session.process();
            self.flush(now);

            if let Some(reason) = self.finish_reason(now) {
                if reason == FinishReason::TimedOut {
                    self.session.push_command(LocalCommand::Leave, now);
                    self.session.process();
                    self.flush(now);
                }
                break reason;
            }
        };

        log::info!("{} finished: {}", self.side, finish.as_str());
        let report = self.report(finish);
        let _ = self.events.send(HostEvent::Finished(report));
    }

    fn open(&mut self) {
        let now = self.clock.now_ms();
        let commands = [
            LocalCommand::Handshake,
            LocalCommand::Profile(PlayerProfile {
                name: format!("Bot {}", self.side),
                avatar: self.side.index() as i32,
                ring: -1,
            }),
            LocalCommand::Ready(true),
        ];
        for command in commands {
            self.session.push_command(command, now);
        }
        if self.session.engine().role().is_host() {
            self.session.push_command(LocalCommand::Start, now);
        }
        self.session.process();
        self.flush(now);
    }

    fn flush(&mut self, now: i64) {
        let outgoing = self.session.take_outgoing();
        if let Some(tx) = &self.outgoing {
            for payload in outgoing {
                if tx.send(Packet::new(payload)).is_err() {
                    log::debug!("{} dropped an outgoing message, link is gone", self.side);
                }
            }
        }
        let events: Vec<_> = self.session.drain_events().collect();
        for event in events {
            let _ = self.events.send(HostEvent::Match {
                side: self.side,
                at_ms: now,
                event,
            });
        }
        self.session.drain_dispositions().for_each(drop);
    }

    fn finish_reason(&self, now: i64) -> Option<FinishReason> {
        let engine = self.session.engine();
        if engine.state().phase() == MatchPhase::GameOver {
            Some(FinishReason::GameOver)
        } else if engine.peer().left {
            Some(FinishReason::PeerLeft)
        } else if now >= self.max_match_ms {
            Some(FinishReason::TimedOut)
        } else {
            None
        }
    }

    fn report(&self, finish: FinishReason) -> DeviceReport {
        let engine = self.session.engine();
        let state = engine.state();
        DeviceReport {
            side: self.side,
            role: engine.role(),
            phase: state.phase(),
            finish,
            scores: state.scores(),
            winner: state.winner(),
            rally_score: state.mode().rally().map(|rally| rally.score()),
            lives: state.lives(),
            longest_rally: state.longest_rally(),
            peak_tiers: engine.peak_tiers(),
            swings: self.swings,
            link: self.session.stats().clone(),
        }
    }
}

async fn recv(rx: &mut Option<mpsc::UnboundedReceiver<Vec<u8>>>) -> Option<Vec<u8>> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use rally::{GameMode, MatchSettings, SwingDisposition};

    use super::*;

    fn solo_engine() -> MatchEngine {
        let settings = MatchSettings::for_mode(GameMode::Solo);
        let mut engine = MatchEngine::new(EngineConfig::host(settings));
        engine.start_match(0);
        engine
    }

    #[test]
    fn bot_serves_after_delay_once() {
        let engine = solo_engine();
        let mut bot = Bot::new(1, 1.0, 600, &ClassifierConfig::default());
        assert!(bot.next_swing(&engine, 100).is_none());
        assert!(bot.next_swing(&engine, 699).is_none());
        let swing = bot.next_swing(&engine, 700).unwrap();
        assert_eq!(swing.timestamp_ms, 700);
        assert!(bot.next_swing(&engine, 800).is_none());
    }

    #[test]
    fn late_tick_keeps_planned_time() {
        let engine = solo_engine();
        let mut bot = Bot::new(1, 1.0, 600, &ClassifierConfig::default());
        assert!(bot.next_swing(&engine, 0).is_none());
        let swing = bot.next_swing(&engine, 1_000).unwrap();
        assert_eq!(swing.timestamp_ms, 600);
    }

    #[test]
    fn accurate_bot_returns_inside_window() {
        let mut engine = solo_engine();
        let mut bot = Bot::new(2, 1.0, 0, &ClassifierConfig::default());
        let serve = bot.next_swing(&engine, 0).unwrap();
        engine.handle_local_swing(&serve);
        let window = engine.state().exchange().unwrap().window;

        // Coarse ticks still land the swing where it was planned.
        let swing = (0..=window.end_ms + 500)
            .step_by(400)
            .find_map(|now| bot.next_swing(&engine, now))
            .expect("bot returned");
        let at = swing.timestamp_ms;
        assert!(at >= window.start_ms && at <= window.end_ms);
        assert!(matches!(
            engine.handle_local_swing(&swing),
            SwingDisposition::Returned { .. }
        ));
    }

    #[test]
    fn hopeless_bot_lets_ball_go() {
        let mut engine = solo_engine();
        let mut bot = Bot::new(3, 0.0, 0, &ClassifierConfig::default());
        let serve = bot.next_swing(&engine, 0).unwrap();
        engine.handle_local_swing(&serve);
        let end = engine.state().exchange().unwrap().window.end_ms;
        assert!((0..=end).all(|now| bot.next_swing(&engine, now).is_none()));
    }
}
