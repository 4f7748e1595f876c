use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::config::{EngineConfig, Role};
use super::state::{AutoMiss, Exchange, MatchPhase, MatchState};
use crate::event::MatchEvent;
use crate::grid::Grid;
use crate::mode::{
    CompetitiveState, MissContext, ModeEvent, ModeState, ShotContext, ShrinkContext,
};
use crate::net::{Message, PlayerProfile, StateSync, SwingAction, PROTOCOL_VERSION};
use crate::settings::{GameMode, MatchSettings};
use crate::swing::{ShotType, Side, SpinType, SwingClassifier, SwingEvent};
use crate::timing::{
    flight_time_ms, hit_window_ms, roll_fault, Fault, HitResult, HitWindow, Judgement,
    WindowParams,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotStarted,
    GameOver,
    Paused,
    BetweenPoints,
    Debounce,
    NotYourTurn,
    NoExchange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingDisposition {
    Served {
        shot: ShotType,
        spin: SpinType,
    },
    Returned {
        shot: ShotType,
        spin: SpinType,
        delta_ms: i64,
    },
    Missed(HitResult),
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Default)]
pub struct PeerInfo {
    pub version: Option<i32>,
    pub ready: Option<bool>,
    pub profile: Option<PlayerProfile>,
    pub left: bool,
}

pub struct MatchEngine {
    config: EngineConfig,
    classifier: SwingClassifier,
    settings: MatchSettings,
    state: MatchState,
    // Local fault rolls only; the peer learns their outcome from a Result.
    rng: ChaCha8Rng,
    last_swing_ms: Option<i64>,
    peak_tiers: [u8; 2],
    peer: PeerInfo,
    outbox: VecDeque<Message>,
    pending_events: VecDeque<MatchEvent>,
}

impl MatchEngine {
    pub fn new(config: EngineConfig) -> Self {
        let settings = config.settings.clone();
        let state = MatchState::new(settings.clone(), config.role.side(), config.log_capacity);
        Self {
            classifier: SwingClassifier::new(config.classifier.clone()),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            settings,
            state,
            last_swing_ms: None,
            peak_tiers: [0; 2],
            peer: PeerInfo::default(),
            outbox: VecDeque::new(),
            pending_events: VecDeque::new(),
            config,
        }
    }

    pub fn local(&self) -> Side {
        self.config.role.side()
    }

    pub fn role(&self) -> Role {
        self.config.role
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn peer(&self) -> &PeerInfo {
        &self.peer
    }

    // Highest tier each side has reached, kept across rematches.
    pub fn peak_tiers(&self) -> [u8; 2] {
        self.peak_tiers
    }

    pub fn drain_outbox(&mut self) -> impl Iterator<Item = Message> + '_ {
        self.outbox.drain(..)
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = MatchEvent> + '_ {
        self.pending_events.drain(..)
    }

    pub fn handshake(&mut self) {
        self.outbox.push_back(Message::Handshake {
            version: PROTOCOL_VERSION,
        });
    }

    pub fn configure(&mut self, settings: MatchSettings) {
        self.settings = settings;
        if self.settings.game_mode != GameMode::Solo {
            self.outbox
                .push_back(Message::Settings(self.settings.clone()));
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.outbox.push_back(if ready {
            Message::PlayerReady
        } else {
            Message::PlayerBusy
        });
    }

    pub fn send_profile(&mut self, profile: PlayerProfile) {
        self.outbox.push_back(Message::PlayerProfile(profile));
    }

    pub fn leave(&mut self) {
        self.state.paused = true;
        self.state.clear_exchange();
        self.outbox.push_back(Message::PeerLeft);
    }

    pub fn start_match(&mut self, now_ms: i64) {
        self.begin(now_ms, false);
        if self.is_networked() {
            if self.config.role.is_host() {
                self.outbox
                    .push_back(Message::Settings(self.settings.clone()));
            }
            self.outbox.push_back(Message::StartGame);
        }
    }

    pub fn rematch(&mut self, now_ms: i64) {
        self.begin(now_ms, true);
        if self.is_networked() {
            self.outbox.push_back(Message::Rematch);
        }
    }

    pub fn pause(&mut self, now_ms: i64) {
        if self.pause_locally(now_ms, false) {
            self.send_play(Message::Pause);
        }
    }

    pub fn resume(&mut self, now_ms: i64) {
        if self.resume_locally(now_ms, false) {
            self.send_play(Message::Resume);
        }
    }

    pub fn handle_local_swing(&mut self, event: &SwingEvent) -> SwingDisposition {
        let now = event.timestamp_ms;
        self.poll(now);

        if let Some(reason) = self.swing_blocker(now) {
            log::trace!("swing at {now} ignored: {reason:?}");
            return SwingDisposition::Ignored(reason);
        }

        let local = self.local();
        let (shot, spin) = self.classifier.classify(event);

        match self.state.phase {
            MatchPhase::WaitingForServe => {
                if self.state.server != local {
                    return SwingDisposition::Ignored(IgnoreReason::NotYourTurn);
                }
                self.last_swing_ms = Some(now);

                if let Some(fault) = self.roll_risk(shot) {
                    let result = HitResult::from(fault);
                    self.register_miss(local, result, now, true);
                    return SwingDisposition::Missed(result);
                }

                self.apply_serve(local, shot, spin, now, now);
                self.send_play(Message::ActionSwing(SwingAction {
                    timestamp_ms: now,
                    force: event.force,
                    shot,
                    source: local,
                    spin,
                }));
                self.send_sync();
                SwingDisposition::Served { shot, spin }
            }
            MatchPhase::Rally => {
                let Some(exchange) = self.state.exchange else {
                    return SwingDisposition::Ignored(IgnoreReason::NoExchange);
                };
                if exchange.receiver != local {
                    return SwingDisposition::Ignored(IgnoreReason::NotYourTurn);
                }
                self.last_swing_ms = Some(now);

                let delta_ms = exchange.window.delta_ms(now);
                let judgement = exchange.window.judge(now);
                log::debug!(
                    "{local} swing {shot} judged {judgement:?} (delta {delta_ms} ms, window {} ms)",
                    exchange.window.len_ms()
                );
                if judgement != Judgement::Hit {
                    let result = HitResult::from(judgement);
                    self.register_miss(local, result, now, true);
                    return SwingDisposition::Missed(result);
                }

                if let Some(fault) = self.roll_risk(shot) {
                    let result = HitResult::from(fault);
                    self.register_miss(local, result, now, true);
                    return SwingDisposition::Missed(result);
                }

                let returned = self.apply_hit(local, shot, spin, now, now, delta_ms);
                // Sent on a penalty end too, so the peer replays the same cell.
                self.send_play(Message::ActionSwing(SwingAction {
                    timestamp_ms: now,
                    force: event.force,
                    shot,
                    source: local,
                    spin,
                }));
                if !returned {
                    self.register_miss(local, HitResult::PenaltyEnd, now, true);
                    return SwingDisposition::Missed(HitResult::PenaltyEnd);
                }
                SwingDisposition::Returned {
                    shot,
                    spin,
                    delta_ms,
                }
            }
            MatchPhase::Idle | MatchPhase::PointScored | MatchPhase::GameOver => {
                SwingDisposition::Ignored(IgnoreReason::BetweenPoints)
            }
        }
    }

    pub fn handle_remote(&mut self, message: Message, now_ms: i64) -> bool {
        log::trace!("remote {} at {now_ms}", message.name());
        match message {
            Message::Handshake { version } => {
                self.peer.version = Some(version);
                let compatible = version == PROTOCOL_VERSION;
                if !compatible {
                    log::warn!("peer protocol {version}, ours {PROTOCOL_VERSION}");
                }
                self.emit(now_ms, MatchEvent::PeerVersion {
                    version,
                    compatible,
                });
                true
            }
            Message::Settings(settings) => {
                if self.state.phase.is_live() {
                    log::warn!("settings ignored during a live match");
                    return false;
                }
                self.settings = settings;
                self.emit(now_ms, MatchEvent::SettingsApplied);
                true
            }
            Message::StartGame => {
                self.begin(now_ms, false);
                true
            }
            Message::Rematch => {
                self.begin(now_ms, true);
                true
            }
            Message::ActionSwing(swing) => self.remote_swing(swing, now_ms),
            Message::Result { result, scoring } => self.remote_result(result, scoring, now_ms),
            Message::GameStateSync(sync) => self.apply_sync(&sync, now_ms),
            Message::Pause => self.pause_locally(now_ms, true),
            Message::Resume => self.resume_locally(now_ms, true),
            Message::PeerLeft => {
                self.peer.left = true;
                self.state.paused = true;
                self.state.clear_exchange();
                self.emit(now_ms, MatchEvent::PeerLeft);
                true
            }
            Message::PlayerReady => self.peer_ready(true, now_ms),
            Message::PlayerBusy => self.peer_ready(false, now_ms),
            Message::PlayerProfile(profile) => {
                self.emit(now_ms, MatchEvent::PeerProfile {
                    name: profile.name.clone(),
                    avatar: profile.avatar,
                    ring: profile.ring,
                });
                self.peer.profile = Some(profile);
                true
            }
        }
    }

    pub fn poll(&mut self, now_ms: i64) {
        if self.state.paused {
            return;
        }

        if let Some(auto) = self.state.auto_miss {
            if now_ms >= auto.deadline_ms {
                log::debug!("{} auto-miss at {now_ms}", auto.side);
                self.register_miss(auto.side, HitResult::MissLate, now_ms, true);
            }
        }

        if self.state.phase == MatchPhase::PointScored {
            if let Some(at) = self.state.resume_at_ms {
                if now_ms >= at {
                    self.state.resume_at_ms = None;
                    self.state.phase = MatchPhase::WaitingForServe;
                }
            }
        }
    }

    fn begin(&mut self, now_ms: i64, rematch: bool) {
        let mut state = MatchState::new(
            self.settings.clone(),
            self.local(),
            self.config.log_capacity,
        );
        state.phase = MatchPhase::WaitingForServe;
        self.state = state;
        self.last_swing_ms = None;
        log::info!(
            "{} {:?} match",
            if rematch { "rematch" } else { "starting" },
            self.settings.game_mode
        );
        self.emit(now_ms, MatchEvent::MatchStarted {
            mode: self.settings.game_mode,
            server: self.state.server,
            rematch,
        });
    }

    fn is_networked(&self) -> bool {
        self.state.mode.mode() != GameMode::Solo
    }

    fn send_play(&mut self, message: Message) {
        if self.is_networked() {
            self.outbox.push_back(message);
        }
    }

    fn swing_blocker(&self, now_ms: i64) -> Option<IgnoreReason> {
        match self.state.phase {
            MatchPhase::Idle => return Some(IgnoreReason::NotStarted),
            MatchPhase::GameOver => return Some(IgnoreReason::GameOver),
            MatchPhase::PointScored => return Some(IgnoreReason::BetweenPoints),
            MatchPhase::WaitingForServe | MatchPhase::Rally => {}
        }
        if self.state.paused {
            return Some(IgnoreReason::Paused);
        }
        match self.last_swing_ms {
            Some(last) if now_ms - last < self.config.timing.debounce_ms => {
                Some(IgnoreReason::Debounce)
            }
            _ => None,
        }
    }

    fn roll_risk(&mut self, shot: ShotType) -> Option<Fault> {
        if !self.state.mode.has_risk() {
            return None;
        }
        let tuning = self.state.settings.effective_tuning().get(shot);
        roll_fault(tuning, &mut self.rng)
    }

    fn receiver_after(&self, hitter: Side) -> Side {
        match &self.state.mode {
            ModeState::Solo(solo) => solo.local(),
            ModeState::Competitive(_) | ModeState::Cooperative(_) => hitter.other(),
        }
    }

    // Mode draws are keyed on the stroke both devices see, so they pick the same cells.
    fn stroke_rng(&self, hitter: Side, struck_ms: i64) -> ChaCha8Rng {
        let salt = if self.is_networked() {
            0
        } else {
            self.config.seed
        };
        let key = (struck_ms as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ ((self.state.rally_length as u64) << 40)
            ^ hitter.index() as u64;
        ChaCha8Rng::seed_from_u64(key ^ salt)
    }

    fn shot_context(
        &self,
        hitter: Side,
        shot: ShotType,
        spin: SpinType,
        struck_ms: i64,
    ) -> ShotContext {
        let stroke = self.state.rally_length + 1;
        let is_leader = match self.state.mode.mode() {
            GameMode::Cooperative => hitter == self.state.server,
            GameMode::Solo => stroke % 2 == 1,
            GameMode::Competitive => false,
        };
        ShotContext {
            hitter,
            shot,
            spin,
            at_ms: struck_ms,
            is_leader,
            bonuses: self.state.settings.bonuses,
            base_window_ms: self.state.settings.base_window_ms(),
            overuse_bonus_ms: self.config.timing.overuse_bonus_ms,
        }
    }

    // `struck_ms` is the hitter's own timestamp; `at_ms` is when this device learned of it.
    fn apply_serve(
        &mut self,
        hitter: Side,
        shot: ShotType,
        spin: SpinType,
        at_ms: i64,
        struck_ms: i64,
    ) {
        let ctx = self.shot_context(hitter, shot, spin, struck_ms);
        let mut rng = self.stroke_rng(hitter, struck_ms);
        let transition = self.state.mode.on_serve(&ctx, &mut rng);
        self.state.mode = transition.state;
        self.emit_mode_events(at_ms, transition.events);

        self.state.phase = MatchPhase::Rally;
        self.state.resume_at_ms = None;
        self.state.rally_length = 1;
        self.state.last_shot = Some(shot);
        self.schedule(hitter, shot, at_ms, true);
        self.emit(at_ms, MatchEvent::Served {
            side: hitter,
            shot,
            spin,
            points: transition.points,
        });
    }

    // Returns false when the hit ended the rally instead of returning the ball.
    // The hitter's device then registers the miss and reports it with a Result.
    fn apply_hit(
        &mut self,
        hitter: Side,
        shot: ShotType,
        spin: SpinType,
        at_ms: i64,
        struck_ms: i64,
        delta_ms: i64,
    ) -> bool {
        let ctx = self.shot_context(hitter, shot, spin, struck_ms);
        let mut rng = self.stroke_rng(hitter, struck_ms);
        let transition = self.state.mode.on_hit(&ctx, &mut rng);
        self.state.mode = transition.state;
        self.emit_mode_events(at_ms, transition.events);
        self.record_peaks();

        if transition.end_rally {
            self.state.clear_exchange();
            return false;
        }

        self.state.rally_length += 1;
        self.state.longest_rally = self.state.longest_rally.max(self.state.rally_length);
        self.state.last_shot = Some(shot);
        self.schedule(hitter, shot, at_ms, false);
        self.emit(at_ms, MatchEvent::Returned {
            side: hitter,
            shot,
            spin,
            delta_ms,
            points: transition.points,
            rally_length: self.state.rally_length,
        });
        true
    }

    fn schedule(&mut self, hitter: Side, shot: ShotType, at_ms: i64, is_serve: bool) {
        let receiver = self.receiver_after(hitter);
        let settings = &self.state.settings;
        let timing = &self.config.timing;

        let mode_shrink_ms = if is_serve {
            0
        } else {
            self.state.mode.hit_window_shrink_ms(&ShrinkContext {
                rally_length: self.state.rally_length,
                rally_shrink_enabled: settings.rally_shrink_enabled,
            })
        };
        let window_ms = hit_window_ms(timing, &WindowParams {
            base_window_ms: settings.base_window_ms(),
            mode_shrink_ms,
            shot_shrink_pct: settings.effective_tuning().get(shot).shrink_pct,
            bonus_ms: self.state.mode.window_bonus_ms(receiver),
            serve_return: is_serve,
        });
        let flight_ms = flight_time_ms(settings.flight_time_ms, shot, is_serve);
        let window = HitWindow::position(timing, at_ms, at_ms + flight_ms, window_ms);

        self.state.exchange = Some(Exchange {
            hitter,
            receiver,
            shot,
            is_serve,
            hit_ms: at_ms,
            flight_ms,
            window,
        });
        self.state.auto_miss = (receiver == self.local()).then_some(AutoMiss {
            side: receiver,
            deadline_ms: window.end_ms + timing.auto_miss_buffer_ms,
        });
    }

    fn register_miss(&mut self, missed_by: Side, result: HitResult, now_ms: i64, report: bool) {
        self.state.clear_exchange();
        self.emit(now_ms, MatchEvent::Missed {
            side: missed_by,
            result,
        });

        let outcome = self.state.mode.on_miss(&MissContext {
            missed_by,
            server: self.state.server,
            scores: self.state.scores,
            result,
        });
        self.state.mode = outcome.state;
        self.emit_mode_events(now_ms, outcome.events);

        if let Some(scorer) = outcome.point_to {
            self.state.scores[scorer.index()] += 1;
        }
        self.state.longest_rally = self.state.longest_rally.max(self.state.rally_length);
        self.state.rally_length = 0;
        self.state.server = outcome.next_server;
        log::info!("{}", outcome.message);

        self.emit(now_ms, MatchEvent::PointScored {
            scorer: outcome.point_to,
            scores: self.state.scores,
            next_server: outcome.next_server,
            message: outcome.message.clone(),
        });

        if report {
            self.send_play(Message::Result {
                result,
                scoring: outcome.point_to,
            });
        }

        if outcome.game_over {
            self.finish(outcome.winner, outcome.message, now_ms);
        } else {
            self.state.phase = MatchPhase::PointScored;
            self.state.resume_at_ms = Some(now_ms + self.config.timing.point_pause_ms);
        }
        self.send_sync();
    }

    fn finish(&mut self, winner: Option<Side>, message: String, now_ms: i64) {
        self.state.phase = MatchPhase::GameOver;
        self.state.winner = winner;
        self.state.resume_at_ms = None;
        self.state.clear_exchange();
        log::info!("game over: {message}");
        self.emit(now_ms, MatchEvent::GameOver { winner, message });
    }

    fn remote_swing(&mut self, swing: SwingAction, now_ms: i64) -> bool {
        let source = swing.source;
        if source == self.local() {
            log::warn!("dropping echoed swing from {source}");
            return false;
        }
        if self.state.paused {
            return false;
        }

        match self.state.phase {
            MatchPhase::WaitingForServe | MatchPhase::PointScored
                if source == self.state.server =>
            {
                self.apply_serve(source, swing.shot, swing.spin, now_ms, swing.timestamp_ms);
                self.send_sync();
                true
            }
            MatchPhase::Rally
                if self
                    .state
                    .exchange
                    .is_some_and(|exchange| exchange.receiver == source) =>
            {
                let (shot, spin) = (swing.shot, swing.spin);
                if !self.apply_hit(source, shot, spin, now_ms, swing.timestamp_ms, 0) {
                    log::debug!("{source} ended the rally on a penalty cell, awaiting its result");
                }
                true
            }
            phase => {
                log::trace!("remote swing from {source} ignored in {phase:?}");
                false
            }
        }
    }

    fn remote_result(&mut self, result: HitResult, scoring: Option<Side>, now_ms: i64) -> bool {
        if !self.state.phase.is_live() {
            return false;
        }
        let missed_by = self.local().other();
        self.register_miss(missed_by, result, now_ms, false);
        if self.state.mode.mode() == GameMode::Competitive && scoring != Some(self.local()) {
            log::warn!("peer reported scorer {scoring:?} for its own {result:?}");
        }
        true
    }

    fn send_sync(&mut self) {
        if !self.config.role.is_host() || !self.is_networked() {
            return;
        }
        let sync = self.build_sync();
        self.outbox.push_back(Message::GameStateSync(sync));
    }

    pub fn build_sync(&self) -> StateSync {
        let state = &self.state;
        let mut sync = StateSync::new(
            [state.scores[0] as i32, state.scores[1] as i32],
            state.phase,
            state.server,
        );
        sync.mode = state.mode.mode();
        sync.longest_rally = state.longest_rally as i32;
        if let Some(rally) = state.mode.rally() {
            sync.rally_score = rally.score() as i32;
            sync.lives = rally.lives() as i32;
            for side in Side::ALL {
                let grid = &rally.side(side).grid;
                let i = side.index();
                sync.grids[i] = grid.marked_bits();
                sync.lines[i] = grid.completed_lines().bits();
                sync.tiers[i] = grid.tier_bits();
                sync.highest_tiers[i] = rally.highest_tier(side);
            }
        }
        sync
    }

    fn apply_sync(&mut self, sync: &StateSync, now_ms: i64) -> bool {
        if self.config.role.is_host() {
            log::warn!("host ignores state sync");
            return false;
        }
        if sync.mode != self.state.mode.mode() {
            log::warn!(
                "sync for {:?} while playing {:?}",
                sync.mode,
                self.state.mode.mode()
            );
            return false;
        }

        let state = &mut self.state;
        state.scores = [sync.scores[0].max(0) as u32, sync.scores[1].max(0) as u32];
        state.server = sync.server;
        state.longest_rally = state.longest_rally.max(sync.longest_rally.max(0) as u32);

        if let Some(rally) = state.mode.rally_mut() {
            let grids =
                [0, 1].map(|i| Grid::from_bits(sync.grids[i], sync.tiers[i], sync.lines[i]));
            rally.apply_sync(
                sync.rally_score.max(0) as u32,
                sync.lives.max(0) as u32,
                grids,
                sync.highest_tiers,
            );
        }

        // Never enter a rally from a sync; the exchange comes from the swing itself.
        match sync.phase {
            MatchPhase::GameOver if state.phase != MatchPhase::GameOver => {
                let winner = match state.mode {
                    ModeState::Competitive(_) => CompetitiveState::winner(state.scores),
                    ModeState::Cooperative(_) | ModeState::Solo(_) => None,
                };
                self.finish(winner, "Game over".to_string(), now_ms);
            }
            MatchPhase::Rally | MatchPhase::GameOver => {}
            phase if state.phase != MatchPhase::Rally => {
                if phase == MatchPhase::PointScored && state.phase != MatchPhase::PointScored {
                    state.resume_at_ms = Some(now_ms + self.config.timing.point_pause_ms);
                }
                state.phase = phase;
            }
            _ => {}
        }

        self.record_peaks();
        self.emit(now_ms, MatchEvent::StateSynced);
        true
    }

    fn pause_locally(&mut self, now_ms: i64, by_peer: bool) -> bool {
        if self.state.paused || !self.state.phase.is_live() {
            return false;
        }
        self.state.paused = true;
        self.state.auto_miss = None;
        self.emit(now_ms, MatchEvent::Paused { by_peer });
        true
    }

    // Resuming restarts the point from a serve by the current server.
    fn resume_locally(&mut self, now_ms: i64, by_peer: bool) -> bool {
        if !self.state.paused || self.peer.left {
            return false;
        }
        self.state.paused = false;
        if self.state.phase.is_live() {
            self.state.clear_exchange();
            self.state.rally_length = 0;
            self.state.resume_at_ms = None;
            self.state.phase = MatchPhase::WaitingForServe;
        }
        self.emit(now_ms, MatchEvent::Resumed { by_peer });
        true
    }

    fn peer_ready(&mut self, ready: bool, now_ms: i64) -> bool {
        self.peer.ready = Some(ready);
        self.emit(now_ms, MatchEvent::PeerReady(ready));
        true
    }

    fn record_peaks(&mut self) {
        if let Some(rally) = self.state.mode.rally() {
            for side in Side::ALL {
                let peak = &mut self.peak_tiers[side.index()];
                *peak = (*peak).max(rally.highest_tier(side));
            }
        }
    }

    fn emit_mode_events(&mut self, at_ms: i64, events: Vec<ModeEvent>) {
        for event in events {
            if let ModeEvent::TierReached { side, tier } = event {
                log::info!("{side} reached tier {tier}");
            }
            self.emit(at_ms, MatchEvent::Mode(event));
        }
    }

    fn emit(&mut self, at_ms: i64, event: MatchEvent) {
        self.state.log.push(at_ms, event.clone());
        self.pending_events.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::{CellEffects, PenaltyKind};
    use crate::settings::BonusToggles;

    fn soft_flat(at: i64) -> SwingEvent {
        SwingEvent::new(at, 10.0)
    }

    fn deliver(from: &mut MatchEngine, to: &mut MatchEngine, now: i64) -> Vec<Message> {
        let sent: Vec<_> = from.drain_outbox().collect();
        for message in &sent {
            to.handle_remote(message.clone(), now);
        }
        sent
    }

    fn rally_ending_cell(engine: &mut MatchEngine, side: Side, cell: usize) {
        let rally = engine.state.mode.rally_mut().unwrap();
        rally.side_mut(side).effects =
            CellEffects::default().with_penalty(cell, PenaltyKind::EndRally);
    }

    #[test]
    fn idle_engine_ignores_swings() {
        let mut engine = MatchEngine::new(EngineConfig::default());
        assert_eq!(
            engine.handle_local_swing(&soft_flat(0)),
            SwingDisposition::Ignored(IgnoreReason::NotStarted)
        );
        assert_eq!(engine.drain_outbox().count(), 0);
    }

    #[test]
    fn handshake_records_peer_version() {
        let mut engine = MatchEngine::new(EngineConfig::guest());
        engine.handle_remote(Message::Handshake { version: 2 }, 5);
        assert_eq!(engine.peer().version, Some(2));
        let events: Vec<_> = engine.drain_events().collect();
        assert_eq!(events, vec![MatchEvent::PeerVersion {
            version: 2,
            compatible: false,
        }]);

        engine.handshake();
        assert_eq!(engine.drain_outbox().collect::<Vec<_>>(), vec![Message::Handshake {
            version: PROTOCOL_VERSION
        }]);
    }

    #[test]
    fn settings_ignored_mid_match() {
        let mut engine = MatchEngine::new(EngineConfig::guest());
        let coop = MatchSettings::for_mode(GameMode::Cooperative);
        assert!(engine.handle_remote(Message::Settings(coop.clone()), 0));
        assert!(engine.handle_remote(Message::StartGame, 0));
        assert_eq!(engine.state().mode().mode(), GameMode::Cooperative);

        assert!(!engine.handle_remote(Message::Settings(MatchSettings::default()), 10));
        assert_eq!(engine.settings(), &coop);
    }

    #[test]
    fn host_serve_sends_swing_then_sync() {
        let mut engine = MatchEngine::new(EngineConfig::default());
        engine.start_match(0);
        let opening: Vec<_> = engine.drain_outbox().collect();
        assert!(matches!(
            opening.as_slice(),
            [Message::Settings(_), Message::StartGame]
        ));

        let disposition = engine.handle_local_swing(&soft_flat(1_000));
        assert!(matches!(disposition, SwingDisposition::Served { .. }));
        let sent: Vec<_> = engine.drain_outbox().collect();
        assert!(matches!(sent[0], Message::ActionSwing(SwingAction { source: Side::One, .. })));
        let Message::GameStateSync(sync) = &sent[1] else {
            panic!("expected sync, got {:?}", sent[1]);
        };
        assert_eq!(sync.phase, MatchPhase::Rally);

        // The receiver's device owns the auto-miss.
        assert!(engine.state().auto_miss().is_none());
        let exchange = engine.state().exchange().unwrap();
        assert_eq!(exchange.receiver, Side::Two);
        assert!(exchange.is_serve);
    }

    #[test]
    fn echoed_swing_is_dropped() {
        let mut engine = MatchEngine::new(EngineConfig::default());
        engine.start_match(0);
        let echo = Message::ActionSwing(SwingAction {
            timestamp_ms: 0,
            force: 10.0,
            shot: ShotType::from_code(0).unwrap(),
            source: Side::One,
            spin: SpinType::None,
        });
        assert!(!engine.handle_remote(echo, 100));
        assert_eq!(engine.state().phase(), MatchPhase::WaitingForServe);
    }

    #[test]
    fn host_ignores_state_sync() {
        let mut engine = MatchEngine::new(EngineConfig::default());
        engine.start_match(0);
        let sync = StateSync::new([5, 0], MatchPhase::PointScored, Side::Two);
        assert!(!engine.handle_remote(Message::GameStateSync(sync), 10));
        assert_eq!(engine.state().scores(), [0, 0]);
    }

    #[test]
    fn guest_sync_never_enters_rally() {
        let mut engine = MatchEngine::new(EngineConfig::guest());
        engine.handle_remote(Message::StartGame, 0);
        let sync = StateSync::new([3, 4], MatchPhase::Rally, Side::Two);
        assert!(engine.handle_remote(Message::GameStateSync(sync), 10));
        assert_eq!(engine.state().scores(), [3, 4]);
        assert_eq!(engine.state().server(), Side::Two);
        assert_eq!(engine.state().phase(), MatchPhase::WaitingForServe);

        let sync = StateSync::new([11, 4], MatchPhase::GameOver, Side::Two);
        engine.handle_remote(Message::GameStateSync(sync), 20);
        assert_eq!(engine.state().phase(), MatchPhase::GameOver);
        assert_eq!(engine.state().winner(), Some(Side::One));
    }

    #[test]
    fn paused_engine_ignores_swings_and_timers() {
        let mut engine = MatchEngine::new(EngineConfig::guest());
        engine.handle_remote(Message::StartGame, 0);
        let serve = Message::ActionSwing(SwingAction {
            timestamp_ms: 0,
            force: 10.0,
            shot: ShotType::from_code(0).unwrap(),
            source: Side::One,
            spin: SpinType::None,
        });
        assert!(engine.handle_remote(serve, 1_000));
        let deadline = engine.state().auto_miss().unwrap().deadline_ms;

        engine.pause(1_100);
        assert_eq!(engine.drain_outbox().last(), Some(Message::Pause));
        assert_eq!(
            engine.handle_local_swing(&soft_flat(1_500)),
            SwingDisposition::Ignored(IgnoreReason::Paused)
        );
        engine.poll(deadline + 1);
        assert_eq!(engine.state().scores(), [0, 0]);
    }

    #[test]
    fn peer_leaving_blocks_resume() {
        let mut engine = MatchEngine::new(EngineConfig::default());
        engine.start_match(0);
        engine.handle_remote(Message::PeerLeft, 10);
        assert!(engine.peer().left);
        assert!(engine.state().is_paused());
        assert!(!engine.handle_remote(Message::Resume, 20));
        assert!(engine.state().is_paused());
    }

    #[test]
    fn solo_never_sends() {
        let settings = MatchSettings::for_mode(GameMode::Solo);
        let mut engine = MatchEngine::new(EngineConfig::host(settings));
        engine.configure(MatchSettings::for_mode(GameMode::Solo));
        engine.start_match(0);
        engine.handle_local_swing(&soft_flat(1_000));
        engine.pause(1_200);
        assert_eq!(engine.drain_outbox().count(), 0);
        assert_eq!(engine.state().exchange().unwrap().receiver, Side::One);
    }

    #[test]
    fn penalty_end_reports_swing_then_result() {
        let settings = MatchSettings {
            bonuses: BonusToggles {
                grid_effects: true,
                ..BonusToggles::NONE
            },
            ..MatchSettings::for_mode(GameMode::Cooperative)
        };
        let mut host = MatchEngine::new(EngineConfig::host(settings));
        let mut guest = MatchEngine::new(EngineConfig::guest());
        host.start_match(0);
        deliver(&mut host, &mut guest, 0);
        for engine in [&mut host, &mut guest] {
            rally_ending_cell(engine, Side::One, 0);
        }

        host.handle_local_swing(&soft_flat(1_000));
        deliver(&mut host, &mut guest, 1_000);
        let arrival = guest.state().exchange().unwrap().window.arrival_ms;
        assert!(matches!(
            guest.handle_local_swing(&soft_flat(arrival)),
            SwingDisposition::Returned { .. }
        ));
        deliver(&mut guest, &mut host, arrival);

        let arrival = host.state().exchange().unwrap().window.arrival_ms;
        assert_eq!(
            host.handle_local_swing(&soft_flat(arrival)),
            SwingDisposition::Missed(HitResult::PenaltyEnd)
        );
        let sent = deliver(&mut host, &mut guest, arrival);
        assert!(matches!(
            sent.as_slice(),
            [
                Message::ActionSwing(SwingAction { source: Side::One, .. }),
                Message::Result {
                    result: HitResult::PenaltyEnd,
                    ..
                },
                Message::GameStateSync(_),
            ]
        ));

        for engine in [&host, &guest] {
            let state = engine.state();
            assert_eq!(state.phase(), MatchPhase::PointScored);
            assert_eq!(state.lives(), Some(2));
            let rally = state.mode().rally().unwrap();
            assert!(rally.side(Side::One).effects.penalties().all(|p| p.triggered));
            assert!(!rally.side(Side::One).grid.is_marked(0));
        }
        assert!(guest.state().exchange().is_none());
    }
}
