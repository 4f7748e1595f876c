use crate::engine::MatchPhase;
use crate::settings::{BonusToggles, GameMode, MatchSettings, SwingTuning};
use crate::swing::{ShotType, Side, SpinType};
use crate::timing::HitResult;

use super::wire::{Reader, Writer};

pub const PROTOCOL_VERSION: i32 = 3;
pub const NO_RING: i32 = -1;
const NO_SCORER: u8 = 0xFF;

pub mod tag {
    pub const HANDSHAKE: u8 = 0x01;
    pub const SETTINGS: u8 = 0x02;
    pub const START_GAME: u8 = 0x03;
    pub const ACTION_SWING: u8 = 0x04;
    pub const RESULT: u8 = 0x05;
    pub const GAME_STATE_SYNC: u8 = 0x06;
    pub const PAUSE: u8 = 0x07;
    pub const RESUME: u8 = 0x08;
    pub const PEER_LEFT: u8 = 0x09;
    pub const REMATCH: u8 = 0x0A;
    pub const PLAYER_READY: u8 = 0x0B;
    pub const PLAYER_BUSY: u8 = 0x0C;
    pub const PLAYER_PROFILE: u8 = 0x0D;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,
    #[error("unknown message tag 0x{0:02X}")]
    UnknownTag(u8),
    #[error("truncated {field}: needed {needed} bytes, {remaining} left")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: i64 },
    #[error("negative length for {field}: {len}")]
    NegativeLength { field: &'static str, len: i32 },
    #[error("name is not valid utf-8")]
    InvalidUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingAction {
    pub timestamp_ms: i64,
    pub force: f32,
    pub shot: ShotType,
    pub source: Side,
    pub spin: SpinType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSync {
    pub scores: [i32; 2],
    pub phase: MatchPhase,
    pub server: Side,
    pub mode: GameMode,
    pub rally_score: i32,
    pub lives: i32,
    pub grids: [u16; 2],
    pub lines: [u8; 2],
    pub longest_rally: i32,
    pub tiers: [u32; 2],
    pub highest_tiers: [u8; 2],
}

impl StateSync {
    pub fn new(scores: [i32; 2], phase: MatchPhase, server: Side) -> Self {
        Self {
            scores,
            phase,
            server,
            mode: GameMode::Competitive,
            rally_score: 0,
            lives: 0,
            grids: [0; 2],
            lines: [0; 2],
            longest_rally: 0,
            tiers: [0; 2],
            highest_tiers: [0; 2],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub name: String,
    pub avatar: i32,
    pub ring: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Handshake { version: i32 },
    Settings(MatchSettings),
    StartGame,
    ActionSwing(SwingAction),
    Result {
        result: HitResult,
        scoring: Option<Side>,
    },
    GameStateSync(StateSync),
    Pause,
    Resume,
    PeerLeft,
    Rematch,
    PlayerReady,
    PlayerBusy,
    PlayerProfile(PlayerProfile),
}

impl Message {
    pub fn tag(&self) -> u8 {
        match self {
            Message::Handshake { .. } => tag::HANDSHAKE,
            Message::Settings(_) => tag::SETTINGS,
            Message::StartGame => tag::START_GAME,
            Message::ActionSwing(_) => tag::ACTION_SWING,
            Message::Result { .. } => tag::RESULT,
            Message::GameStateSync(_) => tag::GAME_STATE_SYNC,
            Message::Pause => tag::PAUSE,
            Message::Resume => tag::RESUME,
            Message::PeerLeft => tag::PEER_LEFT,
            Message::Rematch => tag::REMATCH,
            Message::PlayerReady => tag::PLAYER_READY,
            Message::PlayerBusy => tag::PLAYER_BUSY,
            Message::PlayerProfile(_) => tag::PLAYER_PROFILE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Message::Handshake { .. } => "Handshake",
            Message::Settings(_) => "Settings",
            Message::StartGame => "StartGame",
            Message::ActionSwing(_) => "ActionSwing",
            Message::Result { .. } => "Result",
            Message::GameStateSync(_) => "GameStateSync",
            Message::Pause => "Pause",
            Message::Resume => "Resume",
            Message::PeerLeft => "PeerLeft",
            Message::Rematch => "Rematch",
            Message::PlayerReady => "PlayerReady",
            Message::PlayerBusy => "PlayerBusy",
            Message::PlayerProfile(_) => "PlayerProfile",
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_tag(self.tag());
        match self {
            Message::Handshake { version } => {
                w.i32(*version);
            }
            Message::Settings(settings) => encode_settings(&mut w, settings),
            Message::ActionSwing(swing) => {
                w.i64(swing.timestamp_ms)
                    .f32(swing.force)
                    .i32(swing.shot.code())
                    .i32(swing.source.index() as i32)
                    .i32(swing.spin.code());
            }
            Message::Result { result, scoring } => {
                w.u8(result.code())
                    .u8(scoring.map_or(NO_SCORER, |s| s.index() as u8));
            }
            Message::GameStateSync(sync) => encode_sync(&mut w, sync),
            Message::PlayerProfile(profile) => {
                let name = profile.name.as_bytes();
                w.i32(name.len() as i32)
                    .bytes(name)
                    .i32(profile.avatar)
                    .i32(profile.ring);
            }
            Message::StartGame
            | Message::Pause
            | Message::Resume
            | Message::PeerLeft
            | Message::Rematch
            | Message::PlayerReady
            | Message::PlayerBusy => {}
        }
        w.finish()
    }

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let (&tag, payload) = data.split_first().ok_or(DecodeError::Empty)?;
        let mut r = Reader::new(payload);
        let message = match tag {
            tag::HANDSHAKE => Message::Handshake {
                version: r.i32("version")?,
            },
            tag::SETTINGS => Message::Settings(decode_settings(&mut r)?),
            tag::START_GAME => Message::StartGame,
            tag::ACTION_SWING => Message::ActionSwing(decode_swing(&mut r)?),
            tag::RESULT => {
                let code = r.u8("hit_result")?;
                let result = HitResult::from_code(code).ok_or(DecodeError::InvalidValue {
                    field: "hit_result",
                    value: code as i64,
                })?;
                let scoring = match r.u8("scoring_player")? {
                    NO_SCORER => None,
                    code => Some(side(code as i32, "scoring_player")?),
                };
                Message::Result { result, scoring }
            }
            tag::GAME_STATE_SYNC => Message::GameStateSync(decode_sync(&mut r)?),
            tag::PAUSE => Message::Pause,
            tag::RESUME => Message::Resume,
            tag::PEER_LEFT => Message::PeerLeft,
            tag::REMATCH => Message::Rematch,
            tag::PLAYER_READY => Message::PlayerReady,
            tag::PLAYER_BUSY => Message::PlayerBusy,
            tag::PLAYER_PROFILE => {
                let len = r.length("name_len")?;
                let name = std::str::from_utf8(r.bytes(len, "name")?)
                    .map_err(|_| DecodeError::InvalidUtf8)?
                    .to_string();
                let avatar = r.i32("avatar")?;
                let ring = r.opt(|r| r.i32("ring"))?.unwrap_or(NO_RING);
                Message::PlayerProfile(PlayerProfile { name, avatar, ring })
            }
            other => return Err(DecodeError::UnknownTag(other)),
        };
        Ok(message)
    }
}

fn encode_settings(w: &mut Writer, settings: &MatchSettings) {
    let tuning = settings.tuning.to_wire();
    w.i64(settings.flight_time_ms)
        .i32(settings.difficulty)
        .i32(tuning.len() as i32);
    for v in tuning {
        w.i32(v);
    }
    w.bool(settings.rally_shrink_enabled)
        .u8(settings.game_mode.code())
        .bool(settings.bonuses.spin)
        .bool(settings.bonuses.copy)
        .bool(settings.bonuses.grid_effects)
        .bool(settings.bonuses.overuse);
}

fn decode_settings(r: &mut Reader<'_>) -> Result<MatchSettings, DecodeError> {
    let flight_time_ms = r.i64("flight_time")?;
    let difficulty = r.i32("difficulty")?;
    let tuning = match r.opt(|r| r.length("swing_settings_count"))? {
        Some(count) => {
            let mut values = Vec::with_capacity(count.min(64));
            for _ in 0..count {
                values.push(r.i32("swing_settings")?);
            }
            SwingTuning::from_wire(&values)
        }
        None => SwingTuning::default(),
    };
    let rally_shrink_enabled = r.opt(|r| r.bool("rally_shrink"))?.unwrap_or(true);
    let game_mode = match r.opt(|r| r.u8("game_mode"))? {
        Some(code) => mode(code)?,
        None => GameMode::Competitive,
    };
    let mut flags = [false; 4];
    for (flag, field) in flags
        .iter_mut()
        .zip(["spin_bonus", "copy_bonus", "grid_effects", "overuse"])
    {
        *flag = r.opt(|r| r.bool(field))?.unwrap_or(false);
    }
    let [spin, copy, grid_effects, overuse] = flags;

    Ok(MatchSettings {
        flight_time_ms,
        difficulty,
        tuning,
        rally_shrink_enabled,
        game_mode,
        bonuses: BonusToggles {
            spin,
            copy,
            grid_effects,
            overuse,
        },
    })
}

fn decode_swing(r: &mut Reader<'_>) -> Result<SwingAction, DecodeError> {
    let timestamp_ms = r.i64("timestamp")?;
    let force = r.f32("force")?;
    let code = r.i32("shot_type")?;
    let shot = ShotType::from_code(code).ok_or(DecodeError::InvalidValue {
        field: "shot_type",
        value: code as i64,
    })?;
    let source = side(r.i32("source_player")?, "source_player")?;
    let spin = match r.opt(|r| r.i32("spin_type"))? {
        Some(code) => SpinType::from_code(code).ok_or(DecodeError::InvalidValue {
            field: "spin_type",
            value: code as i64,
        })?,
        None => SpinType::None,
    };
    Ok(SwingAction {
        timestamp_ms,
        force,
        shot,
        source,
        spin,
    })
}

fn encode_sync(w: &mut Writer, sync: &StateSync) {
    w.i32(sync.scores[0])
        .i32(sync.scores[1])
        .u8(sync.phase.code())
        .u8(sync.server.index() as u8)
        .u8(sync.mode.code())
        .i32(sync.rally_score)
        .i32(sync.lives)
        .u16(sync.grids[0])
        .u16(sync.grids[1])
        .u8(sync.lines[0])
        .u8(sync.lines[1])
        .i32(sync.longest_rally)
        .u32(sync.tiers[0])
        .u32(sync.tiers[1])
        .u8(sync.highest_tiers[0])
        .u8(sync.highest_tiers[1]);
}

fn decode_sync(r: &mut Reader<'_>) -> Result<StateSync, DecodeError> {
    let scores = [r.i32("p1_score")?, r.i32("p2_score")?];
    let code = r.u8("phase")?;
    let phase = MatchPhase::from_code(code).ok_or(DecodeError::InvalidValue {
        field: "phase",
        value: code as i64,
    })?;
    let server = side(r.u8("serving_player")? as i32, "serving_player")?;
    let mut sync = StateSync::new(scores, phase, server);

    if let Some(code) = r.opt(|r| r.u8("game_mode"))? {
        sync.mode = mode(code)?;
    }
    sync.rally_score = r.opt(|r| r.i32("rally_score"))?.unwrap_or(0);
    sync.lives = r.opt(|r| r.i32("rally_lives"))?.unwrap_or(0);
    for grid in &mut sync.grids {
        *grid = r.opt(|r| r.u16("grid"))?.unwrap_or(0);
    }
    for lines in &mut sync.lines {
        *lines = r.opt(|r| r.u8("lines"))?.unwrap_or(0);
    }
    sync.longest_rally = r.opt(|r| r.i32("longest_rally"))?.unwrap_or(0);
    for tiers in &mut sync.tiers {
        *tiers = r.opt(|r| r.u32("tiers"))?.unwrap_or(0);
    }
    for highest in &mut sync.highest_tiers {
        *highest = r.opt(|r| r.u8("highest_tier"))?.unwrap_or(0);
    }
    Ok(sync)
}

fn side(code: i32, field: &'static str) -> Result<Side, DecodeError> {
    usize::try_from(code)
        .ok()
        .and_then(Side::from_index)
        .ok_or(DecodeError::InvalidValue {
            field,
            value: code as i64,
        })
}

fn mode(code: u8) -> Result<GameMode, DecodeError> {
    GameMode::from_code(code).ok_or(DecodeError::InvalidValue {
        field: "game_mode",
        value: code as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_fails() {
        assert_eq!(Message::decode(&[0xFF]), Err(DecodeError::UnknownTag(0xFF)));
        assert_eq!(Message::decode(&[]), Err(DecodeError::Empty));
    }

    #[test]
    fn empty_messages_are_one_byte() {
        for message in [Message::StartGame, Message::Pause, Message::PlayerBusy] {
            let bytes = message.encode();
            assert_eq!(bytes.len(), 1);
            assert_eq!(Message::decode(&bytes).unwrap(), message);
        }
    }

    #[test]
    fn result_without_scorer() {
        let message = Message::Result {
            result: HitResult::PenaltyEnd,
            scoring: None,
        };
        let bytes = message.encode();
        assert_eq!(bytes, vec![tag::RESULT, 5, 0xFF]);
        assert_eq!(Message::decode(&bytes).unwrap(), message);
    }

    #[test]
    fn swing_without_spin_defaults_to_none() {
        let mut bytes = vec![tag::ACTION_SWING];
        bytes.extend_from_slice(&1234i64.to_be_bytes());
        bytes.extend_from_slice(&20.5f32.to_be_bytes());
        bytes.extend_from_slice(&4i32.to_be_bytes());
        bytes.extend_from_slice(&1i32.to_be_bytes());
        let Message::ActionSwing(swing) = Message::decode(&bytes).unwrap() else {
            panic!("expected swing");
        };
        assert_eq!(swing.spin, SpinType::None);
        assert_eq!(swing.source, Side::Two);
    }

    #[test]
    fn invalid_enum_bytes_rejected() {
        let mut bytes = vec![tag::ACTION_SWING];
        bytes.extend_from_slice(&0i64.to_be_bytes());
        bytes.extend_from_slice(&0f32.to_be_bytes());
        bytes.extend_from_slice(&9i32.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        assert!(matches!(
            Message::decode(&bytes),
            Err(DecodeError::InvalidValue { field: "shot_type", value: 9 })
        ));

        assert!(matches!(
            Message::decode(&[tag::RESULT, 6, 0]),
            Err(DecodeError::InvalidValue { field: "hit_result", .. })
        ));
    }

    #[test]
    fn profile_rejects_bad_utf8() {
        let mut bytes = vec![tag::PLAYER_PROFILE];
        bytes.extend_from_slice(&2i32.to_be_bytes());
        bytes.extend_from_slice(&[0xC3, 0x28]);
        bytes.extend_from_slice(&0i32.to_be_bytes());
        assert_eq!(Message::decode(&bytes), Err(DecodeError::InvalidUtf8));
    }
}
