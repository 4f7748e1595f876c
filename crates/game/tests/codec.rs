use rally::net::{tag, StateSync, SwingAction};
use rally::{
    BonusToggles, DecodeError, GameMode, HitResult, MatchPhase, MatchSettings, Message,
    PlayerProfile, ShotTuning, ShotType, Side, SpinType, SwingTuning,
};

fn roundtrip(message: Message) {
    let bytes = message.encode();
    assert_eq!(bytes[0], message.tag());
    let decoded = Message::decode(&bytes).unwrap_or_else(|e| panic!("{}: {e}", message.name()));
    assert_eq!(decoded, message);
}

fn full_settings() -> MatchSettings {
    let mut tuning = SwingTuning::default();
    tuning.set(ShotType::from_code(0).unwrap(), ShotTuning::new(100, 0, 100));
    tuning.set(ShotType::from_code(8).unwrap(), ShotTuning::new(0, 100, 0));
    MatchSettings {
        flight_time_ms: i64::MAX,
        difficulty: i32::MIN,
        tuning,
        rally_shrink_enabled: false,
        game_mode: GameMode::Solo,
        bonuses: BonusToggles {
            spin: true,
            copy: false,
            grid_effects: true,
            overuse: false,
        },
    }
}

fn full_sync() -> StateSync {
    StateSync {
        scores: [i32::MAX, -1],
        phase: MatchPhase::GameOver,
        server: Side::Two,
        mode: GameMode::Cooperative,
        rally_score: 123_456,
        lives: 0,
        grids: [0x01FF, 0],
        lines: [0xFF, 0x01],
        longest_rally: i32::MIN,
        tiers: [u32::MAX, 0x0249_2492],
        highest_tiers: [7, 0],
    }
}

#[test]
fn test_every_variant_roundtrips() {
    roundtrip(Message::Handshake { version: 0 });
    roundtrip(Message::Handshake { version: -1 });
    roundtrip(Message::Handshake { version: i32::MAX });
    roundtrip(Message::Settings(MatchSettings::default()));
    roundtrip(Message::Settings(full_settings()));
    let mut signed = full_settings();
    signed.tuning.set(ShotType::from_code(0).unwrap(), ShotTuning::new(-1, 250, i32::MAX));
    signed.tuning.set(ShotType::from_code(4).unwrap(), ShotTuning::new(i32::MIN, -100, 101));
    roundtrip(Message::Settings(signed));
    roundtrip(Message::StartGame);
    for (timestamp_ms, force) in [(0, 0.0), (i64::MIN, -1.5), (i64::MAX, f32::MAX)] {
        roundtrip(Message::ActionSwing(SwingAction {
            timestamp_ms,
            force,
            shot: ShotType::from_code(8).unwrap(),
            source: Side::Two,
            spin: SpinType::BackRight,
        }));
    }
    for result in [HitResult::Hit, HitResult::OutFault, HitResult::PenaltyEnd] {
        for scoring in [None, Some(Side::One), Some(Side::Two)] {
            roundtrip(Message::Result { result, scoring });
        }
    }
    roundtrip(Message::GameStateSync(StateSync::new([0, 0], MatchPhase::Idle, Side::One)));
    roundtrip(Message::GameStateSync(full_sync()));
    for message in [
        Message::Pause,
        Message::Resume,
        Message::PeerLeft,
        Message::Rematch,
        Message::PlayerReady,
        Message::PlayerBusy,
    ] {
        roundtrip(message);
    }
    for name in [String::new(), "Ünïcødé 🏓".to_string(), "x".repeat(1_000)] {
        roundtrip(Message::PlayerProfile(PlayerProfile {
            name,
            avatar: i32::MIN,
            ring: 3,
        }));
    }
}

#[test]
fn test_settings_truncation_defaults() {
    let bytes = Message::Settings(full_settings()).encode();

    let Message::Settings(short) = Message::decode(&bytes[..13]).unwrap() else {
        panic!("expected settings");
    };
    assert_eq!(short.flight_time_ms, i64::MAX);
    assert_eq!(short.difficulty, i32::MIN);
    assert_eq!(short.tuning, SwingTuning::default());
    assert!(short.rally_shrink_enabled);
    assert_eq!(short.game_mode, GameMode::Competitive);
    assert_eq!(short.bonuses, BonusToggles::NONE);

    let list_end = 13 + 4 + 27 * 4;
    let Message::Settings(short) = Message::decode(&bytes[..list_end]).unwrap() else {
        panic!("expected settings");
    };
    assert_eq!(short.tuning, full_settings().tuning);
    assert!(short.rally_shrink_enabled);

    let Message::Settings(short) = Message::decode(&bytes[..list_end + 3]).unwrap() else {
        panic!("expected settings");
    };
    assert!(!short.rally_shrink_enabled);
    assert_eq!(short.game_mode, GameMode::Solo);
    assert!(short.bonuses.spin);
    assert!(!short.bonuses.grid_effects);

    assert!(matches!(
        Message::decode(&bytes[..20]),
        Err(DecodeError::Truncated { field: "swing_settings", .. })
    ));
    assert!(matches!(
        Message::decode(&bytes[..10]),
        Err(DecodeError::Truncated { field: "difficulty", .. })
    ));
}

#[test]
fn test_short_swing_list_fills_defaults() {
    let mut bytes = vec![tag::SETTINGS];
    bytes.extend_from_slice(&800i64.to_be_bytes());
    bytes.extend_from_slice(&2i32.to_be_bytes());
    bytes.extend_from_slice(&2i32.to_be_bytes());
    bytes.extend_from_slice(&40i32.to_be_bytes());
    bytes.extend_from_slice(&50i32.to_be_bytes());
    let Message::Settings(settings) = Message::decode(&bytes).unwrap() else {
        panic!("expected settings");
    };
    let first = settings.tuning.get(ShotType::from_code(0).unwrap());
    assert_eq!(first, ShotTuning::new(40, 50, 0));
    assert_eq!(
        settings.tuning.get(ShotType::from_code(5).unwrap()),
        SwingTuning::default().get(ShotType::from_code(5).unwrap())
    );
}

#[test]
fn test_swing_truncation_defaults_spin() {
    let full = Message::ActionSwing(SwingAction {
        timestamp_ms: 99,
        force: 31.0,
        shot: ShotType::from_code(4).unwrap(),
        source: Side::One,
        spin: SpinType::Top,
    });
    let bytes = full.encode();
    assert_eq!(bytes.len(), 25);
    let Message::ActionSwing(swing) = Message::decode(&bytes[..21]).unwrap() else {
        panic!("expected swing");
    };
    assert_eq!(swing.spin, SpinType::None);
    assert_eq!(swing.timestamp_ms, 99);
    assert!(Message::decode(&bytes[..23]).is_err());
}

#[test]
fn test_sync_truncation_at_every_boundary() {
    let full = full_sync();
    let bytes = Message::GameStateSync(full).encode();
    assert_eq!(bytes.len(), 40);

    let boundaries = [11, 12, 16, 20, 22, 24, 25, 26, 30, 34, 38, 39, 40];
    for &cut in &boundaries {
        let Message::GameStateSync(sync) = Message::decode(&bytes[..cut]).unwrap() else {
            panic!("expected sync at {cut}");
        };
        assert_eq!(sync.scores, full.scores);
        assert_eq!(sync.phase, full.phase);
        assert_eq!(sync.server, full.server);
        let expect_mode = if cut >= 12 { full.mode } else { GameMode::Competitive };
        assert_eq!(sync.mode, expect_mode);
        let expect_score = if cut >= 16 { full.rally_score } else { 0 };
        assert_eq!(sync.rally_score, expect_score);
        let expect_grid2 = if cut >= 24 { full.grids[1] } else { 0 };
        assert_eq!(sync.grids[1], expect_grid2);
        let expect_longest = if cut >= 30 { full.longest_rally } else { 0 };
        assert_eq!(sync.longest_rally, expect_longest);
        let expect_hi1 = if cut >= 39 { full.highest_tiers[0] } else { 0 };
        assert_eq!(sync.highest_tiers[0], expect_hi1);
    }

    for cut in [5, 10, 14, 21, 33] {
        assert!(
            matches!(
                Message::decode(&bytes[..cut]),
                Err(DecodeError::Truncated { .. })
            ),
            "cut at {cut}"
        );
    }
}

#[test]
fn test_profile_ring_defaults() {
    let mut bytes = vec![tag::PLAYER_PROFILE];
    bytes.extend_from_slice(&3i32.to_be_bytes());
    bytes.extend_from_slice(b"Ana");
    bytes.extend_from_slice(&7i32.to_be_bytes());
    assert_eq!(
        Message::decode(&bytes).unwrap(),
        Message::PlayerProfile(PlayerProfile {
            name: "Ana".to_string(),
            avatar: 7,
            ring: -1,
        })
    );

    let mut bytes = vec![tag::PLAYER_PROFILE];
    bytes.extend_from_slice(&(-4i32).to_be_bytes());
    assert!(matches!(
        Message::decode(&bytes),
        Err(DecodeError::NegativeLength { len: -4, .. })
    ));

    let mut bytes = vec![tag::PLAYER_PROFILE];
    bytes.extend_from_slice(&10i32.to_be_bytes());
    bytes.extend_from_slice(b"abc");
    assert!(matches!(
        Message::decode(&bytes),
        Err(DecodeError::Truncated { field: "name", .. })
    ));
}

#[test]
fn test_unknown_tag_is_a_failure() {
    assert_eq!(Message::decode(&[0xFF]), Err(DecodeError::UnknownTag(0xFF)));
    assert_eq!(Message::decode(&[0x00]), Err(DecodeError::UnknownTag(0x00)));
    assert_eq!(Message::decode(&[0x0E, 1, 2]), Err(DecodeError::UnknownTag(0x0E)));
}

#[test]
fn test_out_of_range_enums_fail() {
    let mut bytes = Message::GameStateSync(full_sync()).encode();
    bytes[9] = 5;
    assert!(matches!(
        Message::decode(&bytes),
        Err(DecodeError::InvalidValue { field: "phase", value: 5 })
    ));

    let mut bytes = Message::GameStateSync(full_sync()).encode();
    bytes[11] = 3;
    assert!(matches!(
        Message::decode(&bytes),
        Err(DecodeError::InvalidValue { field: "game_mode", .. })
    ));

    assert!(matches!(
        Message::decode(&[tag::RESULT, 0, 2]),
        Err(DecodeError::InvalidValue { field: "scoring_player", value: 2 })
    ));
}
