use std::sync::Arc;

use spinwheel_core::{
    evaluate, sample_stops, Credits, GameConfig, GameMode, GameSession, PrizeEntry,
    ProtocolViolation, ProvablyFairRng, RandomSource, ReelSet, ScriptedRng, SeededRng,
    SessionError, Symbol, WeightedIndex,
};

fn session() -> GameSession {
    GameSession::new(Arc::new(GameConfig::reference()))
}

#[test]
fn rng_repeatable() {
    let mut rng1 = ProvablyFairRng::new("s", "c", 42);
    let mut rng2 = ProvablyFairRng::new("s", "c", 42);
    let a: Vec<u64> = (0..10).map(|_| rng1.below(1000)).collect();
    let b: Vec<u64> = (0..10).map(|_| rng2.below(1000)).collect();
    assert_eq!(a, b);
}

#[test]
fn sampler_respects_every_strip_length() {
    let reels = ReelSet::new(vec![
        vec![Symbol::Lv1],
        vec![Symbol::Lv1, Symbol::Hv1],
        vec![Symbol::Hv2; 7],
        vec![Symbol::Lv4; 31],
    ])
    .unwrap();
    let mut rng = SeededRng::new(1);
    for _ in 0..2_000 {
        let stops = sample_stops(&reels, &mut rng);
        assert_eq!(stops[0], 0);
        assert!(stops[1] < 2);
        assert!(stops[2] < 7);
        assert!(stops[3] < 31);
    }
}

#[test]
fn evaluation_is_reproducible() {
    let config = GameConfig::reference();
    let stops: Vec<usize> = sample_stops(&config.reels, &mut SeededRng::new(5));
    let first = evaluate(
        &stops,
        &config.reels,
        &config.paylines,
        &config.payouts,
        Credits::new(3),
    )
    .unwrap();
    let again = evaluate(
        &stops,
        &config.reels,
        &config.paylines,
        &config.payouts,
        Credits::new(3),
    )
    .unwrap();
    assert_eq!(first, again);
}

#[test]
fn balance_is_conserved_across_many_rounds() {
    let mut session = session();
    session.toggle_game_mode().unwrap();
    let mut rng = SeededRng::new(31337);
    let start = session.current_balance().get() as i128;
    let mut bets: i128 = 0;
    let mut wins: i128 = 0;
    for _ in 0..1_000 {
        let outcome = session.play_base_round(&mut rng).unwrap();
        bets += outcome.bet.get() as i128;
        wins += outcome.total_win.get() as i128;
    }
    assert_eq!(session.current_balance().get() as i128, start - bets + wins);
    assert!(session.ledger().audit());
}

#[test]
fn insufficient_funds_iff_bet_exceeds_balance() {
    let config = Arc::new(GameConfig::reference());
    for balance in [0u64, 1, 2, 3, 4, 5, 9, 10, 11] {
        for bet in [1u64, 2, 3, 5, 10] {
            let mut session = GameSession::with_balance(config.clone(), Credits::new(balance));
            session.toggle_game_mode().unwrap();
            let result = session.place_bet(Credits::new(bet));
            if bet > balance {
                assert_eq!(
                    result,
                    Err(SessionError::InsufficientFunds {
                        bet: Credits::new(bet),
                        balance: Credits::new(balance),
                    })
                );
                assert_eq!(session.current_balance(), Credits::new(balance));
            } else {
                assert!(result.is_ok());
                assert_eq!(session.current_balance(), Credits::new(balance - bet));
            }
        }
    }
}

#[test]
fn override_wins_once_then_sampling_resumes() {
    let mut session = session();
    session.toggle_game_mode().unwrap();
    session.toggle_game_mode().unwrap();
    session.set_prize_override(6).unwrap();
    // the random source is not consulted while an override is pending
    let mut rng = ScriptedRng::new([3]);
    let forced = session.draw_bonus_prize(&mut rng).unwrap();
    assert_eq!(forced.index, 6);
    assert_eq!(rng.remaining(), 1);
    session.credit_bonus_prize(forced.value).unwrap();

    let sampled = session.draw_bonus_prize(&mut rng).unwrap();
    assert_eq!(sampled.index, 0);
    assert!(!sampled.forced);
}

#[test]
fn three_toggles_from_init() {
    let mut session = session();
    assert_eq!(session.mode(), GameMode::Init);
    let modes: Vec<GameMode> = (0..3).map(|_| session.toggle_game_mode().unwrap()).collect();
    assert_eq!(
        modes,
        vec![GameMode::BaseGame, GameMode::BonusGame, GameMode::BaseGame]
    );
}

#[test]
fn prize_table_boundaries() {
    let wheel = WeightedIndex::build(vec![
        PrizeEntry::new(200, 100),
        PrizeEntry::new(1000, 20),
        PrizeEntry::new(400, 50),
        PrizeEntry::new(2000, 10),
        PrizeEntry::new(5000, 4),
    ])
    .unwrap();
    assert_eq!(wheel.total_weight(), 184);
    let mut rng = ScriptedRng::new([0, 183]);
    assert_eq!(wheel.draw(&mut rng, &mut None).value, Credits::new(200));
    assert_eq!(wheel.draw(&mut rng, &mut None).value, Credits::new(5000));
}

#[test]
fn wrong_mode_is_a_protocol_violation_not_a_funds_error() {
    let mut session = session();
    session.toggle_game_mode().unwrap();
    let err = session
        .draw_bonus_prize(&mut SeededRng::new(0))
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Protocol(ProtocolViolation::WrongMode { .. })
    ));
}

#[test]
fn independent_sessions_do_not_share_state() {
    let config = Arc::new(GameConfig::reference());
    let mut alice = GameSession::new(config.clone());
    let mut bob = GameSession::new(config);
    alice.toggle_game_mode().unwrap();
    bob.toggle_game_mode().unwrap();
    alice.place_bet(Credits::new(10)).unwrap();
    assert_eq!(alice.current_balance(), Credits::new(9_990));
    assert_eq!(bob.current_balance(), Credits::new(10_000));
    assert!(bob.place_bet(Credits::new(1)).is_ok());
}
