use std::sync::Arc;

use spinwheel_core::{GameConfig, GameSession, ProvablyFairRng};

fn main() {
    // Example end-to-end round: base spin, then one wheel draw
    let server_seed = "example-server-seed";
    let client_seed = "example-client-seed";
    let mut rng = ProvablyFairRng::new(server_seed, client_seed, 1);
    let mut session = GameSession::new(Arc::new(GameConfig::reference()));

    session.toggle_game_mode().expect("enter base game");
    let outcome = session.play_base_round(&mut rng).expect("base round");
    println!(
        "server_seed_hash={} stops={:?} bet={} win={} balance={}",
        rng.server_seed_hash_hex(),
        outcome.stops,
        outcome.bet,
        outcome.total_win,
        session.current_balance()
    );

    session.toggle_game_mode().expect("enter bonus game");
    let draw = session.draw_bonus_prize(&mut rng).expect("wheel draw");
    session.credit_bonus_prize(draw.value).expect("credit prize");
    println!(
        "wheel slot={} prize={} balance={}",
        draw.index,
        draw.value,
        session.current_balance()
    );
}
