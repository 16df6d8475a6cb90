use soccer_game::config::MatchParameter;
use soccer_game::mechanics::action::PlayerAction;
use soccer_game::mechanics::match_engine::{MatchMode, SoccerMatch};
use soccer_game::mechanics::player::Player;

#[ctor::ctor]
fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_secs()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .is_test(true)
        .try_init();
}

/// a single round of 60 ticks, without countdown
#[allow(dead_code)]
pub fn short_match_param() -> MatchParameter {
    MatchParameter {
        round_duration_secs: 1,
        rounds: 1,
        countdown_secs: 0,
        ..MatchParameter::default()
    }
}

#[allow(dead_code)]
pub fn training_match(tick_budget: u64) -> SoccerMatch {
    SoccerMatch::new(MatchParameter::default(), MatchMode::Training { tick_budget }, Some(42))
}

#[allow(dead_code)]
pub fn no_op(player: &Player) -> PlayerAction { PlayerAction::no_op(player.role) }
