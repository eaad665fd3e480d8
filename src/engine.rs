//! Round and session state machine.
//!
//! The engine owns everything that changes during play: the selected tier,
//! the current target, the countdown, scores and the notification slot. Time
//! only enters through [`GameEngine::tick`]/[`GameEngine::advance`] and input
//! only through [`GameEngine::handle_key`], so every transition runs to
//! completion before the next one starts.

use crossterm::event::KeyEvent;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::input::printable_char;
use crate::notification::{Notification, NotificationQueue};
use crate::scores::{self, HighScores};
use crate::store::KeyValueStore;
use crate::symbols::SymbolPools;
use crate::tier::DifficultyTier;
use crate::timer::{RoundTimer, TickOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    GameOver,
    Playing,
}

/// What happened to a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not a plain printable key, or no round is running.
    Ignored,
    Hit,
    Miss,
}

/// Snapshot of the running round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundState {
    pub target: char,
    pub time_left_ms: u64,
    pub is_active: bool,
}

pub struct GameEngine<S: KeyValueStore> {
    store: S,
    pools: SymbolPools,
    rng: StdRng,
    tier: DifficultyTier,
    phase: Phase,
    target: char,
    timer: RoundTimer,
    score: u32,
    last_score: u32,
    high_scores: HighScores,
    last_key: Option<char>,
    notifications: NotificationQueue,
}

impl<S: KeyValueStore> GameEngine<S> {
    pub fn new(store: S, pools: SymbolPools, tier: DifficultyTier) -> Self {
        Self::with_rng(store, pools, tier, StdRng::from_entropy())
    }

    /// Reads persisted scores once; starts in GameOver with a primed target.
    pub fn with_rng(store: S, pools: SymbolPools, tier: DifficultyTier, mut rng: StdRng) -> Self {
        let high_scores = HighScores::load(&store);
        let last_score = scores::load_score(&store);
        let target = pools.pick(tier, &mut rng);

        Self {
            store,
            pools,
            rng,
            tier,
            phase: Phase::GameOver,
            target,
            timer: RoundTimer::new(),
            score: 0,
            last_score,
            high_scores,
            last_key: None,
            notifications: NotificationQueue::new(),
        }
    }

    /// Starts a round. Only valid from GameOver.
    pub fn new_game(&mut self) -> bool {
        if self.phase != Phase::GameOver {
            return false;
        }

        self.phase = Phase::Playing;
        self.score = 0;
        self.last_key = None;
        self.target = self.pick_target();
        self.timer.start(self.tier.round_duration_ms());
        info!(tier = %self.tier, "new game");
        true
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        match printable_char(key) {
            Some(c) => self.handle_char(c),
            None => KeyOutcome::Ignored,
        }
    }

    /// Matches an already-filtered character against the target.
    pub fn handle_char(&mut self, c: char) -> KeyOutcome {
        if self.phase != Phase::Playing {
            return KeyOutcome::Ignored;
        }
        // expiry wins over a late key
        if !self.timer.is_running() {
            self.on_timeout();
            return KeyOutcome::Ignored;
        }

        self.last_key = Some(c);
        if c == self.target {
            self.on_hit();
            KeyOutcome::Hit
        } else {
            self.end_round(Notification::error(format!("{c} was wrong")), "wrong key");
            KeyOutcome::Miss
        }
    }

    /// Zeroes every tier's high score. Leaves the current round alone.
    pub fn reset_high_scores(&mut self) {
        self.high_scores.reset();
        self.persist_high_scores();
        info!("high scores reset");
    }

    /// Switches tier between rounds. Ignored while playing.
    pub fn set_tier(&mut self, tier: DifficultyTier) -> bool {
        if self.phase != Phase::GameOver {
            return false;
        }
        if tier != self.tier {
            self.tier = tier;
            self.target = self.pick_target();
            debug!(tier = %self.tier, "tier selected");
        }
        true
    }

    pub fn cycle_tier(&mut self) -> bool {
        self.set_tier(self.tier.next())
    }

    /// One millisecond of game time.
    pub fn tick(&mut self) {
        self.notifications.tick();
        if self.phase == Phase::Playing && self.timer.tick() == TickOutcome::Expired {
            self.on_timeout();
        }
    }

    pub fn advance(&mut self, elapsed_ms: u64) {
        for _ in 0..elapsed_ms {
            self.tick();
        }
    }

    fn on_hit(&mut self) {
        self.notifications.post(Notification::success("+1 point"));
        self.score += 1;
        self.persist_score(self.score);

        if self.high_scores.raise(self.tier, self.score) {
            info!(tier = %self.tier, score = self.score, "new high score");
            self.persist_high_scores();
        }

        debug!(target_char = %self.target, score = self.score, "hit");
        self.target = self.pick_target();
        self.timer.start(self.tier.round_duration_ms());
    }

    fn on_timeout(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        self.end_round(Notification::error("too slow"), "timeout");
    }

    fn end_round(&mut self, notification: Notification, reason: &str) {
        self.timer.stop();
        self.phase = Phase::GameOver;
        info!(tier = %self.tier, score = self.score, reason, "game over");

        // the stored score keeps the run's last hit
        self.score = 0;
        self.notifications.post(notification);
        // primes the display for the next game
        self.target = self.pick_target();
    }

    fn pick_target(&mut self) -> char {
        self.pools.pick(self.tier, &mut self.rng)
    }

    fn persist_score(&mut self, score: u32) {
        self.last_score = score;
        if let Err(err) = scores::save_score(&mut self.store, score) {
            warn!(%err, "could not persist score");
        }
    }

    fn persist_high_scores(&mut self) {
        if let Err(err) = self.high_scores.save(&mut self.store) {
            warn!(%err, "could not persist high scores");
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn target(&self) -> char {
        self.target
    }

    pub fn round(&self) -> Option<RoundState> {
        match self.phase {
            Phase::Playing => Some(RoundState {
                target: self.target,
                time_left_ms: self.timer.remaining_ms(),
                is_active: self.timer.is_running(),
            }),
            Phase::GameOver => None,
        }
    }

    pub fn timer(&self) -> &RoundTimer {
        &self.timer
    }

    pub fn percent_remaining(&self) -> f64 {
        self.timer.percent_remaining()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Score as last written to the store. Only hits write it, so between
    /// games it is the final score of the most recent run that scored.
    pub fn last_score(&self) -> u32 {
        self.last_score
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn high_score(&self, tier: DifficultyTier) -> u32 {
        self.high_scores.get(tier)
    }

    pub fn last_key(&self) -> Option<char> {
        self.last_key
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    pub fn pools(&self) -> &SymbolPools {
        &self.pools
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationKind;
    use crate::scores::HIGH_SCORE_KEY;
    use crate::store::MemoryStore;
    use crate::symbols::SymbolPool;
    use crate::timer::TimerState;
    use assert_matches::assert_matches;
    use crossterm::event::{KeyCode, KeyModifiers};
    use rand::Rng;

    fn engine_with(symbols: &str, tier: DifficultyTier, store: MemoryStore) -> GameEngine<MemoryStore> {
        let pool = SymbolPool::new(tier, symbols.chars()).unwrap();
        GameEngine::with_rng(
            store,
            SymbolPools::uniform(pool),
            tier,
            StdRng::seed_from_u64(1),
        )
    }

    fn store_with_high_scores(normal: u32, hard: u32, hardcore: u32) -> MemoryStore {
        let mut store = MemoryStore::new();
        HighScores {
            normal,
            hard,
            hardcore,
            ..HighScores::default()
        }
        .save(&mut store)
        .unwrap();
        store
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn starts_in_game_over_with_target_from_pool() {
        let engine = GameEngine::new(
            MemoryStore::new(),
            SymbolPools::builtin().unwrap(),
            DifficultyTier::Normal,
        );
        assert_eq!(engine.phase(), Phase::GameOver);
        assert!(engine.pools().get(DifficultyTier::Normal).contains(engine.target()));
        assert_eq!(engine.round(), None);
        assert_eq!(engine.timer().state(), TimerState::Stopped);
    }

    #[test]
    fn new_game_starts_timer_with_tier_duration() {
        let mut engine = engine_with("a", DifficultyTier::Hard, MemoryStore::new());
        assert!(engine.new_game());
        assert_eq!(engine.phase(), Phase::Playing);
        assert_eq!(
            engine.round(),
            Some(RoundState {
                target: 'a',
                time_left_ms: 1000,
                is_active: true,
            })
        );
        assert_eq!(engine.percent_remaining(), 100.0);
    }

    #[test]
    fn new_game_while_playing_is_ignored() {
        let mut engine = engine_with("a", DifficultyTier::Normal, MemoryStore::new());
        engine.new_game();
        engine.handle_key(&key('a'));
        engine.advance(100);

        assert!(!engine.new_game());
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.timer().remaining_ms(), 1900);
    }

    #[test]
    fn mismatch_ends_game_without_lowering_high_score() {
        let mut engine = engine_with("a", DifficultyTier::Normal, store_with_high_scores(8, 0, 0));
        engine.new_game();
        for _ in 0..5 {
            assert_eq!(engine.handle_key(&key('a')), KeyOutcome::Hit);
        }
        assert_eq!(engine.score(), 5);

        assert_eq!(engine.handle_key(&key('b')), KeyOutcome::Miss);
        assert_eq!(engine.notification(), Some(&Notification::error("b was wrong")));
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(engine.high_score(DifficultyTier::Normal), 8);
        assert_eq!(engine.timer().state(), TimerState::Stopped);
        assert_eq!(engine.target(), 'a');
    }

    #[test]
    fn match_raises_high_score_and_restarts_timer() {
        let mut engine = engine_with("#", DifficultyTier::Hard, store_with_high_scores(0, 2, 0));
        engine.new_game();
        engine.handle_key(&key('#'));
        engine.handle_key(&key('#'));
        assert_eq!(engine.score(), 2);
        assert_eq!(engine.high_score(DifficultyTier::Hard), 2);

        engine.advance(400);
        assert_eq!(engine.handle_key(&key('#')), KeyOutcome::Hit);
        assert_eq!(engine.notification(), Some(&Notification::success("+1 point")));
        assert_eq!(engine.score(), 3);
        assert_eq!(engine.high_score(DifficultyTier::Hard), 3);
        assert_eq!(engine.timer().remaining_ms(), 1000);
        assert_eq!(engine.phase(), Phase::Playing);

        let stored = HighScores::load(engine.store());
        assert_eq!(stored.hard, 3);
        assert_eq!(stored.normal, 0);
    }

    #[test]
    fn high_score_set_to_score_not_incremented() {
        let mut engine = engine_with("x", DifficultyTier::Normal, MemoryStore::new());
        engine.new_game();
        for _ in 0..4 {
            engine.handle_key(&key('x'));
        }
        assert_eq!(engine.high_score(DifficultyTier::Normal), 4);
        assert_eq!(engine.high_score(DifficultyTier::Hard), 0);
    }

    #[test]
    fn timeout_ends_game() {
        let mut engine = engine_with("a", DifficultyTier::Normal, MemoryStore::new());
        engine.new_game();
        engine.handle_key(&key('a'));

        engine.advance(1999);
        assert!(engine.is_playing());
        engine.tick();

        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.notification(), Some(&Notification::error("too slow")));
        assert_eq!(engine.high_score(DifficultyTier::Normal), 1);
    }

    #[test]
    fn key_after_expiry_is_a_no_op() {
        let mut engine = engine_with("a", DifficultyTier::Hardcore, MemoryStore::new());
        engine.new_game();
        engine.advance(700);
        assert_eq!(engine.handle_key(&key('a')), KeyOutcome::Ignored);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.notification().map(|n| n.text.as_str()), Some("too slow"));
    }

    #[test]
    fn key_just_before_expiry_counts() {
        let mut engine = engine_with("a", DifficultyTier::Hardcore, MemoryStore::new());
        engine.new_game();
        engine.advance(699);
        assert_eq!(engine.handle_key(&key('a')), KeyOutcome::Hit);
        assert_eq!(engine.timer().remaining_ms(), 700);
    }

    #[test]
    fn modified_key_changes_nothing() {
        let mut engine = engine_with("c", DifficultyTier::Normal, MemoryStore::new());
        engine.new_game();
        engine.advance(10);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(engine.handle_key(&ctrl_c), KeyOutcome::Ignored);
        assert!(engine.is_playing());
        assert_eq!(engine.score(), 0);
        assert!(engine.notification().is_none());
        assert_eq!(engine.timer().remaining_ms(), 1990);
        assert_eq!(engine.last_key(), None);

        engine.advance(10);
        assert_eq!(engine.timer().remaining_ms(), 1980);
    }

    #[test]
    fn non_printable_key_is_ignored() {
        let mut engine = engine_with("c", DifficultyTier::Normal, MemoryStore::new());
        engine.new_game();
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(engine.handle_key(&enter), KeyOutcome::Ignored);
        assert!(engine.is_playing());
    }

    #[test]
    fn keys_ignored_while_game_over() {
        let mut engine = engine_with("a", DifficultyTier::Normal, MemoryStore::new());
        assert_eq!(engine.handle_key(&key('a')), KeyOutcome::Ignored);
        assert_eq!(engine.score(), 0);
        assert!(engine.notification().is_none());
    }

    #[test]
    fn reset_high_scores_keeps_round_running() {
        let mut engine = engine_with("a", DifficultyTier::Normal, store_with_high_scores(4, 5, 6));
        engine.new_game();
        engine.handle_key(&key('a'));
        engine.handle_key(&key('a'));

        engine.reset_high_scores();

        for tier in DifficultyTier::ALL {
            assert_eq!(engine.high_score(tier), 0);
        }
        assert_eq!(HighScores::load(engine.store()), HighScores::default());
        assert_eq!(engine.score(), 2);
        assert!(engine.is_playing());
        assert!(engine.timer().is_running());
    }

    #[test]
    fn set_tier_only_between_rounds() {
        let mut engine = engine_with("a", DifficultyTier::Normal, MemoryStore::new());
        assert!(engine.set_tier(DifficultyTier::Hardcore));
        assert_eq!(engine.tier(), DifficultyTier::Hardcore);

        engine.new_game();
        assert_eq!(engine.timer().remaining_ms(), 700);
        assert!(!engine.set_tier(DifficultyTier::Normal));
        assert!(!engine.cycle_tier());
        assert_eq!(engine.tier(), DifficultyTier::Hardcore);
    }

    #[test]
    fn set_tier_repicks_target_from_new_pool() {
        let mut pools = SymbolPools::builtin().unwrap();
        pools.set(
            DifficultyTier::Hardcore,
            SymbolPool::new(DifficultyTier::Hardcore, "Z".chars()).unwrap(),
        );
        let mut engine = GameEngine::with_rng(
            MemoryStore::new(),
            pools,
            DifficultyTier::Normal,
            StdRng::seed_from_u64(3),
        );
        engine.set_tier(DifficultyTier::Hardcore);
        assert_eq!(engine.target(), 'Z');
    }

    #[test]
    fn cycle_tier_wraps() {
        let mut engine = engine_with("a", DifficultyTier::Hardcore, MemoryStore::new());
        assert!(engine.cycle_tier());
        assert_eq!(engine.tier(), DifficultyTier::Normal);
    }

    #[test]
    fn notifications_expire_with_game_time() {
        let mut engine = engine_with("a", DifficultyTier::Normal, MemoryStore::new());
        engine.new_game();
        engine.handle_key(&key('b'));
        engine.advance(1999);
        assert_matches!(
            engine.notification(),
            Some(Notification { kind: NotificationKind::Error, .. })
        );
        engine.tick();
        assert!(engine.notification().is_none());
        assert_eq!(engine.phase(), Phase::GameOver);
    }

    #[test]
    fn new_hit_restarts_notification_lifetime() {
        let mut engine = engine_with("a", DifficultyTier::Normal, MemoryStore::new());
        engine.new_game();
        engine.handle_key(&key('a'));
        engine.advance(1500);
        engine.handle_key(&key('a'));
        engine.advance(1999);
        assert_eq!(engine.notification(), Some(&Notification::success("+1 point")));
        assert!(engine.is_playing());
    }

    #[test]
    fn timeout_replaces_success_expiring_on_same_tick() {
        let mut engine = engine_with("a", DifficultyTier::Normal, MemoryStore::new());
        engine.new_game();
        engine.handle_key(&key('a'));
        engine.advance(2000);
        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(engine.notification(), Some(&Notification::error("too slow")));
    }

    #[test]
    fn stored_score_only_written_by_hits() {
        let mut engine = engine_with("a", DifficultyTier::Normal, MemoryStore::new());
        engine.new_game();
        for _ in 0..3 {
            engine.handle_key(&key('a'));
        }
        engine.handle_key(&key('b'));
        assert_eq!(engine.last_score(), 3);
        assert_eq!(scores::load_score(engine.store()), 3);

        // a run without hits leaves the previous run's score alone
        engine.new_game();
        assert_eq!(scores::load_score(engine.store()), 3);
        engine.handle_key(&key('b'));
        assert_eq!(scores::load_score(engine.store()), 3);

        engine.new_game();
        engine.advance(2000);
        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(engine.last_score(), 3);
        assert_eq!(scores::load_score(engine.store()), 3);
    }

    #[test]
    fn reset_high_scores_while_game_over() {
        let mut engine = engine_with("ab", DifficultyTier::Hard, store_with_high_scores(4, 5, 6));
        let target = engine.target();

        engine.reset_high_scores();

        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(engine.target(), target);
        assert_eq!(engine.score(), 0);
        for tier in DifficultyTier::ALL {
            assert_eq!(engine.high_score(tier), 0);
        }
        assert_eq!(HighScores::load(engine.store()), HighScores::default());
    }

    #[test]
    fn high_scores_never_decrease_over_random_play() {
        let mut engine = engine_with("ab", DifficultyTier::Normal, MemoryStore::new());
        let mut rng = StdRng::seed_from_u64(99);
        let mut previous = *engine.high_scores();

        for _ in 0..2000 {
            match rng.gen_range(0..6) {
                0 => {
                    engine.new_game();
                }
                1 => {
                    engine.cycle_tier();
                }
                2 => engine.advance(rng.gen_range(0..800)),
                _ => {
                    let c = if rng.gen_bool(0.8) { engine.target() } else { 'q' };
                    engine.handle_key(&key(c));
                }
            }

            let now = *engine.high_scores();
            for tier in DifficultyTier::ALL {
                assert!(now.get(tier) >= previous.get(tier));
            }
            previous = now;
        }
    }

    #[test]
    fn high_score_record_written_under_fixed_key() {
        let mut engine = engine_with("a", DifficultyTier::Hardcore, MemoryStore::new());
        engine.new_game();
        engine.handle_key(&key('a'));
        let raw = engine.store().get_raw(HIGH_SCORE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["hardcore"], 1);
        assert_eq!(value["version"], 1);
    }
}
