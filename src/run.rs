//! Session host
//!
//! [`RunController`] owns one [`RunSession`] plus the [`Track`] it spawns
//! into, drives it on a fixed timestep and routes its events:
//! - coin/turbo counters and stage changes feed missions through [`Persistence`]
//! - the terminal record is banked and written to the leaderboard once
//! - every event (plus `MissionCompleted` toasts) is forwarded to an [`EventSink`]

use crate::consts::{MAX_SUBSTEPS, SIM_DT_MS};
use crate::missions;
use crate::persistence::{Persistence, SessionOutcome};
use crate::sim::{Food, GameEvent, Intent, RunSession, TickInput, tick};
use crate::track::Track;
use crate::tuning::Tuning;

/// Frame deltas above this are clamped before accumulation (ms)
const MAX_FRAME_MS: f32 = 100.0;

/// Receives session events for presentation
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// Sink that drops everything
impl EventSink for () {
    fn emit(&mut self, _event: GameEvent) {}
}

pub struct RunController<P: Persistence, K: EventSink> {
    session: RunSession,
    track: Track,
    persistence: P,
    sink: K,
    /// Intents queued since the last step
    pending: TickInput,
    accumulator: f32,
    outcome: Option<SessionOutcome>,
}

impl<P: Persistence, K: EventSink> RunController<P, K> {
    /// Start a run with the persisted loadout
    pub fn new(persistence: P, sink: K, seed: u64, food: Food, tuning: Tuning) -> Self {
        let loadout = persistence.loadout();
        log::info!(
            "Run starting: seed={} food={} skin={}",
            seed,
            food.as_str(),
            loadout.cosmetic
        );
        Self {
            session: RunSession::new(seed, food, loadout, tuning),
            track: Track::new(),
            persistence,
            sink,
            pending: TickInput::default(),
            accumulator: 0.0,
            outcome: None,
        }
    }

    /// Replace the session with a fresh one on a new seed
    pub fn restart(&mut self, seed: u64, food: Food) {
        let tuning = self.session.tuning.clone();
        self.session = RunSession::new(seed, food, self.persistence.loadout(), tuning);
        self.track.clear();
        self.pending.clear();
        self.accumulator = 0.0;
        self.outcome = None;
        log::info!("Run restarted: seed={} food={}", seed, food.as_str());
    }

    pub fn session(&self) -> &RunSession {
        &self.session
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Leaderboard/high-score result, once the run has ended
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.session.is_over()
    }

    /// Queue an intent for the next step
    pub fn queue_intent(&mut self, intent: Intent) {
        self.pending.push_intent(intent);
    }

    /// Accumulate a frame's wall time and run the fixed steps it covers.
    ///
    /// Returns the number of steps taken.
    pub fn advance(&mut self, frame_ms: f32) -> u32 {
        self.accumulator += frame_ms.clamp(0.0, MAX_FRAME_MS);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            self.step(SIM_DT_MS);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
        }
        substeps
    }

    /// One step with collisions from the built-in track
    pub fn step(&mut self, dt_ms: f32) {
        let mut input = self.track.advance(&self.session, dt_ms);
        let intents = std::mem::take(&mut self.pending);
        input.left = intents.left;
        input.right = intents.right;
        input.jump = intents.jump;
        input.slide = intents.slide;
        input.turbo = intents.turbo;
        self.tick_and_dispatch(&input, dt_ms);
    }

    /// One step with caller-supplied overlaps and despawns.
    ///
    /// For hosts doing their own collision detection; the track still follows
    /// spawn and destroy events.
    pub fn step_with(&mut self, input: &TickInput, dt_ms: f32) {
        self.pending.clear();
        self.tick_and_dispatch(input, dt_ms);
    }

    /// End the run early (quit); banks the record like a death would
    pub fn finish(&mut self) {
        self.session.end();
        self.dispatch();
    }

    fn tick_and_dispatch(&mut self, input: &TickInput, dt_ms: f32) {
        tick(&mut self.session, input, dt_ms);
        self.dispatch();
    }

    fn dispatch(&mut self) {
        for event in self.session.drain_events() {
            self.track.apply_event(&event);
            self.route(&event);
            self.sink.emit(event);
        }
    }

    fn route(&mut self, event: &GameEvent) {
        match event {
            GameEvent::MissionProgress { counter, delta } => {
                for mission in missions::for_counter(*counter) {
                    self.report(mission, *delta);
                }
            }
            GameEvent::StageChanged { index } => {
                for mission in missions::for_stage(*index) {
                    self.report(mission, 1);
                }
            }
            GameEvent::SessionEnded(record) => {
                if self.outcome.is_some() {
                    return;
                }
                self.persistence.add_currency(record.currency);
                let outcome = self
                    .persistence
                    .record_session_result(record.score, record.distance);
                if outcome.is_new_high_score {
                    log::info!("New high score: {}", record.score);
                }
                self.outcome = Some(outcome);
            }
            _ => {}
        }
    }

    fn report(&mut self, mission: &'static missions::Mission, delta: u64) {
        if self.persistence.report_mission_progress(mission.id, delta) {
            self.sink.emit(GameEvent::MissionCompleted {
                id: mission.id.to_string(),
                text: mission.toast.to_string(),
                reward: mission.reward,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SaveManager;
    use crate::platform::MemoryStorage;
    use crate::sim::{EntityKind, ObstacleKind, PowerUpKind};

    fn controller(coins_done: u64) -> RunController<SaveManager<MemoryStorage>, Vec<GameEvent>> {
        let mut save = SaveManager::open(MemoryStorage::new()).with_clock(|| "01/01/2026".to_string());
        save.update_mission_progress("collect_beans_total", coins_done);
        let tuning = Tuning {
            speed_increment: 0.0,
            ..Default::default()
        };
        RunController::new(save, Vec::new(), 7, Food::Beans, tuning)
    }

    /// Register an entity on the session without going through the spawner
    fn insert(ctl: &mut RunController<SaveManager<MemoryStorage>, Vec<GameEvent>>, kind: EntityKind) -> u32 {
        let id = ctl.session.next_entity_id();
        ctl.session.entities.insert(id, kind);
        id
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<GameEvent> = Vec::new();
        sink.emit(GameEvent::TurboEnded);
        assert_eq!(sink, vec![GameEvent::TurboEnded]);
    }

    #[test]
    fn test_coin_completes_mission_once() {
        let mut ctl = controller(999);
        let a = insert(&mut ctl, EntityKind::Coin);
        let b = insert(&mut ctl, EntityKind::Coin);
        ctl.step_with(&TickInput { overlaps: vec![a], ..Default::default() }, SIM_DT_MS);
        ctl.step_with(&TickInput { overlaps: vec![b], ..Default::default() }, SIM_DT_MS);

        let completed: Vec<_> = ctl
            .sink()
            .iter()
            .filter(|e| matches!(e, GameEvent::MissionCompleted { .. }))
            .collect();
        assert_eq!(
            completed,
            vec![&GameEvent::MissionCompleted {
                id: "collect_beans_total".to_string(),
                text: "Bean Master! (+500)".to_string(),
                reward: 500,
            }]
        );
        assert_eq!(ctl.persistence().coins(), 500);
        assert_eq!(ctl.persistence().mission_progress("collect_beans_total"), 1001);
    }

    #[test]
    fn test_stage_change_pays_stage_mission() {
        let mut ctl = controller(0);
        // Beans start at 720 units/s: 1000 distance takes ~13.9 s
        for _ in 0..900 {
            ctl.step_with(&TickInput::default(), SIM_DT_MS);
        }
        assert!(ctl.sink().contains(&GameEvent::StageChanged { index: 1 }));
        assert!(ctl.sink().iter().any(|e| matches!(
            e,
            GameEvent::MissionCompleted { id, reward: 200, .. } if id == "reach_stomach"
        )));
        assert_eq!(ctl.persistence().coins(), 200);
    }

    #[test]
    fn test_session_end_banks_currency_and_records() {
        let mut ctl = controller(0);
        let coin = insert(&mut ctl, EntityKind::Coin);
        let trap = insert(&mut ctl, EntityKind::Obstacle(ObstacleKind::Trap));
        ctl.step_with(&TickInput { overlaps: vec![coin], ..Default::default() }, SIM_DT_MS);
        ctl.step_with(&TickInput { overlaps: vec![trap], ..Default::default() }, SIM_DT_MS);

        assert!(ctl.is_over());
        let outcome = ctl.outcome().unwrap();
        assert!(outcome.is_new_high_score);
        assert_eq!(outcome.leaderboard_rank, Some(1));
        assert_eq!(ctl.persistence().coins(), 1);
        assert_eq!(ctl.persistence().data().leaderboard.entries.len(), 1);

        // Further steps change nothing
        ctl.step_with(&TickInput { overlaps: vec![trap], ..Default::default() }, SIM_DT_MS);
        ctl.advance(1000.0);
        let ended = ctl
            .sink()
            .iter()
            .filter(|e| matches!(e, GameEvent::SessionEnded(_)))
            .count();
        assert_eq!(ended, 1);
        assert_eq!(ctl.persistence().data().leaderboard.entries.len(), 1);
    }

    #[test]
    fn test_finish_records_once() {
        let mut ctl = controller(0);
        ctl.advance(50.0);
        ctl.finish();
        ctl.finish();
        assert!(ctl.is_over());
        assert_eq!(ctl.persistence().data().leaderboard.entries.len(), 1);
    }

    #[test]
    fn test_loadout_comes_from_persistence() {
        let mut save = SaveManager::open(MemoryStorage::new());
        save.add_coins(1000);
        assert!(save.purchase_upgrade(PowerUpKind::Invincibility, 200));
        let ctl = RunController::new(save, (), 1, Food::Chili, Tuning::default());
        assert_eq!(ctl.session().loadout.invincibility_level, 1);
    }

    #[test]
    fn test_advance_fixed_steps() {
        let mut ctl = controller(0);
        assert_eq!(ctl.advance(10.0), 0);
        assert_eq!(ctl.advance(10.0), 1);
        // Long frames are clamped and capped
        assert_eq!(ctl.advance(10_000.0), 6);
        assert!((ctl.session().time_ms - 7.0 * SIM_DT_MS as f64).abs() < 0.01);
    }

    #[test]
    fn test_queued_intent_applies_next_step() {
        let mut ctl = controller(0);
        ctl.queue_intent(Intent::Right);
        ctl.step(SIM_DT_MS);
        assert_eq!(ctl.session().lanes.target(), Some(2));
        // Spawns reach the track
        assert!(!ctl.track().is_empty());
    }
}
