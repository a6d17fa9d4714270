//! Whole runs driven through the controller, track and save manager

use gut_runner::consts::SIM_DT_MS;
use gut_runner::persistence::{Persistence, SaveManager};
use gut_runner::platform::{MemoryStorage, Storage};
use gut_runner::run::RunController;
use gut_runner::sim::{Food, GameEvent, PowerUpKind};
use gut_runner::{Settings, Tuning, shop};

type Controller = RunController<SaveManager<MemoryStorage>, Vec<GameEvent>>;

/// Two simulated minutes
const MAX_STEPS: u32 = 60 * 120;

fn fixed_date() -> String {
    "16/10/2026".to_string()
}

fn play(mut ctl: Controller) -> Controller {
    for _ in 0..MAX_STEPS {
        if ctl.is_over() {
            break;
        }
        if let Some(intent) = ctl.track().autopilot(ctl.session(), 350.0) {
            ctl.queue_intent(intent);
        }
        ctl.step(SIM_DT_MS);
    }
    ctl.finish();
    ctl
}

fn new_run(storage: MemoryStorage, seed: u64, food: Food) -> Controller {
    let save = SaveManager::open(storage).with_clock(fixed_date);
    RunController::new(save, Vec::new(), seed, food, Tuning::default())
}

#[test]
fn test_run_ends_exactly_once() {
    let ctl = play(new_run(MemoryStorage::new(), 2024, Food::Beans));

    let ended: Vec<_> = ctl
        .sink()
        .iter()
        .filter_map(|e| match e {
            GameEvent::SessionEnded(record) => Some(*record),
            _ => None,
        })
        .collect();
    assert_eq!(ended.len(), 1);
    assert_eq!(ctl.session().record(), Some(ended[0]));
    assert!(ended[0].distance > 0);

    let save = ctl.persistence();
    assert_eq!(save.data().leaderboard.entries.len(), 1);
    assert_eq!(save.data().high_score, ended[0].score);
}

#[test]
fn test_equal_seeds_replay_identically() {
    let a = play(new_run(MemoryStorage::new(), 99, Food::Chili));
    let b = play(new_run(MemoryStorage::new(), 99, Food::Chili));
    assert_eq!(a.sink(), b.sink());
    assert_eq!(a.session().record(), b.session().record());
}

#[test]
fn test_progress_survives_reopen() {
    let ctl = play(new_run(MemoryStorage::new(), 5, Food::Onion));
    let record = ctl.session().record().unwrap();
    let banked = ctl.persistence().coins();
    assert!(banked >= record.currency);
    let collected: u64 = ctl
        .sink()
        .iter()
        .filter(|e| matches!(e, GameEvent::MissionProgress { .. }))
        .count() as u64;

    let storage = ctl.persistence().storage().clone();
    let reopened = SaveManager::open(storage);
    assert_eq!(reopened.coins(), banked);
    assert_eq!(reopened.data().leaderboard.entries[0].score, record.score);
    assert_eq!(reopened.data().leaderboard.entries[0].date, "16/10/2026");
    assert!(reopened.mission_progress("collect_beans_total") <= collected);
}

#[test]
fn test_shop_purchases_shape_next_run() {
    let mut save = SaveManager::open(MemoryStorage::new()).with_clock(fixed_date);
    save.add_coins(40);
    assert!(!save.spend_coins(50));
    assert_eq!(save.coins(), 40);

    save.add_coins(560);
    assert!(shop::purchase_upgrade(&mut save, PowerUpKind::Magnet));
    assert!(shop::purchase_skin(&mut save, "toxic"));
    assert_eq!(save.coins(), 300);

    let ctl = RunController::new(save, (), 1, Food::Beans, Tuning::default());
    assert_eq!(ctl.session().loadout.magnet_level, 1);
    assert_eq!(ctl.session().loadout.cosmetic, "toxic");
    assert_eq!(ctl.persistence().upgrade_level(PowerUpKind::Magnet), 1);
}

#[test]
fn test_settings_share_storage_with_save() {
    let mut storage = MemoryStorage::new();
    let settings = Settings {
        reduced_motion: true,
        ..Default::default()
    };
    settings.save(&mut storage);

    let save = SaveManager::open(storage);
    assert_eq!(Settings::load(save.storage()), settings);
    assert!(save.storage().read(Settings::STORAGE_KEY).unwrap().is_some());
}
