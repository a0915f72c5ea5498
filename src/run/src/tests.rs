//! Tests for the run lifecycle and meta progression

use crate::*;
use combat::KillKind;

#[derive(Default)]
struct RecordingHooks {
    resets: u32,
    floors: Vec<FloorInfo>,
}

impl RunHooks for RecordingHooks {
    fn reset_player(&mut self, _run: &RunState) {
        self.resets += 1;
    }

    fn enter_floor(&mut self, _run: &RunState, floor: FloorInfo) {
        self.floors.push(floor);
    }
}

fn started(range: std::ops::RangeInclusive<u32>) -> (RunManager, RecordingHooks) {
    let mut manager = RunManager::new(range);
    let mut hooks = RecordingHooks::default();
    manager.start_new_run(Some(42), DEFAULT_REGION, 1_000, &mut hooks);
    (manager, hooks)
}

#[test]
fn test_start_invokes_hooks() {
    let (manager, hooks) = started(10..=15);
    let run = manager.run().unwrap();

    assert_eq!(manager.phase(), RunPhase::Active);
    assert_eq!(hooks.resets, 1);
    assert_eq!(hooks.floors[0].floor_number, 1);
    assert!((10..=15).contains(&run.max_floor));
    assert_eq!(run.run_id, "run-000000000000002a");
    assert_eq!(run.current_floor, 1);
}

#[test]
fn test_same_seed_same_length() {
    let (a, _) = started(10..=15);
    let (b, _) = started(10..=15);
    assert_eq!(a.run().unwrap().max_floor, b.run().unwrap().max_floor);
}

#[test]
fn test_boss_floor_predicate() {
    assert!(is_boss_floor(5, 12));
    assert!(is_boss_floor(10, 12));
    assert!(is_boss_floor(12, 12));
    assert!(!is_boss_floor(11, 12));
    // the final floor is a boss floor even when it is a multiple of five
    assert!(is_boss_floor(15, 15));
    let last = FloorInfo::for_floor(15, 15);
    assert!(last.is_final_floor && last.is_boss_floor);
}

#[test]
fn test_clearing_every_floor_wins() {
    let (mut manager, mut hooks) = started(3..=3);

    assert!(matches!(
        manager.on_floor_completed(2_000, &mut hooks),
        FloorTransition::NextFloor(FloorInfo { floor_number: 2, .. })
    ));
    manager.on_floor_completed(3_000, &mut hooks);
    let FloorTransition::Victory(result) = manager.on_floor_completed(4_000, &mut hooks) else {
        panic!("expected victory");
    };

    assert!(result.victory);
    assert_eq!(result.floors_cleared, 3);
    assert_eq!(result.deepest_floor, 3);
    assert_eq!(result.duration_ms, 3_000);
    assert_eq!(manager.phase(), RunPhase::Finished { victory: true });
    assert_eq!(hooks.floors.len(), 3);
}

#[test]
fn test_finalize_is_idempotent() {
    let (mut manager, _) = started(10..=10);
    manager.record_kill(KillKind::Elite);

    let first = manager.on_player_death(5_000);
    assert!(first.is_some());
    let frozen = manager.run().cloned();

    assert!(manager.finalize(true, 9_000).is_none());
    manager.record_kill(KillKind::Boss);
    manager.add_meta_currency(10);
    assert_eq!(manager.run().cloned(), frozen);
    assert_eq!(manager.phase(), RunPhase::Finished { victory: false });
}

#[test]
fn test_kill_counters() {
    let (mut manager, _) = started(10..=10);
    manager.record_kill(KillKind::Regular);
    manager.record_kill(KillKind::Elite);
    manager.record_kill(KillKind::MiniBoss);
    manager.record_kill(KillKind::Boss);
    manager.on_mutation_chosen();

    let run = manager.run().unwrap();
    assert_eq!(run.enemies_killed, 4);
    assert_eq!(
        (run.elites_killed, run.mini_bosses_killed, run.bosses_killed),
        (1, 1, 1)
    );
    assert_eq!(run.mutations_chosen, 1);
}

#[test]
fn test_recorders_ignored_before_start() {
    let mut manager = RunManager::default();
    manager.record_kill(KillKind::Regular);
    assert_eq!(manager.phase(), RunPhase::NotStarted);
    assert!(manager.on_player_death(1).is_none());
}

#[test]
fn test_shard_formula() {
    let result = RunResult {
        run_id: "r".into(),
        region_id: DEFAULT_REGION.into(),
        victory: true,
        floors_cleared: 4,
        deepest_floor: 5,
        enemies_killed: 20,
        elites_killed: 2,
        mini_bosses_killed: 1,
        bosses_killed: 1,
        mutations_chosen: 3,
        meta_currency_earned: 7,
        duration_ms: 0,
    };
    // 20 + 6 + 8 + 20 + 7 + 50
    assert_eq!(result.shards(), 111);
}

#[test]
fn test_end_run_banks_shards_and_unlocks_region() {
    let (mut manager, _) = started(10..=10);
    manager.record_kill(KillKind::Boss);
    let mut profile = MetaProfile::default();

    let (result, reward) = RunEndManager::end_run(&mut manager, true, 2_000, &mut profile).unwrap();
    assert_eq!(reward.shards, result.shards());
    assert_eq!(profile.titan_shards, 70);
    assert_eq!(profile.runs_won, 1);
    assert_eq!(reward.unlocked_region.as_deref(), Some(ASHEN_DEPTHS));
    assert!(profile.is_region_unlocked(ASHEN_DEPTHS));

    assert!(RunEndManager::end_run(&mut manager, true, 3_000, &mut profile).is_none());
    assert_eq!(profile.titan_shards, 70);
}

#[test]
fn test_upgrade_purchase() {
    let mut profile = MetaProfile {
        titan_shards: 30,
        ..Default::default()
    };
    assert_eq!(profile.purchase(MetaUpgrade::Vitality), Ok(1));
    assert_eq!(profile.purchase(MetaUpgrade::Vitality), Ok(2));
    assert_eq!(profile.titan_shards, 0);
    assert_eq!(
        profile.purchase(MetaUpgrade::Vitality),
        Err(MetaError::InsufficientShards {
            needed: 30,
            available: 0
        })
    );
    assert_eq!(profile.starting_bonuses().max_hp, 10);

    profile.titan_shards = 1_000;
    for _ in 0..3 {
        profile.purchase(MetaUpgrade::Provisions).unwrap();
    }
    assert_eq!(
        profile.purchase(MetaUpgrade::Provisions),
        Err(MetaError::MaxLevel(MetaUpgrade::Provisions))
    );
}

#[test]
fn test_upgrade_offers_and_names() {
    let mut profile = MetaProfile::default();
    profile.upgrade_levels.insert(MetaUpgrade::Might, 2);
    profile.upgrade_levels.insert(MetaUpgrade::Provisions, 3);

    let offers = profile.upgrade_offers();
    assert_eq!(offers.len(), 4);
    assert!(offers.contains(&(MetaUpgrade::Vitality, 0, Some(10))));
    assert!(offers.contains(&(MetaUpgrade::Might, 2, Some(45))));
    assert!(offers.contains(&(MetaUpgrade::Provisions, 3, None)));

    assert_eq!("plating".parse::<MetaUpgrade>().ok(), Some(MetaUpgrade::Plating));
    assert_eq!("Vitality".parse::<MetaUpgrade>().ok(), Some(MetaUpgrade::Vitality));
    assert!("speed".parse::<MetaUpgrade>().is_err());
}

#[test]
fn test_serialization_profile() {
    let mut profile = MetaProfile::default();
    profile.upgrade_levels.insert(MetaUpgrade::Might, 2);
    profile.titan_shards = 12;

    let json = serde_json::to_string(&profile).expect("Failed to serialize to JSON");
    assert!(json.contains("titanShards"));
    let back: MetaProfile = serde_json::from_str(&json).expect("Failed to deserialize from JSON");
    assert_eq!(back, profile);
}
