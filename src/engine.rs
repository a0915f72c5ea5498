//! Turn resolution.
//!
//! `GameEngine` owns the run lifecycle, the meta profile and the `World`
//! (current floor, player, id counters and the combat RNG). Every call to
//! `process_action` runs a whole turn and returns the events it produced, in
//! order.

use combat::{Combat, Direction, Intent, Position, RunRng};
use dungeon::{DungeonGenerator, Entity, FloorKind, IdAllocator, Level, TileType, floor_seed};
use hero::{DefaultStatGrowth, InventoryError, MutationManager, PlayerState};
use items::{
    BossLoot, ConsumableEffect, EquipmentDrops, EquipmentKey, Item, ItemType, LootDrop, MaterialTier,
    TemplateCatalog, WeaponType,
};
use run::{
    DEFAULT_REGION, FloorInfo, FloorTransition, MetaProfile, RunEndManager, RunHooks, RunManager, RunPhase,
    RunResult, RunState, StartingBonuses,
};
use save::{PlayerSnapshot, RunSnapshot, SAVE_VERSION};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::action::GameAction;
use crate::ai;
use crate::config::GameConfig;
use crate::event::GameEvent;
use crate::turn_system::{ActionCost, TurnState, TurnSystem};

mod player_defaults {
    pub const NAME: &str = "Wanderer";
    pub const MAX_HP: u32 = 30;
    pub const ATTACK: u32 = 4;
    pub const DEFENSE: u32 = 1;
    pub const HEALTH_POTIONS: u32 = 2;
}

const POISON_TURNS: u32 = 3;
const COMBAT_STREAM: u64 = 0xC0B7_A7;

/// Wall-clock time in epoch milliseconds
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

/// Floor, player and the services that build them. Implements `RunHooks`
/// so the run lifecycle can reset the player and swap floors.
struct World {
    width: i32,
    height: i32,
    fov_radius: u32,
    inventory_capacity: usize,
    generator: DungeonGenerator,
    catalog: TemplateCatalog,
    mutations: MutationManager,
    bonuses: StartingBonuses,
    ids: IdAllocator,
    rng: RunRng,
    level: Level,
    player_id: u64,
    /// The player while not on a floor: before the first floor and after death
    offboard: Option<Entity>,
    events: Vec<GameEvent>,
}

impl World {
    fn new(config: &GameConfig) -> Self {
        Self {
            width: config.board_width,
            height: config.board_height,
            fov_radius: config.fov_radius,
            inventory_capacity: config.inventory_capacity,
            generator: DungeonGenerator::default(),
            catalog: TemplateCatalog::new(),
            mutations: MutationManager::new(config.mutation_choice_range()),
            bonuses: StartingBonuses::default(),
            ids: IdAllocator::default(),
            rng: RunRng::from_entropy(),
            level: Level::new(config.board_width, config.board_height, 0),
            player_id: 0,
            offboard: None,
            events: Vec::new(),
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn message(&mut self, text: impl Into<String>) {
        self.events.push(GameEvent::message(text));
    }

    fn player(&self) -> Option<&Entity> {
        self.level.player().or(self.offboard.as_ref())
    }

    fn player_position(&self) -> Option<(u64, Position)> {
        self.level.player().map(|p| (p.id, p.position))
    }

    fn stats_changed(&mut self) {
        if let Some(stats) = self.player().map(|p| p.stats) {
            self.emit(GameEvent::PlayerStatsChanged(stats));
        }
    }

    fn refresh_fov(&mut self) {
        if let Some((_, origin)) = self.player_position() {
            self.level.update_visibility(origin, self.fov_radius);
        }
    }

    /// Fresh level-1 player with the starting kit and purchased bonuses
    fn build_player(&mut self) -> Entity {
        let bonuses = self.bonuses;
        let mut stats = combat::Stats::new(
            player_defaults::MAX_HP + bonuses.max_hp,
            player_defaults::ATTACK + bonuses.attack,
            player_defaults::DEFENSE,
        )
        .with_armor(bonuses.max_armor);
        let mut state = PlayerState::new(self.inventory_capacity);

        let dagger = Item::equipment(
            self.ids.allocate_item_id(),
            EquipmentKey::Weapon {
                material: MaterialTier::Wood,
                weapon_type: WeaponType::Dagger,
            },
        );
        if let Err(e) = state.inventory.add(dagger).and_then(|id| state.equip(id, &mut stats)) {
            tracing::warn!("Starting weapon not equipped: {}", e);
        }

        let potions = Item::new(
            self.ids.allocate_item_id(),
            ItemType::MinorHealthPotion,
            player_defaults::HEALTH_POTIONS + bonuses.health_potions,
        );
        if let Err(e) = state.inventory.add(potions) {
            tracing::warn!("Starting potions not added: {}", e);
        }

        Entity::player(
            self.ids.allocate_entity_id(),
            player_defaults::NAME,
            Position::default(),
            stats,
            state,
        )
    }

    /// Builds the floor from its seed and drops the player on the spawn tile
    fn place_player(&mut self, mut player: Entity, floor: FloorInfo, run_seed: u64) {
        let mut layout_rng = RunRng::new(floor_seed(run_seed, floor.floor_number));
        let kind = if floor.is_boss_floor {
            FloorKind::Boss
        } else {
            FloorKind::Regular
        };
        let mut level = self.generator.generate(
            self.width,
            self.height,
            floor.floor_number,
            kind,
            &mut self.ids,
            &mut layout_rng,
        );
        player.position = level.player_spawn;
        level.add_entity(player);
        self.level = level;
        self.refresh_fov();
        self.emit(GameEvent::LevelGenerated {
            depth: floor.floor_number,
            is_boss_floor: floor.is_boss_floor,
        });
    }
}

impl RunHooks for World {
    fn reset_player(&mut self, run: &RunState) {
        self.ids = IdAllocator::default();
        self.rng = RunRng::new(run.seed).fork(COMBAT_STREAM);
        self.level = Level::new(self.width, self.height, 0);
        let player = self.build_player();
        self.player_id = player.id;
        self.offboard = Some(player);
    }

    fn enter_floor(&mut self, run: &RunState, floor: FloorInfo) {
        let player = self
            .offboard
            .take()
            .or_else(|| self.level.remove_entity(self.player_id));
        match player {
            Some(player) => self.place_player(player, floor, run.seed),
            None => tracing::error!("No player to place on floor {}", floor.floor_number),
        }
    }
}

pub struct GameEngine {
    runs: RunManager,
    profile: MetaProfile,
    world: World,
    turns: TurnSystem,
}

impl GameEngine {
    pub fn new(config: &GameConfig, profile: MetaProfile) -> Self {
        Self {
            runs: RunManager::new(config.max_floor_range()),
            profile,
            world: World::new(config),
            turns: TurnSystem::new(),
        }
    }

    /// Rebuilds an engine around a saved run. The floor is regenerated from
    /// its depth; the player keeps stats, inventory and mutations.
    pub fn resume(config: &GameConfig, snapshot: RunSnapshot, profile: MetaProfile) -> Self {
        let mut engine = Self::new(config, profile);
        let RunSnapshot {
            run,
            player,
            dungeon,
            ids,
            turn,
            ..
        } = snapshot;

        let last_item = player
            .progress
            .inventory
            .items()
            .iter()
            .map(|i| i.id)
            .max()
            .unwrap_or(0);
        engine.world.ids = ids;
        engine.world.ids.reserve_past(player.id, last_item);
        engine.world.rng = RunRng::new(run.seed).fork(COMBAT_STREAM ^ turn);

        let mut entity = Entity::player(
            player.id,
            player.name,
            Position::default(),
            player.stats,
            player.progress,
        );
        entity.glyph = player.glyph;
        engine.world.player_id = entity.id;
        engine.world.place_player(entity, dungeon.floor_info(), run.seed);

        engine.runs.restore(run);
        engine.turns = TurnSystem::resumed_at(turn);
        engine.world.stats_changed();
        engine
    }

    pub fn start_new_run(&mut self, seed: Option<u64>) -> Vec<GameEvent> {
        self.start_new_run_in(DEFAULT_REGION, seed)
    }

    /// Starts a run in `region`, falling back to the default region when it
    /// is still locked
    pub fn start_new_run_in(&mut self, region: &str, seed: Option<u64>) -> Vec<GameEvent> {
        self.world.events.clear();
        let region = if self.profile.is_region_unlocked(region) {
            region
        } else {
            tracing::warn!("Region {} is locked, starting in {}", region, DEFAULT_REGION);
            DEFAULT_REGION
        };

        self.profile.record_run_started();
        self.world.bonuses = self.profile.starting_bonuses();
        self.turns = TurnSystem::new();
        self.runs
            .start_new_run(seed, region, now_ms(), &mut self.world);
        self.world.stats_changed();
        self.world.message("You enter the depths.");
        self.take_events()
    }

    /// Resolves one action and, when it consumed the turn, the enemy phase
    pub fn process_action(&mut self, action: GameAction) -> Vec<GameEvent> {
        match self.runs.phase() {
            RunPhase::NotStarted => {
                self.world.message("No run in progress.");
                return self.take_events();
            }
            RunPhase::Finished { .. } => {
                self.world.message("The run is over. Start a new run to play again.");
                return self.take_events();
            }
            RunPhase::Active if self.turns.is_terminal() => {
                self.world.message("The run is over. Start a new run to play again.");
                return self.take_events();
            }
            RunPhase::Active => {}
        }

        tracing::debug!("Turn {}: {:?}", self.turns.turn(), action);
        self.turns.begin_player_action();
        let cost = self.resolve_player_action(action);
        self.turns.end_player_action(cost);

        if cost.consumed() && !self.turns.is_terminal() {
            self.regenerate();
            if cost == ActionCost::Turn {
                self.turns.begin_enemy_phase();
                self.run_enemy_phase();
            }
        }
        if !self.turns.is_terminal() {
            self.world.refresh_fov();
        }
        self.turns.finish_turn();
        self.take_events()
    }

    /// Saveable state of the active run; `None` once it has ended
    pub fn snapshot(&self) -> Option<RunSnapshot> {
        let run = self.runs.run().filter(|r| !r.is_finished)?;
        let player = self.world.level.player()?;
        let progress = player.as_player()?.clone();
        Some(RunSnapshot {
            version: SAVE_VERSION,
            run: run.clone(),
            player: PlayerSnapshot {
                id: player.id,
                name: player.name.clone(),
                glyph: player.glyph,
                stats: player.stats,
                progress,
            },
            dungeon: FloorInfo::for_floor(run.current_floor, run.max_floor).into(),
            ids: self.world.ids.clone(),
            turn: self.turns.turn(),
        })
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.world.events)
    }

    pub fn level(&self) -> &Level {
        &self.world.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.world.level
    }

    /// The player entity, on the floor or fallen
    pub fn player(&self) -> Option<&Entity> {
        self.world.player()
    }

    pub fn player_state(&self) -> Option<&PlayerState> {
        self.world.player().and_then(Entity::as_player)
    }

    pub fn run(&self) -> Option<&RunState> {
        self.runs.run()
    }

    pub fn run_phase(&self) -> RunPhase {
        self.runs.phase()
    }

    pub fn profile(&self) -> &MetaProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut MetaProfile {
        &mut self.profile
    }

    pub fn turn_state(&self) -> TurnState {
        self.turns.state()
    }

    pub fn turn(&self) -> u64 {
        self.turns.turn()
    }

    fn resolve_player_action(&mut self, action: GameAction) -> ActionCost {
        match action {
            GameAction::Move(direction) => self.try_move(direction),
            GameAction::Wait => ActionCost::Turn,
            GameAction::DescendStairs => self.descend(),
            GameAction::UseItem(id) => self.use_item(id),
            GameAction::EquipItem(id) => self.equip_item(id),
            GameAction::PickUp => self.pick_up(),
            GameAction::MoveTo(x, y) => self.move_towards(Position::new(x, y)),
            GameAction::ChooseMutation(id) => self.choose_mutation(&id),
        }
    }

    fn try_move(&mut self, direction: Direction) -> ActionCost {
        let Some((id, from)) = self.world.player_position() else {
            return ActionCost::Free;
        };
        self.step_player(id, from, from.step(direction))
    }

    fn move_towards(&mut self, target: Position) -> ActionCost {
        let Some((id, from)) = self.world.player_position() else {
            return ActionCost::Free;
        };
        if !self.world.level.in_bounds(target) {
            self.world.message("That spot is out of reach.");
            return ActionCost::Free;
        }
        if from == target {
            self.world.message("You are already there.");
            return ActionCost::Free;
        }
        match self.world.level.next_step_towards(from, target) {
            Some(step) => self.step_player(id, from, step),
            None => {
                self.world.message("You can't find a way there.");
                ActionCost::Free
            }
        }
    }

    /// Moves into `to`, or attacks whoever stands there
    fn step_player(&mut self, id: u64, from: Position, to: Position) -> ActionCost {
        if !self.world.level.in_bounds(to) {
            self.world.message("You can't go that way.");
            return ActionCost::Free;
        }
        let occupant = self
            .world
            .level
            .entity_at(to)
            .filter(|e| e.id != id)
            .map(|e| e.id);
        if let Some(target) = occupant {
            self.player_attack(target);
            return ActionCost::Turn;
        }
        if !self.world.level.move_entity(id, to) {
            self.world.message("Something blocks your way.");
            return ActionCost::Free;
        }
        self.world.emit(GameEvent::EntityMoved {
            entity: id,
            from,
            to,
        });
        self.on_player_entered(to);
        ActionCost::Turn
    }

    fn on_player_entered(&mut self, pos: Position) {
        match self.world.level.tile(pos).tile_type {
            TileType::Trap => {
                let damage = 2 + self.world.level.depth / 3;
                self.world
                    .message(format!("A trap springs! You take {damage} damage."));
                self.damage_player(None, damage);
            }
            TileType::StairsDown => self.world.emit(GameEvent::PlayerSteppedOnStairs),
            _ => {}
        }
        let names: Vec<String> = self.world.level.items_at(pos).map(Item::name).collect();
        if !names.is_empty() {
            self.world
                .message(format!("You see here: {}.", names.join(", ")));
        }
    }

    fn descend(&mut self) -> ActionCost {
        let Some((_, pos)) = self.world.player_position() else {
            return ActionCost::Free;
        };
        if self.world.level.tile(pos).tile_type != TileType::StairsDown {
            self.world.message("There are no stairs here.");
            return ActionCost::Free;
        }
        if self.world.level.boss_alive() {
            self.world
                .message("A dark force seals the stairs. Defeat the guardian first.");
            return ActionCost::Free;
        }

        match self.runs.on_floor_completed(now_ms(), &mut self.world) {
            FloorTransition::NextFloor(info) => {
                self.world.emit(GameEvent::PlayerDescended {
                    depth: info.floor_number,
                });
                ActionCost::FloorChange
            }
            FloorTransition::Victory(result) => {
                self.world.message("You have conquered the depths!");
                self.turns.run_complete();
                self.finish_run(result);
                ActionCost::FloorChange
            }
            FloorTransition::Ignored => ActionCost::Free,
        }
    }

    fn use_item(&mut self, item_id: u64) -> ActionCost {
        let Some(item) = self
            .world
            .player()
            .and_then(Entity::as_player)
            .and_then(|p| p.inventory.get(item_id))
        else {
            self.world.message("You don't have that item.");
            return ActionCost::Free;
        };
        if item.item_type.is_equipment() {
            return self.equip_item(item_id);
        }
        let name = item.name();
        let Some(effect) = item.item_type.effect() else {
            self.world.message(format!("The {name} cannot be used."));
            return ActionCost::Free;
        };

        let World { level, events, .. } = &mut self.world;
        let Some((stats, state)) = level.player_mut().and_then(|p| p.player_parts_mut()) else {
            return ActionCost::Free;
        };
        if let Err(e) = state.inventory.remove_one(item_id) {
            events.push(GameEvent::message(e.to_string()));
            return ActionCost::Free;
        }

        let text = match effect {
            ConsumableEffect::Heal(amount) => {
                let healed = stats.heal(amount);
                format!("You use the {name} and recover {healed} HP.")
            }
            ConsumableEffect::RestoreArmor(amount) => {
                let restored = stats.restore_armor(amount);
                format!("You use the {name} and mend {restored} armor.")
            }
            ConsumableEffect::RaiseMaxHp(amount) => {
                stats.raise_max_hp(amount);
                format!("You use the {name}. Max HP +{amount}.")
            }
            ConsumableEffect::RaiseAttack(amount) => {
                stats.attack += amount;
                format!("You use the {name}. Attack +{amount}.")
            }
            ConsumableEffect::RaiseDefense(amount) => {
                stats.defense += amount;
                format!("You use the {name}. Defense +{amount}.")
            }
            ConsumableEffect::RaiseMaxArmor(amount) => {
                stats.adjust_max_armor(amount as i64);
                format!("You use the {name}. Max armor +{amount}.")
            }
            ConsumableEffect::FullRestore => {
                let max_armor = stats.max_armor;
                stats.heal_full();
                stats.restore_armor(max_armor);
                format!("You use the {name} and are fully restored.")
            }
            ConsumableEffect::GrantXp(_) | ConsumableEffect::GrantShards(_) => {
                format!("You use the {name}.")
            }
        };
        events.push(GameEvent::Message(text));
        events.push(GameEvent::InventoryChanged);

        match effect {
            ConsumableEffect::GrantXp(amount) => self.grant_xp(amount),
            ConsumableEffect::GrantShards(amount) => {
                self.runs.add_meta_currency(amount);
                self.world
                    .message(format!("{amount} Titan Shards hum in your pack."));
            }
            _ => {}
        }
        self.world.stats_changed();
        ActionCost::Turn
    }

    fn equip_item(&mut self, item_id: u64) -> ActionCost {
        let World { level, events, .. } = &mut self.world;
        let Some((stats, state)) = level.player_mut().and_then(|p| p.player_parts_mut()) else {
            return ActionCost::Free;
        };
        match state.equip(item_id, stats) {
            Ok(outcome) => {
                events.push(GameEvent::message(format!("You equip the {}.", outcome.name)));
                events.push(GameEvent::InventoryChanged);
                events.push(GameEvent::PlayerStatsChanged(*stats));
                ActionCost::Turn
            }
            Err(e) => {
                let text = match e {
                    InventoryError::NotFound(_) => "You don't have that item.".to_string(),
                    InventoryError::NotEquipment(_) => "That can't be equipped.".to_string(),
                    InventoryError::AlreadyEquipped(_) => "You already have that equipped.".to_string(),
                    other => other.to_string(),
                };
                events.push(GameEvent::Message(text));
                ActionCost::Free
            }
        }
    }

    fn pick_up(&mut self) -> ActionCost {
        let Some((_, pos)) = self.world.player_position() else {
            return ActionCost::Free;
        };
        let here: Vec<u64> = self.world.level.items_at(pos).map(|i| i.id).collect();
        if here.is_empty() {
            self.world.message("There is nothing here to pick up.");
            return ActionCost::Free;
        }

        let mut picked = 0;
        for item_id in here {
            let World { level, events, .. } = &mut self.world;
            let Some(item) = level.take_item(item_id) else {
                continue;
            };
            let Some(state) = level.player_mut().and_then(|p| p.player_parts_mut()).map(|(_, s)| s) else {
                level.drop_item(item, pos);
                break;
            };
            if !state.inventory.can_accept(&item) {
                level.drop_item(item, pos);
                events.push(GameEvent::message("Your pack is full."));
                break;
            }
            let name = item.name();
            match state.inventory.add(item) {
                Ok(_) => {
                    picked += 1;
                    events.push(GameEvent::message(format!("You pick up the {name}.")));
                }
                Err(e) => {
                    events.push(GameEvent::message(e.to_string()));
                    break;
                }
            }
        }

        if picked == 0 {
            return ActionCost::Free;
        }
        self.world.emit(GameEvent::InventoryChanged);
        ActionCost::Turn
    }

    fn choose_mutation(&mut self, mutation_id: &str) -> ActionCost {
        let World { level, events, .. } = &mut self.world;
        let Some((stats, state)) = level.player_mut().and_then(|p| p.player_parts_mut()) else {
            return ActionCost::Free;
        };
        match state.choose_mutation(mutation_id, stats) {
            Ok(()) => {
                let stats = *stats;
                events.push(GameEvent::MutationApplied {
                    mutation_id: mutation_id.to_string(),
                });
                events.push(GameEvent::PlayerStatsChanged(stats));
                self.runs.on_mutation_chosen();
            }
            Err(e) => events.push(GameEvent::message(format!("Cannot choose mutation: {e}"))),
        }
        ActionCost::Free
    }

    fn player_attack(&mut self, target: u64) {
        let Some(player) = self.world.level.player() else {
            return;
        };
        let attacker = player.id;
        let attack = player.stats.attack;
        let poison_chance = player
            .as_player()
            .map_or(0.0, |p| p.mutation_state.poison_chance_on_hit);

        let Some(enemy) = self.world.level.entity_mut(target) else {
            return;
        };
        let damage = Combat::damage(attack, enemy.stats.defense);
        let hit = Combat::apply(&mut enemy.stats, damage);
        let name = enemy.name.clone();

        self.world.emit(GameEvent::EntityAttacked {
            attacker,
            target,
            damage,
        });
        self.world
            .message(format!("You hit the {name} for {damage}."));
        if hit.killed {
            self.enemy_killed(target);
            return;
        }

        if poison_chance > 0.0 && self.world.rng.chance(poison_chance) {
            if let Some(state) = self
                .world
                .level
                .entity_mut(target)
                .and_then(|e| e.as_enemy_mut())
            {
                state.poison_turns = POISON_TURNS;
            }
            self.world.message(format!("The {name} is poisoned."));
        }
    }

    /// Removes a slain enemy and pays out XP, run counters and loot
    fn enemy_killed(&mut self, id: u64) {
        let Some(enemy) = self.world.level.remove_entity(id) else {
            return;
        };
        self.world.emit(GameEvent::EntityDied {
            entity: enemy.id,
            name: enemy.name.clone(),
        });
        let Some(state) = enemy.as_enemy() else {
            return;
        };

        let kind = state.kill_kind();
        self.runs.record_kill(kind);
        self.reward_kill(state.xp_reward);

        let depth = self.world.level.depth;
        let World {
            catalog, rng, ids, level, events, ..
        } = &mut self.world;
        let drops: Vec<LootDrop> = match &state.boss {
            Some(boss) if !boss.is_mini_boss => BossLoot::roll(boss.tier, catalog, rng),
            _ => EquipmentDrops::roll_drop(depth, catalog, rng)
                .map(LootDrop::equipment)
                .into_iter()
                .collect(),
        };
        for drop in drops {
            let item = drop.into_item(ids.allocate_item_id());
            events.push(GameEvent::message(format!(
                "The {} drops {}.",
                enemy.name,
                item.name()
            )));
            level.drop_item(item, enemy.position);
        }

        if kind == combat::KillKind::Boss {
            self.world.message("The seal on the stairs breaks.");
        }
    }

    fn reward_kill(&mut self, xp_reward: u32) {
        let xp = {
            let Some((stats, state)) = self
                .world
                .level
                .player_mut()
                .and_then(|p| p.player_parts_mut())
            else {
                return;
            };
            let bonuses = &state.mutation_state;
            if bonuses.heal_on_kill > 0 {
                stats.heal(bonuses.heal_on_kill);
            }
            bonuses.scaled_xp(xp_reward)
        };
        self.grant_xp(xp);
    }

    fn grant_xp(&mut self, amount: u32) {
        let World {
            level,
            rng,
            mutations,
            events,
            ..
        } = &mut self.world;
        let Some((stats, state)) = level.player_mut().and_then(|p| p.player_parts_mut()) else {
            return;
        };
        let level_ups = state.gain_xp(amount, stats, &DefaultStatGrowth, Some(&*mutations), rng);
        events.push(GameEvent::message(format!("You gain {amount} XP.")));
        for up in level_ups {
            events.push(GameEvent::PlayerLeveledUp {
                level: up.level,
                mutation_choices: up.choices,
            });
        }
        events.push(GameEvent::PlayerStatsChanged(*stats));
    }

    fn regenerate(&mut self) {
        let Some(player) = self.world.level.player_mut() else {
            return;
        };
        let regen = player
            .as_player()
            .map_or(0, |p| p.mutation_state.regeneration);
        if regen > 0 && player.stats.hp < player.stats.max_hp {
            player.stats.heal(regen);
            self.world.stats_changed();
        }
    }

    /// Every living enemy acts once, in level order. Stops the moment the
    /// player dies.
    fn run_enemy_phase(&mut self) {
        let depth = self.world.level.depth;
        for id in self.world.level.enemy_ids() {
            if self.turns.is_terminal() {
                break;
            }
            if self.tick_poison(id, depth) {
                continue;
            }
            let Some(enemy) = self.world.level.entity(id) else {
                continue;
            };
            let from = enemy.position;
            let intent = ai::decide(&self.world.level, enemy, self.world.level.player());
            if let Some(state) = self
                .world
                .level
                .entity_mut(id)
                .and_then(|e| e.as_enemy_mut())
            {
                state.intent = intent;
            }

            match intent {
                Intent::Idle => {}
                Intent::MoveTo(to) => {
                    if self.world.level.move_entity(id, to) {
                        self.world.emit(GameEvent::EntityMoved {
                            entity: id,
                            from,
                            to,
                        });
                    }
                }
                Intent::Attack { target } => self.enemy_attack(id, target),
            }
        }
    }

    /// Applies one tick of poison. True when the enemy is gone afterwards.
    fn tick_poison(&mut self, id: u64, depth: u32) -> bool {
        let Some(enemy) = self.world.level.entity_mut(id) else {
            return true;
        };
        let Some(state) = enemy.as_enemy_mut() else {
            return false;
        };
        if state.poison_turns == 0 {
            return false;
        }
        state.poison_turns -= 1;

        let damage = 1 + depth / 5;
        let hit = Combat::apply(&mut enemy.stats, damage);
        let name = enemy.name.clone();
        self.world
            .message(format!("The {name} takes {damage} poison damage."));
        if hit.killed {
            self.enemy_killed(id);
            return true;
        }
        false
    }

    fn enemy_attack(&mut self, enemy_id: u64, target: u64) {
        let Some(enemy) = self.world.level.entity(enemy_id) else {
            return;
        };
        let (name, attack) = (enemy.name.clone(), enemy.stats.attack);
        let Some(player) = self.world.level.player().filter(|p| p.id == target) else {
            return;
        };
        let defense = player.stats.defense;
        let (dodge, reduction) = player.as_player().map_or((0.0, 0), |p| {
            (
                p.mutation_state.dodge_chance(),
                p.mutation_state.damage_reduction,
            )
        });

        if dodge > 0.0 && self.world.rng.chance(dodge) {
            self.world
                .message(format!("You dodge the {name}'s attack."));
            return;
        }
        let damage = Combat::reduce(Combat::damage(attack, defense), reduction);
        self.world
            .message(format!("The {name} hits you for {damage}."));
        self.damage_player(Some(enemy_id), damage);
    }

    /// Armor then hp; a lethal hit spends a resurrection charge if any
    fn damage_player(&mut self, attacker: Option<u64>, damage: u32) {
        let World { level, events, .. } = &mut self.world;
        let Some(player) = level.player_mut() else {
            return;
        };
        let target = player.id;
        let hit = Combat::apply(&mut player.stats, damage);
        if let Some(attacker) = attacker {
            events.push(GameEvent::EntityAttacked {
                attacker,
                target,
                damage,
            });
        }
        events.push(GameEvent::PlayerStatsChanged(player.stats));
        if !hit.killed {
            return;
        }

        let revived = match player.player_parts_mut() {
            Some((stats, state)) if state.mutation_state.resurrection_charges > 0 => {
                state.mutation_state.resurrection_charges -= 1;
                stats.hp = (stats.max_hp / 2).max(1);
                Some(*stats)
            }
            _ => None,
        };
        match revived {
            Some(stats) => {
                events.push(GameEvent::message("Death releases you. Your flesh knits back together."));
                events.push(GameEvent::PlayerStatsChanged(stats));
            }
            None => self.player_died(),
        }
    }

    fn player_died(&mut self) {
        let Some(player) = self.world.level.remove_entity(self.world.player_id) else {
            return;
        };
        self.world.emit(GameEvent::EntityDied {
            entity: player.id,
            name: player.name.clone(),
        });
        self.world.offboard = Some(player);
        self.turns.game_over();
        self.world.emit(GameEvent::GameOver);
        if let Some(result) = self.runs.on_player_death(now_ms()) {
            self.finish_run(result);
        }
    }

    fn finish_run(&mut self, result: RunResult) {
        let reward = RunEndManager::apply_result(&result, &mut self.profile);
        self.world.emit(GameEvent::RunEnded(result));
        self.world
            .message(format!("You earned {} Titan Shards.", reward.shards));
        if let Some(region) = reward.unlocked_region {
            self.world
                .message(format!("A new region is open to you: {region}."));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat::enemy::template_by_id;
    use combat::{EnemyState, Stats};

    fn engine() -> GameEngine {
        let mut engine = GameEngine::new(&GameConfig::default(), MetaProfile::default());
        engine.start_new_run(Some(7));
        engine
    }

    fn clear_enemies(engine: &mut GameEngine) {
        for id in engine.level().enemy_ids() {
            engine.level_mut().remove_entity(id);
        }
    }

    fn place_rat(engine: &mut GameEngine, pos: Position, stats: Stats) -> u64 {
        let template = template_by_id("cave_rat").unwrap();
        let id = 9_000;
        engine.level_mut().add_entity(Entity::enemy(
            id,
            template.name,
            template.glyph,
            pos,
            stats,
            EnemyState::from_template(template, 40),
        ));
        id
    }

    fn player_pos(engine: &GameEngine) -> Position {
        engine.level().player().unwrap().position
    }

    #[test]
    fn new_run_kits_out_the_player() {
        let engine = engine();
        let player = engine.player().unwrap();
        let state = player.as_player().unwrap();
        // base attack 4 plus the wooden dagger
        assert_eq!(player.stats.attack, 4 + 2);
        assert_eq!(player.stats.max_hp, 30);
        assert_eq!(state.inventory.count_of(ItemType::MinorHealthPotion), 2);
        assert!(state.equipped_weapon_id.is_some());
        assert_eq!(engine.turn_state(), TurnState::AwaitingPlayerAction);
        assert!(engine.level().tile(player_pos(&engine)).visible);
    }

    #[test]
    fn walking_into_a_wall_is_free() {
        let mut engine = engine();
        clear_enemies(&mut engine);
        // the spawn is the room's top-left corner, so north is rock
        let events = engine.process_action(GameAction::Move(Direction::North));
        assert!(matches!(events.as_slice(), [GameEvent::Message(_)]));
        assert_eq!(engine.turn(), 0);
    }

    #[test]
    fn bumping_an_enemy_attacks_it() {
        let mut engine = engine();
        clear_enemies(&mut engine);
        let target = player_pos(&engine).step(Direction::East);
        let rat = place_rat(&mut engine, target, Stats::new(50, 0, 0));

        let events = engine.process_action(GameAction::Move(Direction::East));
        assert!(events.contains(&GameEvent::EntityAttacked {
            attacker: engine.player().unwrap().id,
            target: rat,
            damage: 6,
        }));
        assert_eq!(engine.level().entity(rat).unwrap().stats.hp, 44);
        assert_eq!(engine.turn(), 1);
    }

    #[test]
    fn killing_an_enemy_grants_xp_and_counts() {
        let mut engine = engine();
        clear_enemies(&mut engine);
        let target = player_pos(&engine).step(Direction::East);
        let rat = place_rat(&mut engine, target, Stats::new(1, 0, 0));

        let events = engine.process_action(GameAction::Move(Direction::East));
        assert!(events.contains(&GameEvent::EntityDied {
            entity: rat,
            name: "Cave Rat".into(),
        }));
        assert!(engine.level().entity(rat).is_none());
        assert_eq!(engine.player_state().unwrap().experience, 40);
        assert_eq!(engine.run().unwrap().enemies_killed, 1);
    }

    #[test]
    fn descending_off_the_stairs_is_refused() {
        let mut engine = engine();
        let events = engine.process_action(GameAction::DescendStairs);
        assert_eq!(events, vec![GameEvent::message("There are no stairs here.")]);
        assert_eq!(engine.run().unwrap().current_floor, 1);
    }

    #[test]
    fn stairs_lead_to_the_next_floor() {
        let mut engine = engine();
        clear_enemies(&mut engine);
        let stairs = engine.level().stairs_down;
        let id = engine.player().unwrap().id;
        assert!(engine.level_mut().move_entity(id, stairs));

        let events = engine.process_action(GameAction::DescendStairs);
        assert!(events.contains(&GameEvent::PlayerDescended { depth: 2 }));
        assert_eq!(engine.level().depth, 2);
        assert_eq!(player_pos(&engine), engine.level().player_spawn);
        assert_eq!(engine.run().unwrap().floors_cleared, 1);
    }

    #[test]
    fn drinking_a_potion_heals_and_consumes_it() {
        let mut engine = engine();
        clear_enemies(&mut engine);
        engine.level_mut().player_mut().unwrap().stats.hp = 10;
        let potion = engine
            .player_state()
            .unwrap()
            .inventory
            .items()
            .iter()
            .find(|i| i.item_type == ItemType::MinorHealthPotion)
            .unwrap()
            .id;

        engine.process_action(GameAction::UseItem(potion));
        assert_eq!(engine.player().unwrap().stats.hp, 20);
        assert_eq!(
            engine
                .player_state()
                .unwrap()
                .inventory
                .count_of(ItemType::MinorHealthPotion),
            1
        );
    }

    #[test]
    fn unknown_item_is_a_free_message() {
        let mut engine = engine();
        let events = engine.process_action(GameAction::UseItem(4242));
        assert_eq!(events, vec![GameEvent::message("You don't have that item.")]);
        assert_eq!(engine.turn(), 0);
    }

    #[test]
    fn resurrection_charge_prevents_death() {
        let mut engine = engine();
        clear_enemies(&mut engine);
        {
            let player = engine.level_mut().player_mut().unwrap();
            player.stats = Stats::new(20, 1, 0);
            player.stats.hp = 1;
            let (_, state) = player.player_parts_mut().unwrap();
            state.mutation_state.resurrection_charges = 1;
        }
        let target = player_pos(&engine).step(Direction::East);
        place_rat(&mut engine, target, Stats::new(50, 5, 0));

        let events = engine.process_action(GameAction::Wait);
        assert!(!events.contains(&GameEvent::GameOver));
        let player = engine.level().player().unwrap();
        assert_eq!(player.stats.hp, 10);
        assert_eq!(player.as_player().unwrap().mutation_state.resurrection_charges, 0);
    }

    #[test]
    fn snapshot_round_trips_through_resume() {
        let mut engine = engine();
        clear_enemies(&mut engine);
        engine.process_action(GameAction::Wait);
        let snapshot = engine.snapshot().unwrap();

        let resumed = GameEngine::resume(&GameConfig::default(), snapshot.clone(), MetaProfile::default());
        assert_eq!(resumed.run(), Some(&snapshot.run));
        assert_eq!(resumed.turn(), 1);
        let player = resumed.player().unwrap();
        assert_eq!(player.stats, snapshot.player.stats);
        assert_eq!(player.as_player(), Some(&snapshot.player.progress));
        assert_eq!(resumed.level().depth, 1);
        // same seed, same floor layout
        assert_eq!(resumed.level().stairs_down, engine.level().stairs_down);
    }
}
