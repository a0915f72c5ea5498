// src/combat/src/enemy.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumIter};

use crate::boss::BossData;
use crate::position::Position;
use crate::stats::Stats;

/// AI archetype. Only a handful drive distinct logic today; the rest share
/// the chase or idle routine until they get their own (see `BehaviorType::routine`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BehaviorType {
    SimpleChaser,
    Passive,
    Fleeing,
    Ambusher,
    Ranged,
    Charger,
    Guardian,
    Summoner,
    Healer,
    Berserker,
    Coward,
    Sentinel,
    Wanderer,
    Swarmer,
    Kiter,
    Bomber,
    Teleporter,
    Mimic,
    MiniBoss,
    Boss,
}

/// Routine a behavior resolves to on the enemy phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Routine {
    Chase,
    Idle,
}

impl BehaviorType {
    pub fn routine(self) -> Routine {
        match self {
            BehaviorType::SimpleChaser
            | BehaviorType::Charger
            | BehaviorType::Berserker
            | BehaviorType::Swarmer
            | BehaviorType::Guardian
            | BehaviorType::MiniBoss
            | BehaviorType::Boss => Routine::Chase,
            BehaviorType::Passive
            | BehaviorType::Fleeing
            | BehaviorType::Ambusher
            | BehaviorType::Ranged
            | BehaviorType::Summoner
            | BehaviorType::Healer
            | BehaviorType::Coward
            | BehaviorType::Sentinel
            | BehaviorType::Wanderer
            | BehaviorType::Kiter
            | BehaviorType::Bomber
            | BehaviorType::Teleporter
            | BehaviorType::Mimic => Routine::Idle,
        }
    }
}

/// Telegraphed next action, regenerated after every enemy turn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    #[default]
    Idle,
    Attack { target: u64 },
    MoveTo(Position),
}

/// How a kill is tallied by the run recorder
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillKind {
    Regular,
    Elite,
    MiniBoss,
    Boss,
}

pub const ELITE_TAG: &str = "elite";

/// Enemy-specific payload carried by an entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    pub template_id: String,
    pub behavior: BehaviorType,
    pub boss: Option<BossData>,
    pub xp_reward: u32,
    pub sight_range: u32,
    pub tags: BTreeSet<String>,
    #[serde(skip)]
    pub intent: Intent,
    #[serde(default)]
    pub poison_turns: u32,
}

impl EnemyState {
    pub fn from_template(template: &EnemyTemplate, xp_reward: u32) -> Self {
        Self {
            template_id: template.id.to_string(),
            behavior: template.behavior,
            boss: None,
            xp_reward,
            sight_range: template.sight_range,
            tags: template.tags.iter().map(|t| t.to_string()).collect(),
            intent: Intent::Idle,
            poison_turns: 0,
        }
    }

    pub fn is_elite(&self) -> bool {
        self.tags.contains(ELITE_TAG)
    }

    pub fn kill_kind(&self) -> KillKind {
        match &self.boss {
            Some(boss) if boss.is_mini_boss => KillKind::MiniBoss,
            Some(_) => KillKind::Boss,
            None if self.is_elite() => KillKind::Elite,
            None => KillKind::Regular,
        }
    }

    /// Elite promotion: hp ×1.5, attack +2, double xp
    pub fn promote_to_elite(&mut self, stats: &mut Stats) {
        let max_hp = ((stats.max_hp as f64) * 1.5).round() as u32;
        stats.max_hp = max_hp.max(1);
        stats.hp = stats.max_hp;
        stats.attack += 2;
        self.xp_reward *= 2;
        self.tags.insert(ELITE_TAG.to_string());
    }
}

/// Static enemy archetype
#[derive(Clone, Copy, Debug)]
pub struct EnemyTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub glyph: char,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub armor: u32,
    pub xp_reward: u32,
    pub sight_range: u32,
    pub min_depth: u32,
    pub behavior: BehaviorType,
    pub tags: &'static [&'static str],
}

pub const ENEMY_TEMPLATES: &[EnemyTemplate] = &[
    EnemyTemplate {
        id: "cave_rat",
        name: "Cave Rat",
        glyph: 'r',
        hp: 8,
        attack: 3,
        defense: 0,
        armor: 0,
        xp_reward: 10,
        sight_range: 6,
        min_depth: 1,
        behavior: BehaviorType::SimpleChaser,
        tags: &["beast"],
    },
    EnemyTemplate {
        id: "blood_bat",
        name: "Blood Bat",
        glyph: 'b',
        hp: 6,
        attack: 3,
        defense: 0,
        armor: 0,
        xp_reward: 8,
        sight_range: 8,
        min_depth: 1,
        behavior: BehaviorType::SimpleChaser,
        tags: &["beast", "flying"],
    },
    EnemyTemplate {
        id: "green_slime",
        name: "Green Slime",
        glyph: 's',
        hp: 14,
        attack: 2,
        defense: 1,
        armor: 0,
        xp_reward: 12,
        sight_range: 4,
        min_depth: 1,
        behavior: BehaviorType::SimpleChaser,
        tags: &["ooze"],
    },
    EnemyTemplate {
        id: "spore_cap",
        name: "Spore Cap",
        glyph: 'm',
        hp: 10,
        attack: 0,
        defense: 2,
        armor: 0,
        xp_reward: 5,
        sight_range: 0,
        min_depth: 1,
        behavior: BehaviorType::Passive,
        tags: &["plant"],
    },
    EnemyTemplate {
        id: "skittish_stag",
        name: "Skittish Stag",
        glyph: 'd',
        hp: 10,
        attack: 1,
        defense: 0,
        armor: 0,
        xp_reward: 6,
        sight_range: 7,
        min_depth: 1,
        behavior: BehaviorType::Fleeing,
        tags: &["beast"],
    },
    EnemyTemplate {
        id: "goblin_cutter",
        name: "Goblin Cutter",
        glyph: 'g',
        hp: 12,
        attack: 4,
        defense: 1,
        armor: 0,
        xp_reward: 18,
        sight_range: 7,
        min_depth: 2,
        behavior: BehaviorType::SimpleChaser,
        tags: &["humanoid"],
    },
    EnemyTemplate {
        id: "bone_warden",
        name: "Bone Warden",
        glyph: 'k',
        hp: 16,
        attack: 5,
        defense: 2,
        armor: 2,
        xp_reward: 24,
        sight_range: 7,
        min_depth: 4,
        behavior: BehaviorType::Guardian,
        tags: &["undead"],
    },
    EnemyTemplate {
        id: "orc_brute",
        name: "Orc Brute",
        glyph: 'o',
        hp: 24,
        attack: 6,
        defense: 3,
        armor: 3,
        xp_reward: 35,
        sight_range: 7,
        min_depth: 6,
        behavior: BehaviorType::Berserker,
        tags: &["humanoid"],
    },
    EnemyTemplate {
        id: "grave_wraith",
        name: "Grave Wraith",
        glyph: 'W',
        hp: 20,
        attack: 8,
        defense: 2,
        armor: 0,
        xp_reward: 45,
        sight_range: 9,
        min_depth: 9,
        behavior: BehaviorType::Charger,
        tags: &["undead", "flying"],
    },
    EnemyTemplate {
        id: "rune_golem",
        name: "Rune Golem",
        glyph: 'G',
        hp: 40,
        attack: 7,
        defense: 6,
        armor: 6,
        xp_reward: 60,
        sight_range: 5,
        min_depth: 12,
        behavior: BehaviorType::SimpleChaser,
        tags: &["construct"],
    },
];

/// Templates allowed to spawn at `depth`
pub fn templates_for_depth(depth: u32) -> Vec<&'static EnemyTemplate> {
    ENEMY_TEMPLATES
        .iter()
        .filter(|t| t.min_depth <= depth)
        .collect()
}

pub fn template_by_id(id: &str) -> Option<&'static EnemyTemplate> {
    ENEMY_TEMPLATES.iter().find(|t| t.id == id)
}

/// Per-depth growth applied to regular enemy templates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyScalingConfig {
    pub hp_per_depth: f64,
    pub attack_per_depth: f64,
    pub defense_per_depth: f64,
    pub xp_per_depth: f64,
}

impl Default for EnemyScalingConfig {
    fn default() -> Self {
        Self {
            hp_per_depth: 0.12,
            attack_per_depth: 0.08,
            defense_per_depth: 0.05,
            xp_per_depth: 0.10,
        }
    }
}

impl EnemyScalingConfig {
    /// Extra multiplier hook for per-floor tuning. Always 1.0 for now.
    pub fn floor_growth_modifier(&self, _depth: u32) -> f64 {
        1.0
    }

    fn scale(&self, base: u32, rate: f64, depth: u32) -> u32 {
        let steps = depth.saturating_sub(1) as f64;
        let factor = (1.0 + rate * steps) * self.floor_growth_modifier(depth);
        (base as f64 * factor).round() as u32
    }

    /// Depth-scaled stats and xp reward for a template
    pub fn scaled(&self, template: &EnemyTemplate, depth: u32) -> (Stats, u32) {
        let hp = self.scale(template.hp, self.hp_per_depth, depth).max(1);
        let stats = Stats {
            max_hp: hp,
            hp,
            attack: self.scale(template.attack, self.attack_per_depth, depth),
            defense: self.scale(template.defense, self.defense_per_depth, depth),
            max_armor: template.armor,
            armor: template.armor,
        };
        let xp = self.scale(template.xp_reward, self.xp_per_depth, depth);
        (stats, xp)
    }
}
