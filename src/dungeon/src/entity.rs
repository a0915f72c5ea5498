// src/dungeon/src/entity.rs
use combat::{EnemyState, Position, Stats};
use hero::PlayerState;

/// Role-specific payload. Boxed so entities stay small in the level list.
#[derive(Clone, Debug, PartialEq)]
pub enum Role {
    Player(Box<PlayerState>),
    Enemy(Box<EnemyState>),
}

/// Anything that occupies a tile and fights
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: u64,
    pub name: String,
    pub position: Position,
    pub glyph: char,
    pub blocks_movement: bool,
    pub stats: Stats,
    pub role: Role,
}

impl Entity {
    pub fn player(id: u64, name: impl Into<String>, position: Position, stats: Stats, state: PlayerState) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            glyph: '@',
            blocks_movement: true,
            stats,
            role: Role::Player(Box::new(state)),
        }
    }

    pub fn enemy(
        id: u64,
        name: impl Into<String>,
        glyph: char,
        position: Position,
        stats: Stats,
        state: EnemyState,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            glyph,
            blocks_movement: true,
            stats,
            role: Role::Enemy(Box::new(state)),
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.role, Role::Player(_))
    }

    pub fn is_alive(&self) -> bool {
        !self.stats.is_dead()
    }

    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.role {
            Role::Player(p) => Some(p),
            Role::Enemy(_) => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyState> {
        match &self.role {
            Role::Enemy(e) => Some(e),
            Role::Player(_) => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.role {
            Role::Enemy(e) => Some(e),
            Role::Player(_) => None,
        }
    }

    /// Disjoint borrows of stats and the player payload
    pub fn player_parts_mut(&mut self) -> Option<(&mut Stats, &mut PlayerState)> {
        match &mut self.role {
            Role::Player(p) => Some((&mut self.stats, p)),
            Role::Enemy(_) => None,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.as_enemy()
            .and_then(|e| e.boss.as_ref())
            .is_some_and(|b| !b.is_mini_boss)
    }
}
