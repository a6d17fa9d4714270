//! Reference entity field
//!
//! The session decides what spawns and what a collision means; the track
//! places the spawned entities in field space, scrolls them, pulls coins
//! under a magnet and reports overlaps and despawns back as a [`TickInput`].
//! Field y grows downward: entities enter above the top edge and fall past
//! the player.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::consts::{DESPAWN_MARGIN, FIELD_HEIGHT, FIELD_WIDTH, PLAYER_Y, SPAWN_Y};
use crate::lane_center_x;
use crate::run::EventSink;
use crate::sim::{
    EntityKind, GameEvent, Intent, ObstacleKind, Posture, RunSession, TickInput, magnet_pull,
};

/// Player half-extents while upright
pub const PLAYER_HALF: Vec2 = Vec2::new(40.0, 40.0);
/// Player half-extents while sliding (box drops to the floor)
pub const PLAYER_SLIDE_HALF: Vec2 = Vec2::new(40.0, 20.0);

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        d.x < self.half.x + other.half.x && d.y < self.half.y + other.half.y
    }
}

/// Hitbox half-extents for an entity kind
pub fn half_extents(kind: EntityKind) -> Vec2 {
    match kind {
        EntityKind::Obstacle(ObstacleKind::Trap) => Vec2::new(50.0, 20.0),
        EntityKind::Obstacle(ObstacleKind::Spike) => Vec2::new(30.0, 50.0),
        EntityKind::Coin => Vec2::new(25.0, 25.0),
        EntityKind::PowerUp(_) => Vec2::new(30.0, 30.0),
    }
}

/// Player hitbox for the session's current lane offset and posture
pub fn player_box(session: &RunSession) -> Aabb {
    let x = FIELD_WIDTH / 2.0 + session.lanes.x_offset();
    match session.posture() {
        Posture::Sliding => Aabb::new(
            Vec2::new(x, PLAYER_Y + PLAYER_HALF.y - PLAYER_SLIDE_HALF.y),
            PLAYER_SLIDE_HALF,
        ),
        _ => Aabb::new(Vec2::new(x, PLAYER_Y), PLAYER_HALF),
    }
}

/// An entity in field space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    /// Fall velocity (units/s)
    pub vel_y: f32,
}

impl Body {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, half_extents(self.kind))
    }
}

/// Entities the session spawned, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Track {
    bodies: BTreeMap<u32, Body>,
    /// Scroll speed at the last advance; new bodies start with it
    scroll_speed: f32,
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.scroll_speed = 0.0;
    }

    /// Keep the field in sync with session events
    pub fn apply_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Spawned(entity) => {
                let pos = Vec2::new(lane_center_x(entity.lane), SPAWN_Y + entity.y_offset);
                self.bodies.insert(
                    entity.id,
                    Body {
                        id: entity.id,
                        kind: entity.kind,
                        pos,
                        vel_y: self.scroll_speed,
                    },
                );
            }
            GameEvent::Destroyed { id } => {
                self.bodies.remove(id);
            }
            _ => {}
        }
    }

    /// Move every body by `dt_ms` and collect this step's overlap and despawn reports.
    ///
    /// The returned input carries no intents; the caller merges its own.
    pub fn advance(&mut self, session: &RunSession, dt_ms: f32) -> TickInput {
        let mut report = TickInput::default();
        if session.is_over() {
            self.scroll_speed = 0.0;
            for body in self.bodies.values_mut() {
                body.vel_y = 0.0;
            }
            return report;
        }

        let dt_s = dt_ms.max(0.0) / 1000.0;
        let speed = session.scroll_velocity();
        let field = session.magnet_field();
        let player = player_box(session);
        self.scroll_speed = speed;

        for body in self.bodies.values_mut() {
            match (&field, body.kind) {
                // Under a magnet coins keep their velocity unless pulled, which stops them
                (Some(field), EntityKind::Coin) => {
                    if magnet_pull(field, player.center, &mut body.pos) {
                        body.vel_y = 0.0;
                    }
                }
                _ => body.vel_y = speed,
            }
            body.pos.y += body.vel_y * dt_s;
        }

        let limit = FIELD_HEIGHT + DESPAWN_MARGIN;
        self.bodies.retain(|&id, body| {
            if body.pos.y > limit {
                report.despawned.push(id);
                false
            } else {
                true
            }
        });

        report.overlaps = self
            .bodies
            .values()
            .filter(|b| b.aabb().overlaps(&player))
            .map(|b| b.id)
            .collect();
        report
    }

    /// Pick a dodge for whatever is closing in on the player's lane.
    ///
    /// Prefers changing to a clear neighbouring lane; otherwise jumps traps
    /// and slides under spikes. Fires turbo as soon as the gauge is full.
    pub fn autopilot(&self, session: &RunSession, lookahead: f32) -> Option<Intent> {
        if session.is_over() {
            return None;
        }
        if session.gas.is_full() && !session.speed.turbo_active() {
            return Some(Intent::Turbo);
        }
        if session.lanes.in_flight() || session.posture() != Posture::Running {
            return None;
        }

        let lane = session.lanes.current();
        let threat = self.nearest_obstacle(lane, lookahead)?;

        for (intent, neighbour) in [(Intent::Left, lane.checked_sub(1)), (Intent::Right, Some(lane + 1))] {
            if let Some(n) = neighbour
                && (n as usize) < crate::consts::LANE_POSITIONS.len()
                && self.nearest_obstacle(n, lookahead).is_none()
            {
                return Some(intent);
            }
        }

        match threat {
            ObstacleKind::Trap => Some(Intent::Jump),
            ObstacleKind::Spike => Some(Intent::Slide),
        }
    }

    fn nearest_obstacle(&self, lane: u8, lookahead: f32) -> Option<ObstacleKind> {
        let x = lane_center_x(lane);
        self.bodies
            .values()
            .filter_map(|b| match b.kind {
                EntityKind::Obstacle(kind) => Some((b, kind)),
                _ => None,
            })
            .filter(|(b, _)| {
                (b.pos.x - x).abs() < 1.0 && b.pos.y < PLAYER_Y + PLAYER_HALF.y && b.pos.y > PLAYER_Y - lookahead
            })
            .max_by(|(a, _), (b, _)| a.pos.y.total_cmp(&b.pos.y))
            .map(|(_, kind)| kind)
    }
}

impl EventSink for Track {
    fn emit(&mut self, event: GameEvent) {
        self.apply_event(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Food, Loadout, PowerUpKind, SpawnedEntity, tick};
    use crate::tuning::Tuning;

    fn session() -> RunSession {
        RunSession::new(3, Food::Onion, Loadout::default(), Tuning::default())
    }

    fn spawned(id: u32, kind: EntityKind, lane: u8, y_offset: f32) -> GameEvent {
        GameEvent::Spawned(SpawnedEntity {
            id,
            kind,
            lane,
            y_offset,
        })
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(10.0));
        assert!(a.overlaps(&Aabb::new(Vec2::new(15.0, 0.0), Vec2::splat(10.0))));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(20.0, 0.0), Vec2::splat(10.0))));
    }

    #[test]
    fn test_spawn_and_destroy_follow_events() {
        let mut track = Track::new();
        track.apply_event(&spawned(1, EntityKind::Coin, 0, -80.0));
        let body = track.get(1).unwrap();
        assert_eq!(body.pos, Vec2::new(200.0, SPAWN_Y - 80.0));

        track.apply_event(&GameEvent::Destroyed { id: 1 });
        assert!(track.is_empty());
    }

    #[test]
    fn test_scroll_reaches_player_then_despawns() {
        let session = session();
        let mut track = Track::new();
        track.apply_event(&spawned(1, EntityKind::Coin, 1, 0.0));

        // Onion starts at 600 units/s; the player line is 1050 units away
        let report = track.advance(&session, 1750.0);
        assert_eq!(report.overlaps, vec![1]);
        assert!(report.despawned.is_empty());

        let report = track.advance(&session, 1000.0);
        assert_eq!(report.despawned, vec![1]);
        assert!(track.is_empty());
    }

    #[test]
    fn test_other_lane_does_not_overlap() {
        let session = session();
        let mut track = Track::new();
        track.apply_event(&spawned(1, EntityKind::Obstacle(ObstacleKind::Trap), 0, 0.0));
        let report = track.advance(&session, 1750.0);
        assert!(report.overlaps.is_empty());
    }

    #[test]
    fn test_magnet_holds_nearby_coins() {
        let plain = session();
        let mut session = session();
        session.powerups.on_acquire(PowerUpKind::Magnet, 0);
        let mut track = Track::new();
        // Bodies spawned after this inherit the scroll speed
        track.advance(&plain, 16.0);
        // 500 units above the player: inside the onion's 600 range
        track.apply_event(&GameEvent::Spawned(SpawnedEntity {
            id: 1,
            kind: EntityKind::Coin,
            lane: 0,
            y_offset: PLAYER_Y - 500.0 - SPAWN_Y,
        }));
        track.apply_event(&spawned(2, EntityKind::Coin, 0, -1000.0));

        track.advance(&session, 16.0);
        let near = track.get(1).unwrap();
        assert_eq!(near.vel_y, 0.0);
        assert!(near.pos.x > 200.0);
        // Out of range: keeps falling at its spawn velocity
        assert_eq!(track.get(2).unwrap().vel_y, 600.0);
    }

    #[test]
    fn test_autopilot_dodges() {
        let mut session = session();
        let mut track = Track::new();
        track.apply_event(&spawned(1, EntityKind::Obstacle(ObstacleKind::Spike), 1, 0.0));
        track.advance(&session, 1500.0);
        assert_eq!(track.autopilot(&session, 400.0), Some(Intent::Left));

        // Block both neighbours: fall back to posture
        track.apply_event(&spawned(2, EntityKind::Obstacle(ObstacleKind::Trap), 0, 0.0));
        track.apply_event(&spawned(3, EntityKind::Obstacle(ObstacleKind::Trap), 2, 0.0));
        for id in [2, 3] {
            let mut body = *track.get(id).unwrap();
            body.pos.y = track.get(1).unwrap().pos.y;
            track.bodies.insert(id, body);
        }
        assert_eq!(track.autopilot(&session, 400.0), Some(Intent::Slide));

        tick(&mut session, &TickInput { slide: true, ..Default::default() }, 16.0);
        assert_eq!(track.autopilot(&session, 400.0), None);
    }
}
