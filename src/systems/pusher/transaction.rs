//! Scratch state of a push transaction.
//!
//! A [`PushTransaction`] is created by the mover team coordinator for one
//! team and one tick. Each call to
//! [`push_mover`](crate::systems::pusher::push_mover) resets the per-push
//! scratch (relation matrix, records, undo stack) and leaves the team
//! journal alone, so a team that fails late can still unwind the moves its
//! earlier parts already committed.
//!
//! Effects that cannot be undone by restoring a snapshot (stranded riders
//! losing their ground, crushed entities taking damage) are queued on the
//! transaction and only applied once the whole team is accepted.

use arrayvec::ArrayVec;
use bevy_ecs::prelude::*;
use glam::Vec3;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::components::boxcollider::Obb;
use crate::components::lastpusher::LastPusher;
use crate::components::mapposition::MapPosition;
use crate::components::rotation::Rotation;
use crate::components::viewangles::ViewAngles;

/// Hard cap on undo entries per push.
pub const MAX_PUSHED: usize = 1024;

/// How directly an entity was moved by the prime mover. Ordered by
/// precedence; relations only ever move up this scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PushKind {
    #[default]
    None,
    /// Resting on top of the carrier.
    Ride,
    /// Shoved by an entity that was itself only riding.
    RidingStackHit,
    /// Struck by the prime mover, or by something it struck.
    PrimeMoverHit,
}

impl PushKind {
    /// Kind handed to entities this one collides with.
    pub fn collision_kind(self) -> PushKind {
        match self {
            PushKind::Ride => PushKind::RidingStackHit,
            other => other,
        }
    }

    /// Relations of this kind are dropped when their carrier is blocked.
    pub fn is_detachable(self) -> bool {
        matches!(self, PushKind::Ride | PushKind::RidingStackHit)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockState {
    #[default]
    None,
    /// Stays put because what carried it stays put.
    Indirect,
    /// Its own destination collides with the world or an unmoved entity.
    Direct,
}

impl BlockState {
    pub fn is_blocked(self) -> bool {
        self != BlockState::None
    }
}

/// What travels down the discovery worklist with each entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PushContext {
    /// The prime mover.
    pub pusher: Entity,
    /// The entity that most directly caused this movement.
    pub carrier: Entity,
    pub kind: PushKind,
    pub linear: Vec3,
    pub angular: Vec3,
}

impl PushContext {
    pub fn prime(pusher: Entity, linear: Vec3, angular: Vec3) -> Self {
        Self {
            pusher,
            carrier: pusher,
            kind: PushKind::PrimeMoverHit,
            linear,
            angular,
        }
    }

    pub fn child(&self, carrier: Entity, kind: PushKind) -> Self {
        Self {
            carrier,
            kind,
            ..*self
        }
    }
}

/// Snapshot of an entity taken before it is moved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UndoEntry {
    pub entity: Entity,
    pub origin: Vec3,
    pub angles: Vec3,
    pub delta_yaw: f32,
    pub last_pusher: Option<LastPusher>,
}

impl UndoEntry {
    pub fn capture(world: &World, entity: Entity) -> Self {
        Self {
            entity,
            origin: world
                .get::<MapPosition>(entity)
                .map(|p| p.pos)
                .unwrap_or(Vec3::ZERO),
            angles: world
                .get::<Rotation>(entity)
                .map(|r| r.angles)
                .unwrap_or(Vec3::ZERO),
            delta_yaw: world
                .get::<ViewAngles>(entity)
                .map(|v| v.delta_yaw)
                .unwrap_or(0.0),
            last_pusher: world.get::<LastPusher>(entity).copied(),
        }
    }

    pub fn restore(&self, world: &mut World) {
        if let Some(mut pos) = world.get_mut::<MapPosition>(self.entity) {
            pos.pos = self.origin;
        }
        if let Some(mut rot) = world.get_mut::<Rotation>(self.entity) {
            rot.angles = self.angles;
        }
        if let Some(mut view) = world.get_mut::<ViewAngles>(self.entity) {
            view.delta_yaw = self.delta_yaw;
        }
        if let Ok(mut entity) = world.get_entity_mut(self.entity) {
            match self.last_pusher {
                Some(pusher) => {
                    entity.insert(pusher);
                }
                None => {
                    entity.remove::<LastPusher>();
                }
            }
        }
    }
}

/// Everything known about one displaced entity during a push.
#[derive(Clone, Debug)]
pub struct PushRecord {
    pub entity: Entity,
    /// Origin before the push.
    pub origin: Vec3,
    /// Full displacement: translation plus rotation about the pivot.
    pub offset: Vec3,
    /// Highest kind reached through any carrier.
    pub kind: PushKind,
    /// Carrier that delivered `kind`.
    pub carrier: Entity,
    /// Every entity that holds a relation to this one.
    pub carriers: SmallVec<[Entity; 4]>,
    /// Pushable entities this one shoves out of the way.
    pub hits: SmallVec<[Entity; 4]>,
    pub queued: bool,
    pub needs_block_check: bool,
    pub block: BlockState,
    /// Shape at the destination.
    pub dest: Obb,
    /// Blocked by an unstoppable mover; destroyed instead of held back.
    pub crushed: bool,
    pub(crate) detached: bool,
}

impl PushRecord {
    pub fn destination(&self) -> Vec3 {
        self.origin + self.offset
    }

    /// Queued, unblocked and not destroyed.
    pub fn will_move(&self) -> bool {
        self.queued && !self.block.is_blocked() && !self.crushed
    }
}

/// Per-team push transaction.
pub struct PushTransaction {
    prime: Option<Entity>,
    pivot: Vec3,
    linear: Vec3,
    angular: Vec3,
    lethal: bool,
    relations: FxHashMap<(Entity, Entity), PushKind>,
    records: Vec<PushRecord>,
    index: FxHashMap<Entity, usize>,
    undo: ArrayVec<UndoEntry, MAX_PUSHED>,
    max_pushed: usize,
    overflowed: bool,
    journal: Vec<UndoEntry>,
    /// `(entity, mover)` pairs waiting for team acceptance.
    stranded: Vec<(Entity, Entity)>,
    crushed: Vec<(Entity, Entity)>,
}

impl Default for PushTransaction {
    fn default() -> Self {
        Self::new(MAX_PUSHED)
    }
}

impl PushTransaction {
    pub fn new(max_pushed: usize) -> Self {
        Self {
            prime: None,
            pivot: Vec3::ZERO,
            linear: Vec3::ZERO,
            angular: Vec3::ZERO,
            lethal: false,
            relations: FxHashMap::default(),
            records: Vec::new(),
            index: FxHashMap::default(),
            undo: ArrayVec::new(),
            max_pushed: max_pushed.clamp(1, MAX_PUSHED),
            overflowed: false,
            journal: Vec::new(),
            stranded: Vec::new(),
            crushed: Vec::new(),
        }
    }

    /// Reset the per-push scratch for a new prime mover. The team journal
    /// is kept.
    pub fn begin(&mut self, prime: Entity, pivot: Vec3, linear: Vec3, angular: Vec3, lethal: bool) {
        self.prime = Some(prime);
        self.pivot = pivot;
        self.linear = linear;
        self.angular = angular;
        self.lethal = lethal;
        self.relations.clear();
        self.records.clear();
        self.index.clear();
        self.undo.clear();
        self.overflowed = false;
    }

    pub fn prime(&self) -> Entity {
        self.prime
            .expect("push transaction used before begin() was called")
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    pub fn linear(&self) -> Vec3 {
        self.linear
    }

    pub fn angular(&self) -> Vec3 {
        self.angular
    }

    pub fn is_lethal(&self) -> bool {
        self.lethal
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn relation(&self, pusher: Entity, pushee: Entity) -> PushKind {
        self.relations
            .get(&(pusher, pushee))
            .copied()
            .unwrap_or_default()
    }

    /// Raise the relation to `kind`. Returns false when the relation was
    /// already at or above `kind`, in which case nothing changes.
    pub fn upgrade_relation(&mut self, pusher: Entity, pushee: Entity, kind: PushKind) -> bool {
        let slot = self.relations.entry((pusher, pushee)).or_default();
        if kind <= *slot {
            return false;
        }
        *slot = kind;
        true
    }

    /// Drop the detachable relations held by `carrier`.
    pub(crate) fn detach_dependents(&mut self, carrier: Entity) {
        self.relations
            .retain(|&(pusher, _), kind| pusher != carrier || !kind.is_detachable());
    }

    /// True if some live relation keeps `entity` moving.
    pub(crate) fn is_supported(&self, entity: Entity) -> bool {
        let prime = self.prime();
        let Some(record) = self.record(entity) else {
            return false;
        };
        record.carriers.iter().any(|&carrier| {
            self.relation(carrier, entity) > PushKind::None
                && (carrier == prime || self.record(carrier).is_some_and(|c| c.will_move()))
        })
    }

    pub fn record(&self, entity: Entity) -> Option<&PushRecord> {
        self.index.get(&entity).map(|&i| &self.records[i])
    }

    pub fn record_mut(&mut self, entity: Entity) -> Option<&mut PushRecord> {
        match self.index.get(&entity) {
            Some(&i) => Some(&mut self.records[i]),
            None => None,
        }
    }

    pub fn records(&self) -> &[PushRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [PushRecord] {
        &mut self.records
    }

    /// Fetch or create the record of `entity`.
    pub(crate) fn record_entry(
        &mut self,
        entity: Entity,
        origin: Vec3,
        offset: Vec3,
        dest: Obb,
    ) -> &mut PushRecord {
        let i = match self.index.get(&entity) {
            Some(&i) => i,
            None => {
                self.records.push(PushRecord {
                    entity,
                    origin,
                    offset,
                    kind: PushKind::None,
                    carrier: entity,
                    carriers: SmallVec::new(),
                    hits: SmallVec::new(),
                    queued: false,
                    needs_block_check: false,
                    block: BlockState::None,
                    dest,
                    crushed: false,
                    detached: false,
                });
                let i = self.records.len() - 1;
                self.index.insert(entity, i);
                i
            }
        };
        &mut self.records[i]
    }

    /// Push a snapshot on the undo stack. Returns false, and flags the
    /// transaction as overflowed, once the cap is reached.
    pub fn snapshot(&mut self, entry: UndoEntry) -> bool {
        if self.undo.len() >= self.max_pushed || self.undo.try_push(entry).is_err() {
            self.overflowed = true;
            return false;
        }
        true
    }

    pub fn undo_entries(&self) -> &[UndoEntry] {
        &self.undo
    }

    /// Restore every snapshot of the current push, newest first, so an
    /// entity moved twice ends at its oldest snapshot.
    pub fn rollback(&mut self, world: &mut World) {
        for entry in self.undo.iter().rev() {
            entry.restore(world);
        }
        self.undo.clear();
    }

    /// Remember the pre-commit state of an entity for team-level rollback.
    pub(crate) fn journal(&mut self, entry: UndoEntry) {
        self.journal.push(entry);
    }

    pub fn journal_entries(&self) -> &[UndoEntry] {
        &self.journal
    }

    /// Undo every commit made by earlier team parts, newest first, and
    /// drop the effects they queued.
    pub fn rollback_journal(&mut self, world: &mut World) {
        for entry in self.journal.iter().rev() {
            entry.restore(world);
        }
        self.journal.clear();
        self.stranded.clear();
        self.crushed.clear();
    }

    /// Queue `entity` to be cut loose from its ground.
    pub(crate) fn defer_strand(&mut self, entity: Entity) {
        let mover = self.prime();
        self.stranded.push((entity, mover));
    }

    /// Queue lethal damage for `victim`.
    pub(crate) fn defer_crush(&mut self, victim: Entity) {
        let mover = self.prime();
        self.crushed.push((victim, mover));
    }

    pub fn pending_strands(&self) -> &[(Entity, Entity)] {
        &self.stranded
    }

    pub fn pending_crushes(&self) -> &[(Entity, Entity)] {
        &self.crushed
    }

    /// Hand over the queued strands and crushes, leaving both queues empty.
    pub(crate) fn take_deferred(&mut self) -> (Vec<(Entity, Entity)>, Vec<(Entity, Entity)>) {
        (
            std::mem::take(&mut self.stranded),
            std::mem::take(&mut self.crushed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_kind_precedence_is_strict() {
        assert!(PushKind::None < PushKind::Ride);
        assert!(PushKind::Ride < PushKind::RidingStackHit);
        assert!(PushKind::RidingStackHit < PushKind::PrimeMoverHit);
    }

    #[test]
    fn riders_hand_down_stack_hits() {
        assert_eq!(PushKind::Ride.collision_kind(), PushKind::RidingStackHit);
        assert_eq!(
            PushKind::RidingStackHit.collision_kind(),
            PushKind::RidingStackHit
        );
        assert_eq!(
            PushKind::PrimeMoverHit.collision_kind(),
            PushKind::PrimeMoverHit
        );
    }

    #[test]
    fn relations_only_upgrade() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let mut tx = PushTransaction::default();
        tx.begin(a, Vec3::ZERO, Vec3::X, Vec3::ZERO, false);

        assert!(tx.upgrade_relation(a, b, PushKind::Ride));
        assert!(tx.upgrade_relation(a, b, PushKind::PrimeMoverHit));
        assert!(!tx.upgrade_relation(a, b, PushKind::Ride));
        assert!(!tx.upgrade_relation(a, b, PushKind::PrimeMoverHit));
        assert_eq!(tx.relation(a, b), PushKind::PrimeMoverHit);
        assert_eq!(tx.relation(b, a), PushKind::None);
    }

    #[test]
    fn detach_keeps_prime_hits() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let c = world.spawn_empty().id();
        let mut tx = PushTransaction::default();
        tx.begin(a, Vec3::ZERO, Vec3::X, Vec3::ZERO, false);
        tx.upgrade_relation(b, c, PushKind::Ride);
        tx.upgrade_relation(b, a, PushKind::PrimeMoverHit);

        tx.detach_dependents(b);
        assert_eq!(tx.relation(b, c), PushKind::None);
        assert_eq!(tx.relation(b, a), PushKind::PrimeMoverHit);
    }

    #[test]
    fn begin_clears_scratch_but_keeps_journal() {
        let mut world = World::new();
        let a = world.spawn(MapPosition::new(1.0, 2.0, 3.0)).id();
        let mut tx = PushTransaction::default();
        tx.begin(a, Vec3::ZERO, Vec3::X, Vec3::ZERO, false);
        tx.upgrade_relation(a, a, PushKind::Ride);
        tx.snapshot(UndoEntry::capture(&world, a));
        tx.journal(UndoEntry::capture(&world, a));

        tx.begin(a, Vec3::ZERO, Vec3::Y, Vec3::ZERO, false);
        assert_eq!(tx.relation(a, a), PushKind::None);
        assert!(tx.undo_entries().is_empty());
        assert!(tx.records().is_empty());
        assert_eq!(tx.journal_entries().len(), 1);
    }

    #[test]
    fn snapshot_overflow_flags_transaction() {
        let mut world = World::new();
        let a = world.spawn(MapPosition::default()).id();
        let mut tx = PushTransaction::new(2);
        tx.begin(a, Vec3::ZERO, Vec3::X, Vec3::ZERO, false);
        assert!(tx.snapshot(UndoEntry::capture(&world, a)));
        assert!(tx.snapshot(UndoEntry::capture(&world, a)));
        assert!(!tx.is_overflowed());
        assert!(!tx.snapshot(UndoEntry::capture(&world, a)));
        assert!(tx.is_overflowed());
        assert_eq!(tx.undo_entries().len(), 2);
    }

    #[test]
    fn rollback_restores_oldest_snapshot() {
        let mut world = World::new();
        let e = world
            .spawn((
                MapPosition::new(0.0, 0.0, 0.0),
                Rotation::default(),
                ViewAngles::default(),
            ))
            .id();
        let mut tx = PushTransaction::default();
        tx.begin(e, Vec3::ZERO, Vec3::X, Vec3::ZERO, false);

        tx.snapshot(UndoEntry::capture(&world, e));
        world.get_mut::<MapPosition>(e).unwrap().pos = Vec3::new(5.0, 0.0, 0.0);
        world.get_mut::<ViewAngles>(e).unwrap().delta_yaw = 15.0;
        tx.snapshot(UndoEntry::capture(&world, e));
        world.get_mut::<MapPosition>(e).unwrap().pos = Vec3::new(9.0, 9.0, 0.0);
        world.get_mut::<Rotation>(e).unwrap().angles = Vec3::new(0.0, 90.0, 0.0);

        tx.rollback(&mut world);
        assert_eq!(world.get::<MapPosition>(e).unwrap().pos, Vec3::ZERO);
        assert_eq!(world.get::<Rotation>(e).unwrap().angles, Vec3::ZERO);
        assert_eq!(world.get::<ViewAngles>(e).unwrap().delta_yaw, 0.0);
        assert!(tx.undo_entries().is_empty());
    }

    #[test]
    fn journal_rollback_unwinds_newest_first() {
        let mut world = World::new();
        let e = world.spawn(MapPosition::new(1.0, 0.0, 0.0)).id();
        let mut tx = PushTransaction::default();
        tx.journal(UndoEntry::capture(&world, e));
        world.get_mut::<MapPosition>(e).unwrap().pos = Vec3::new(2.0, 0.0, 0.0);
        tx.journal(UndoEntry::capture(&world, e));
        world.get_mut::<MapPosition>(e).unwrap().pos = Vec3::new(3.0, 0.0, 0.0);

        tx.rollback_journal(&mut world);
        assert_eq!(world.get::<MapPosition>(e).unwrap().pos, Vec3::new(1.0, 0.0, 0.0));
        assert!(tx.journal_entries().is_empty());
    }

    #[test]
    fn queued_effects_survive_begin_and_die_with_the_journal() {
        let mut world = World::new();
        let a = world.spawn(MapPosition::default()).id();
        let b = world.spawn(MapPosition::default()).id();
        let rider = world.spawn(MapPosition::default()).id();
        let mut tx = PushTransaction::default();

        tx.begin(a, Vec3::ZERO, Vec3::X, Vec3::ZERO, false);
        tx.defer_strand(rider);
        tx.defer_crush(rider);
        tx.begin(b, Vec3::ZERO, Vec3::Y, Vec3::ZERO, false);
        assert_eq!(tx.pending_strands(), &[(rider, a)]);
        assert_eq!(tx.pending_crushes(), &[(rider, a)]);

        tx.rollback_journal(&mut world);
        assert!(tx.pending_strands().is_empty());
        assert!(tx.pending_crushes().is_empty());
    }
}
