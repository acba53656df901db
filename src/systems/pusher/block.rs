//! Deciding which displaced entities actually move.
//!
//! Runs after the push graph is complete:
//!
//! 1. every queued entity is staged at its destination;
//! 2. entities flagged during discovery are tested there against the world
//!    and against other entities, and marked directly blocked on contact;
//! 3. blockage propagates until nothing changes: relations held by blocked
//!    carriers are dropped, entities left without a moving carrier are
//!    indirectly blocked, and entities that would shove a blocked entity are
//!    blocked too.
//!
//! Unstoppable (sine) movers skip step 3: whatever is directly blocked is
//! marked crushed instead. Staged positions are unwound before returning.

use bevy_ecs::prelude::*;
use log::debug;
use smallvec::SmallVec;

use crate::components::mapposition::MapPosition;
use crate::systems::pusher::query::{Blocker, CollisionQuery};
use crate::systems::pusher::transaction::{BlockState, PushKind, PushTransaction};

/// Result of resolving a push graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub accepted: bool,
    /// Entities struck by the prime mover that stopped it.
    pub obstacles: SmallVec<[Entity; 4]>,
}

pub fn resolve_blocks(
    world: &mut World,
    tx: &mut PushTransaction,
    query: &mut CollisionQuery,
) -> Resolution {
    if tx.is_overflowed() {
        return Resolution::default();
    }

    stage(world, tx, true);
    classify(world, tx, query);
    stage(world, tx, false);

    if tx.is_lethal() {
        crush(tx);
    } else {
        propagate(tx);
    }

    let stopped: SmallVec<[(Entity, BlockState); 4]> = tx
        .records()
        .iter()
        .filter(|r| r.queued && r.kind == PushKind::PrimeMoverHit && r.block.is_blocked())
        .map(|r| (r.entity, r.block))
        .collect();
    let direct: SmallVec<[Entity; 4]> = stopped
        .iter()
        .filter(|(_, block)| *block == BlockState::Direct)
        .map(|(entity, _)| *entity)
        .collect();
    let obstacles = if direct.is_empty() {
        stopped.iter().map(|(entity, _)| *entity).collect()
    } else {
        direct
    };

    Resolution {
        accepted: stopped.is_empty(),
        obstacles,
    }
}

/// Write destinations (`forward`) or pre-push origins into the world.
fn stage(world: &mut World, tx: &PushTransaction, forward: bool) {
    for record in tx.records().iter().filter(|r| r.queued) {
        if let Some(mut pos) = world.get_mut::<MapPosition>(record.entity) {
            pos.pos = if forward {
                record.destination()
            } else {
                record.origin
            };
        }
    }
}

fn classify(world: &World, tx: &mut PushTransaction, query: &mut CollisionQuery) {
    let prime = tx.prime();
    for record in tx.records_mut().iter_mut() {
        if !record.queued || !record.needs_block_check {
            continue;
        }
        let ignore = [prime, record.entity, record.carrier];
        if let Some(blocker) = query.test_position(world, &record.dest, &ignore) {
            match blocker {
                Blocker::World => debug!(target: "push", "{:?} blocked by world", record.entity),
                Blocker::Entity(other) => {
                    debug!(target: "push", "{:?} blocked by {:?}", record.entity, other)
                }
            }
            record.block = BlockState::Direct;
        }
    }
}

fn crush(tx: &mut PushTransaction) {
    for record in tx.records_mut().iter_mut() {
        if record.block == BlockState::Direct {
            record.block = BlockState::None;
            record.crushed = true;
        }
    }
}

fn propagate(tx: &mut PushTransaction) {
    loop {
        let mut changed = false;

        let blocked: SmallVec<[Entity; 8]> = tx
            .records()
            .iter()
            .filter(|r| r.block.is_blocked() && !r.detached)
            .map(|r| r.entity)
            .collect();
        for carrier in blocked {
            tx.detach_dependents(carrier);
            if let Some(record) = tx.record_mut(carrier) {
                record.detached = true;
            }
        }

        let moving: SmallVec<[Entity; 16]> = tx
            .records()
            .iter()
            .filter(|r| r.queued && !r.block.is_blocked())
            .map(|r| r.entity)
            .collect();
        for entity in moving {
            let unsupported = !tx.is_supported(entity);
            let shoves_blocked = !unsupported
                && tx.record(entity).is_some_and(|record| {
                    record.hits.iter().any(|hit| {
                        tx.record(*hit)
                            .is_some_and(|other| other.queued && other.block.is_blocked())
                    })
                });
            let state = if unsupported {
                BlockState::Indirect
            } else if shoves_blocked {
                BlockState::Direct
            } else {
                continue;
            };
            if let Some(record) = tx.record_mut(entity) {
                debug!(target: "push", "{entity:?} held back ({state:?})");
                record.block = state;
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }
}
