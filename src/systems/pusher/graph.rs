//! Discovery of everything a move displaces.
//!
//! Starting at the prime mover, the builder walks an explicit worklist of
//! `(entity, PushContext)` pairs. Each step records how the entity is
//! pushed, where it ends up, and which entities its destination overlaps or
//! carries. Nothing is written to the world here; destinations are derived
//! from each entity's snapshot plus its displacement.

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::rotation::rotation_offset;
use crate::systems::pusher::classify::{is_intact, is_pushable};
use crate::systems::pusher::query::CollisionQuery;
use crate::systems::pusher::transaction::{PushContext, PushKind, PushTransaction, UndoEntry};

/// Build the push graph of the prime mover. The prime mover must already
/// stand at its destination.
pub fn build_push_graph(world: &World, tx: &mut PushTransaction, query: &mut CollisionQuery) {
    let prime = tx.prime();
    let mut worklist: Vec<(Entity, PushContext)> =
        vec![(prime, PushContext::prime(prime, tx.linear(), tx.angular()))];

    while let Some((entity, ctx)) = worklist.pop() {
        if tx.is_overflowed() {
            break;
        }
        expand(world, tx, query, entity, ctx, &mut worklist);
    }
}

fn expand(
    world: &World,
    tx: &mut PushTransaction,
    query: &mut CollisionQuery,
    entity: Entity,
    ctx: PushContext,
    worklist: &mut Vec<(Entity, PushContext)>,
) {
    let prime = ctx.pusher;
    let is_prime = entity == prime;

    let dest = if is_prime {
        match CollisionQuery::current_bounds(world, prime) {
            Some(bounds) => bounds,
            None => return,
        }
    } else {
        if !tx.upgrade_relation(ctx.carrier, entity, ctx.kind) {
            return;
        }
        let snapshot = UndoEntry::capture(world, entity);
        if !tx.snapshot(snapshot) {
            warn!(target: "push", "{prime:?}: too many entities pushed, rejecting move");
            return;
        }
        let offset = ctx.linear + rotation_offset(snapshot.origin, tx.pivot(), ctx.angular);
        let Some(dest) = CollisionQuery::bounds_at(world, entity, snapshot.origin + offset) else {
            return;
        };
        let world_hit = CollisionQuery::world_blocks(world, &dest);

        let record = tx.record_entry(entity, snapshot.origin, offset, dest);
        record.queued = true;
        record.needs_block_check |= world_hit;
        if !record.carriers.contains(&ctx.carrier) {
            record.carriers.push(ctx.carrier);
        }
        if ctx.kind > record.kind {
            record.kind = ctx.kind;
            record.carrier = ctx.carrier;
        }
        debug!(
            target: "push",
            "{entity:?} pushed by {:?} as {:?} (offset {})",
            ctx.carrier, ctx.kind, offset
        );
        dest
    };

    let hit_ctx = ctx.child(entity, ctx.kind.collision_kind());
    for other in query.entities_in_box(world, &dest) {
        if other == entity || other == prime || other == ctx.carrier || !is_intact(world, other) {
            continue;
        }
        if is_pushable(world, entity, other) {
            if !is_prime {
                if let Some(record) = tx.record_mut(entity) {
                    if !record.hits.contains(&other) {
                        record.hits.push(other);
                    }
                }
            }
            worklist.push((other, hit_ctx));
        } else if !is_prime {
            if let Some(record) = tx.record_mut(entity) {
                record.needs_block_check = true;
            }
        }
    }

    let ride_ctx = ctx.child(entity, PushKind::Ride);
    for rider in query.riders_of(world, entity) {
        if rider == prime || tx.relation(entity, rider) != PushKind::None {
            continue;
        }
        if is_pushable(world, prime, rider) {
            worklist.push((rider, ride_ctx));
        }
    }
}
