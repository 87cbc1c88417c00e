//! Equipment system implementations
//!
//! # Порядок внутри тика (chain в `EquipmentPlugin`)
//!
//! 1. `advance_simulation_clock`, `release_destroyed_items`
//! 2. `process_deferred_actions` - EnableDrop / CompleteSwap / ExecuteThrow / SettleApparel
//! 3. `read_hand_input` - left → right (tie-break)
//! 4. `process_equipment_intents` - equip → try equip → drop → activate → fire mode
//! 5. `poll_worn_apparel`
//! 6. `tool_auto_shutoff`
//! 7. aim / physics sync / ground contact / invariants / HUD / projectiles
//! 8. `clear_hand_input`

use bevy::prelude::*;

use crate::components::{EquipmentCoordinator, EquipmentItem, HandId, HandInput, LightEmitter};
use crate::equipment::events::*;
use crate::equipment::{DeferredActions, EquipmentOps, SimulationClock};
use crate::logger::log;

pub fn advance_simulation_clock(mut clock: ResMut<SimulationClock>) {
    clock.advance();
}

/// Предмет уничтожен снаружи (host despawn): сбрасываем руки, которые
/// его держали или ждали swap'ом, и его deferred записи
pub fn release_destroyed_items(
    mut removed: RemovedComponents<EquipmentItem>,
    mut coordinators: Query<(Entity, &mut EquipmentCoordinator)>,
    mut deferred: ResMut<DeferredActions>,
    clock: Res<SimulationClock>,
) {
    for item in removed.read() {
        let cancelled = deferred.cancel_for(item);

        for (actor, mut coordinator) in coordinators.iter_mut() {
            let referenced = HandId::ALL.into_iter().any(|hand| {
                let slot = coordinator.hand(hand);
                slot.current() == Some(item) || slot.pending_swap() == Some(item)
            });
            if !referenced {
                continue;
            }

            let hands = coordinator.forget_item(item, clock.tick());
            log(&format!(
                "Item {:?} destroyed: released {:?} of actor {:?}, {} deferred cancelled",
                item, hands, actor, cancelled
            ));
        }
    }
}

/// Созревшие deferred actions в порядке (fire_at_tick, seq)
pub fn process_deferred_actions(mut ops: EquipmentOps) {
    for action in ops.take_due_actions() {
        ops.run_deferred(action);
    }
}

/// Input обеих рук (левая раньше правой)
pub fn read_hand_input(mut ops: EquipmentOps, inputs: Query<(Entity, &HandInput)>) {
    for (actor, input) in inputs.iter() {
        for hand in HandId::ALL {
            ops.handle_hand_input(actor, hand, input);
        }
    }
}

/// Process intents от host'а / AI
pub fn process_equipment_intents(
    mut ops: EquipmentOps,
    mut equips: EventReader<EquipIntent>,
    mut try_equips: EventReader<TryEquipIntent>,
    mut drops: EventReader<DropIntent>,
    mut activations: EventReader<ActivateIntent>,
    mut fire_modes: EventReader<CycleFireModeIntent>,
) {
    for intent in equips.read() {
        if let Err(error) = ops.equip(intent.actor, intent.item, intent.hand) {
            ops.report(Some(intent.actor), Some(intent.item), error);
        }
    }

    for intent in try_equips.read() {
        if let Err(error) = ops.try_equip(intent.actor, intent.item) {
            ops.report(Some(intent.actor), Some(intent.item), error);
        }
    }

    for intent in drops.read() {
        if let Err(error) = ops.drop_item(intent.actor, intent.item, intent.hand, intent.apply_forces) {
            ops.report(Some(intent.actor), Some(intent.item), error);
        }
    }

    for intent in activations.read() {
        if let Err(error) = ops.activate(intent.item) {
            ops.report(None, Some(intent.item), error);
        }
    }

    for intent in fire_modes.read() {
        if let Err(error) = ops.cycle_fire_mode(intent.actor, intent.hand) {
            ops.report(Some(intent.actor), None, error);
        }
    }
}

/// Worn шапка: equip key на пустой руке снимает её в эту руку
pub fn poll_worn_apparel(mut ops: EquipmentOps, inputs: Query<&HandInput>) {
    for (item, actor) in ops.worn_apparel() {
        let Ok(input) = inputs.get(actor) else {
            continue;
        };
        ops.poll_apparel_input(actor, item, input);
    }
}

/// Фонарик не в руке → свет выключен
pub fn tool_auto_shutoff(mut tools: Query<(&EquipmentItem, &mut LightEmitter)>) {
    for (item, mut light) in tools.iter_mut() {
        if !item.is_held() && light.enabled {
            light.enabled = false;
        }
    }
}

/// Edge'и живут один тик
pub fn clear_hand_input(mut inputs: Query<&mut HandInput>) {
    for mut input in inputs.iter_mut() {
        input.end_tick();
    }
}
