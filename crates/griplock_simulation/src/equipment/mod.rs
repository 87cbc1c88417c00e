//! Equipment module - interaction lifecycle
//!
//! # Architecture
//!
//! **Events → Systems flow:**
//! - Host пишет `ActorView` + `HandInput` или intent events
//! - Системы переводят input/intents в операции `EquipmentOps`
//! - Операции меняют Hand ↔ EquipmentItem binding, `ItemPhysics`, `Activation`
//! - Отложенные шаги (drop unlock, swap, throw, apparel settle) → `DeferredActions`
//!
//! **Item lifecycle:**
//! - Equip → reparent к руке, kinematic lock, `can_drop` со следующего тика
//! - Drop → unequipped pose, unlock, опциональный impulse
//! - Swap → drop старого + deferred equip нового (рука busy)
//! - Activate → type-specific effect (fire / reload / throw / light / wear)

use bevy::prelude::*;

pub mod aim;
pub mod deferred;
pub mod error;
pub mod events;
pub mod hud;
pub mod invariants;
pub mod operations;
pub mod spawn;
pub mod systems;

// Re-exports
pub use aim::*;
pub use deferred::*;
pub use error::*;
pub use events::*;
pub use hud::*;
pub use invariants::*;
pub use operations::*;
pub use spawn::*;
pub use systems::*;

use crate::config::EquipmentConfig;
use crate::item_system::ItemDefinitions;
use crate::physics::{detect_item_ground_contact, sync_item_physics_to_rapier};
use crate::projectile::despawn_expired_projectiles;
use crate::DeterministicRng;

/// Equipment plugin
///
/// Config передаётся явно (immutable resource), без глобальных singleton'ов.
#[derive(Default)]
pub struct EquipmentPlugin {
    pub config: EquipmentConfig,
}

impl EquipmentPlugin {
    pub fn with_config(config: EquipmentConfig) -> Self {
        Self { config }
    }
}

impl Plugin for EquipmentPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<ItemDefinitions>() {
            app.insert_resource(ItemDefinitions::presets());
        }
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.insert_resource(self.config.clone())
            .init_resource::<SimulationClock>()
            .init_resource::<DeferredActions>()
            // Intents
            .add_event::<EquipIntent>()
            .add_event::<TryEquipIntent>()
            .add_event::<DropIntent>()
            .add_event::<ActivateIntent>()
            .add_event::<CycleFireModeIntent>()
            // Outputs
            .add_event::<ItemEquipped>()
            .add_event::<ItemDropped>()
            .add_event::<ItemThrown>()
            .add_event::<ApparelWorn>()
            .add_event::<ProjectileFired>()
            .add_event::<WeaponReloaded>()
            .add_event::<EquipmentDiagnostic>()
            // Systems (один логический тик на Update)
            .add_systems(
                Update,
                (
                    advance_simulation_clock,
                    release_destroyed_items,
                    process_deferred_actions,
                    read_hand_input,
                    process_equipment_intents,
                    poll_worn_apparel,
                    tool_auto_shutoff,
                    aim_hands,
                    sync_item_physics_to_rapier,
                    detect_item_ground_contact,
                    check_equipment_invariants,
                    update_hud_snapshot,
                    despawn_expired_projectiles,
                    clear_hand_input,
                )
                    .chain(),
            );
    }
}
