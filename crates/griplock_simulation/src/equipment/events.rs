//! Equipment events
//!
//! # Architecture
//!
//! **Intents (host / AI → симуляция):**
//! - `EquipIntent` → equip предмета в конкретную руку (без проверки targeting/range)
//! - `TryEquipIntent` → equip с проверкой eligibility, рука выбирается автоматически
//! - `DropIntent` → drop (опционально с throw impulse)
//! - `ActivateIntent` → Activate() предмета
//! - `CycleFireModeIntent` → переключить fire mode оружия в руке
//!
//! **Outputs (симуляция → host / UI):**
//! - `ItemEquipped`, `ItemDropped`, `ItemThrown`, `ApparelWorn`
//! - `ProjectileFired`, `WeaponReloaded`
//! - `EquipmentDiagnostic` - каждая операция, превращённая в no-op

use bevy::prelude::*;

use crate::components::HandId;
use crate::equipment::EquipmentError;

// ============================================================================
// Intents
// ============================================================================

/// Equip предмета в руку
///
/// # Flow
/// 1. Предмет должен быть Grounded, рука пустая и не занята swap'ом
/// 2. Reparent к anchor'у руки, equipped pose, kinematic lock
/// 3. `can_drop` включается на следующем тике
#[derive(Event, Clone, Debug)]
pub struct EquipIntent {
    pub actor: Entity,
    pub item: Entity,
    pub hand: HandId,
}

/// Equip с eligibility (range + targeting + grounded)
///
/// Свободная рука выбирается left → right. Обе заняты → swap в первую
/// не занятую swap'ом руку.
#[derive(Event, Clone, Debug)]
pub struct TryEquipIntent {
    pub actor: Entity,
    pub item: Entity,
}

/// Drop предмета из руки
#[derive(Event, Clone, Debug)]
pub struct DropIntent {
    pub actor: Entity,
    pub item: Entity,
    pub hand: HandId,
    /// Применить drop impulse (скорость держателя + drop force + torque)
    pub apply_forces: bool,
}

/// Activate() предмета (no-op если предмет не в руке)
#[derive(Event, Clone, Debug)]
pub struct ActivateIntent {
    pub item: Entity,
}

#[derive(Event, Clone, Debug)]
pub struct CycleFireModeIntent {
    pub actor: Entity,
    pub hand: HandId,
}

// ============================================================================
// Outputs
// ============================================================================

#[derive(Event, Clone, Debug, PartialEq)]
pub struct ItemEquipped {
    pub actor: Entity,
    pub item: Entity,
    pub hand: HandId,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct ItemDropped {
    pub actor: Entity,
    pub item: Entity,
    pub hand: HandId,
    pub applied_forces: bool,
}

/// Бросок выполнен (deferred throw)
#[derive(Event, Clone, Debug, PartialEq)]
pub struct ItemThrown {
    pub actor: Entity,
    pub item: Entity,
    pub target: Vec3,
    pub impulse: Vec3,
}

/// Шапка осела на голове (после settle delay)
#[derive(Event, Clone, Debug, PartialEq)]
pub struct ApparelWorn {
    pub actor: Entity,
    pub item: Entity,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct ProjectileFired {
    pub weapon: Entity,
    pub projectile: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub ammo_left: u32,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub struct WeaponReloaded {
    pub weapon: Entity,
    /// Магазин (уже despawn'ут к моменту чтения)
    pub ammunition: Entity,
    pub current_ammo: u32,
}

/// Операция отклонена / деградировала в no-op
#[derive(Event, Clone, Debug, PartialEq)]
pub struct EquipmentDiagnostic {
    pub actor: Option<Entity>,
    pub item: Option<Entity>,
    pub error: EquipmentError,
}
