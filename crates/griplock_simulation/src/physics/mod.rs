//! Physics adapter предметов
//!
//! `ItemPhysics` - единственный владелец физического состояния предмета
//! (kinematic lock, коллайдеры, impulse). Системы синхронизации зеркалят его
//! в Rapier компоненты; сам Rapier step делает host.

pub mod item_physics;
pub mod sync;

// Re-export основных типов
pub use item_physics::{drop_impulse, random_torque, throw_impulse, ItemImpulse, ItemPhysics};
pub use sync::{detect_item_ground_contact, sync_item_physics_to_rapier};
