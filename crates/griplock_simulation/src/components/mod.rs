//! ECS Components equipment подсистемы
//!
//! Организация по доменам:
//! - hand: слот руки (HandId, Hand) + bindings + aim
//! - item: runtime состояние предмета (EquipmentItem, ItemState)
//! - actor: входы от host'а (ActorView, HandInput) и выход для UI (HudSnapshot)
//! - coordinator: владелец обеих рук (EquipmentCoordinator)

pub mod actor;
pub mod coordinator;
pub mod hand;
pub mod item;

// Re-exports для удобного импорта
pub use actor::*;
pub use coordinator::*;
pub use hand::*;
pub use item::*;
