//! EquipmentItem - runtime состояние предмета
//!
//! # State machine
//!
//! ```text
//! Grounded ──equip──► Held ──drop──► Grounded
//!    │                  │
//!    └─swap reserve─► Transitioning ◄─wear on head─┘
//!                       │
//!                       └──complete swap / equip from head──► Held
//! ```
//!
//! Инвариант: `Grounded` ⇒ `held_by == None`, `Held` ⇒ `held_by == Some(..)`.
//! Поля приватные, переходы только через `pub(crate)` методы.

use std::sync::Arc;

use bevy::prelude::*;

use crate::components::HandId;
use crate::equipment::EquipmentError;
use crate::item_system::ItemDefinition;

/// Состояние предмета
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum ItemState {
    /// Свободный физический предмет (initial)
    Grounded,
    /// В руке
    Held,
    /// Зарезервирован swap'ом или надет на голову
    Transitioning,
}

#[derive(Component, Clone, Debug)]
pub struct EquipmentItem {
    pub definition: Arc<ItemDefinition>,
    state: ItemState,
    held_by: Option<HandId>,
    /// Актёр, у которого предмет (в руке, в swap'е или на голове)
    holder: Option<Entity>,
    can_drop: bool,
}

impl EquipmentItem {
    pub fn new(definition: Arc<ItemDefinition>) -> Self {
        Self {
            definition,
            state: ItemState::Grounded,
            held_by: None,
            holder: None,
            can_drop: false,
        }
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn held_by(&self) -> Option<HandId> {
        self.held_by
    }

    pub fn holder(&self) -> Option<Entity> {
        self.holder
    }

    pub fn can_drop(&self) -> bool {
        self.can_drop
    }

    pub fn is_grounded(&self) -> bool {
        self.state == ItemState::Grounded
    }

    pub fn is_held(&self) -> bool {
        self.state == ItemState::Held
    }

    /// Preconditions для Drop
    pub fn check_drop(&self) -> Result<(), EquipmentError> {
        if !self.is_held() {
            return Err(EquipmentError::NotHeld {
                item: self.definition.id.clone(),
            });
        }
        if !self.can_drop {
            return Err(EquipmentError::DropLocked {
                item: self.definition.id.clone(),
            });
        }
        Ok(())
    }

    /// Transform предмета в руке (local относительно anchor'а)
    pub fn equipped_transform(&self, hand: HandId) -> Transform {
        self.definition.equipped_pose(hand)
    }

    /// Transform предмета на земле в заданной world позиции
    pub fn unequipped_transform(&self, translation: Vec3) -> Transform {
        Transform {
            translation,
            rotation: self.definition.unequipped_rotation_quat(),
            scale: self.definition.unequipped_scale,
        }
    }

    /// → Held. `can_drop` false до EnableDrop на следующем тике.
    pub(crate) fn attach(&mut self, hand: HandId, holder: Entity) {
        self.state = ItemState::Held;
        self.held_by = Some(hand);
        self.holder = Some(holder);
        self.can_drop = false;
    }

    /// → Grounded
    pub(crate) fn detach(&mut self) {
        self.state = ItemState::Grounded;
        self.held_by = None;
        self.holder = None;
        self.can_drop = false;
    }

    /// → Transitioning (swap reservation / надет на голову)
    pub(crate) fn reserve(&mut self, holder: Entity) {
        self.state = ItemState::Transitioning;
        self.held_by = None;
        self.holder = Some(holder);
        self.can_drop = false;
    }

    /// Вызывается deferred EnableDrop. Если предмет уже не в руке - no-op.
    pub(crate) fn enable_drop(&mut self) -> bool {
        if self.is_held() {
            self.can_drop = true;
        }
        self.can_drop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_system::preset_assault_rifle;

    fn rifle() -> EquipmentItem {
        EquipmentItem::new(Arc::new(preset_assault_rifle()))
    }

    #[test]
    fn test_initial_state_grounded() {
        let item = rifle();
        assert!(item.is_grounded());
        assert!(!item.is_held());
        assert_eq!(item.held_by(), None);
        assert!(!item.can_drop());
    }

    #[test]
    fn test_drop_locked_until_enabled() {
        let mut item = rifle();
        let actor = Entity::from_raw(1);

        item.attach(HandId::Left, actor);
        assert_eq!(
            item.check_drop(),
            Err(EquipmentError::DropLocked { item: "assault_rifle".into() })
        );

        assert!(item.enable_drop());
        assert_eq!(item.check_drop(), Ok(()));
        assert_eq!(item.held_by(), Some(HandId::Left));
        assert_eq!(item.holder(), Some(actor));
    }

    #[test]
    fn test_enable_drop_ignored_when_not_held() {
        let mut item = rifle();
        assert!(!item.enable_drop());
        assert!(matches!(item.check_drop(), Err(EquipmentError::NotHeld { .. })));
    }

    #[test]
    fn test_reserve_clears_hand() {
        let mut item = rifle();
        let actor = Entity::from_raw(1);

        item.attach(HandId::Right, actor);
        item.reserve(actor);

        assert_eq!(item.state(), ItemState::Transitioning);
        assert_eq!(item.held_by(), None);
        assert_eq!(item.holder(), Some(actor));
    }

    #[test]
    fn test_unequipped_transform_restores_pose() {
        let item = rifle();
        let transform = item.unequipped_transform(Vec3::new(1.0, 0.0, 2.0));

        assert_eq!(transform.translation, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(transform.rotation, item.definition.unequipped_rotation_quat());
        assert_eq!(transform.scale, item.definition.unequipped_scale);
    }
}
