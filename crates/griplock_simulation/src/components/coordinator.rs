//! EquipmentCoordinator - владелец обеих рук актёра
//!
//! Конструируется явно (руки + anchors передаются при spawn'е),
//! без обхода scene graph. Операции над руками - в `equipment::operations`.

use bevy::prelude::*;

use crate::components::{Hand, HandId};
use crate::item_system::ItemKind;

#[derive(Component, Clone, Debug)]
pub struct EquipmentCoordinator {
    pub left: Hand,
    pub right: Hand,
    /// Anchor для apparel (None = шапку надеть нельзя)
    pub head_anchor: Option<Entity>,
}

impl EquipmentCoordinator {
    pub fn new(left: Hand, right: Hand, head_anchor: Option<Entity>) -> Self {
        Self {
            left,
            right,
            head_anchor,
        }
    }

    pub fn hand(&self, id: HandId) -> &Hand {
        match id {
            HandId::Left => &self.left,
            HandId::Right => &self.right,
        }
    }

    pub fn hand_mut(&mut self, id: HandId) -> &mut Hand {
        match id {
            HandId::Left => &mut self.left,
            HandId::Right => &mut self.right,
        }
    }

    /// Какая рука держит предмет
    pub fn hand_holding(&self, item: Entity) -> Option<HandId> {
        HandId::ALL
            .into_iter()
            .find(|id| self.hand(*id).current() == Some(item))
    }

    /// Первая свободная рука (left → right), занятые swap'ом пропускаются
    pub fn first_free_hand(&self) -> Option<HandId> {
        HandId::ALL.into_iter().find(|id| {
            let hand = self.hand(*id);
            hand.is_empty() && !hand.is_busy()
        })
    }

    /// Рука для swap'а когда обе заняты (left → right)
    pub fn first_swappable_hand(&self) -> Option<HandId> {
        HandId::ALL.into_iter().find(|id| !self.hand(*id).is_busy())
    }

    /// Предмет уничтожен: отпустить руку, которая его держит или ждёт swap'ом.
    /// Возвращает руки, у которых сброшен binding.
    pub(crate) fn forget_item(&mut self, item: Entity, tick: u64) -> Vec<HandId> {
        let mut released = Vec::new();
        for id in HandId::ALL {
            let hand = self.hand_mut(id);
            if hand.current() == Some(item) {
                hand.release(tick);
                released.push(id);
            }
            if hand.pending_swap() == Some(item) {
                hand.take_swap();
                released.push(id);
            }
        }
        released
    }

    /// Держит ли рука предмет данного типа
    ///
    /// `kind_of` - lookup типа по entity (обычно через `Query<&EquipmentItem>`).
    pub fn is_type_in_hand(
        &self,
        kind: ItemKind,
        hand: HandId,
        kind_of: impl Fn(Entity) -> Option<ItemKind>,
    ) -> bool {
        self.hand(hand)
            .current()
            .and_then(kind_of)
            .is_some_and(|held| held == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandBindings;

    fn coordinator() -> EquipmentCoordinator {
        EquipmentCoordinator::new(
            Hand::new(HandId::Left, None, HandBindings::default_for(HandId::Left)),
            Hand::new(HandId::Right, None, HandBindings::default_for(HandId::Right)),
            None,
        )
    }

    #[test]
    fn test_first_free_hand_prefers_left() {
        let mut coordinator = coordinator();
        assert_eq!(coordinator.first_free_hand(), Some(HandId::Left));

        coordinator.left.equip(Entity::from_raw(1), 1);
        assert_eq!(coordinator.first_free_hand(), Some(HandId::Right));

        coordinator.right.reserve_swap(Entity::from_raw(2));
        assert_eq!(coordinator.first_free_hand(), None);
        assert_eq!(coordinator.first_swappable_hand(), Some(HandId::Left));
    }

    #[test]
    fn test_forget_item_clears_current_and_pending_swap() {
        let mut coordinator = coordinator();
        let grenade = Entity::from_raw(3);

        coordinator.left.reserve_swap(grenade);
        coordinator.right.equip(grenade, 1);

        assert_eq!(coordinator.forget_item(grenade, 2), vec![HandId::Left, HandId::Right]);
        assert!(!coordinator.left.is_busy());
        assert!(coordinator.right.is_empty());
        assert!(coordinator.right.transitioned_at(2));
        assert!(coordinator.forget_item(grenade, 3).is_empty());
    }

    #[test]
    fn test_is_type_in_hand() {
        let mut coordinator = coordinator();
        let rifle = Entity::from_raw(1);
        let kind_of = |entity: Entity| (entity == rifle).then_some(ItemKind::Weapon);

        assert!(!coordinator.is_type_in_hand(ItemKind::Weapon, HandId::Right, kind_of));

        coordinator.right.equip(rifle, 1);
        assert!(coordinator.is_type_in_hand(ItemKind::Weapon, HandId::Right, kind_of));
        assert!(!coordinator.is_type_in_hand(ItemKind::Tool, HandId::Right, kind_of));
        assert!(!coordinator.is_type_in_hand(ItemKind::Weapon, HandId::Left, kind_of));
        assert_eq!(coordinator.hand_holding(rifle), Some(HandId::Right));
    }
}
