//! Hand - слот для одного предмета
//!
//! Hand не владеет предметом: `current` это non-owning ссылка (Entity).
//! Менять binding можно только через coordinator (`pub(crate)` мутаторы),
//! чтобы `Hand.current` и `EquipmentItem.held_by` оставались согласованы.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::HandBindings;
use crate::equipment::EquipmentError;

/// Идентификатор руки
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum HandId {
    Left,
    Right,
}

impl HandId {
    /// Порядок обхода (tie-break: левая раньше правой)
    pub const ALL: [HandId; 2] = [HandId::Left, HandId::Right];

    pub fn opposite(&self) -> HandId {
        match self {
            HandId::Left => HandId::Right,
            HandId::Right => HandId::Left,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            HandId::Left => 0,
            HandId::Right => 1,
        }
    }

    /// Host передаёт руку числом (0 = left, 1 = right)
    pub fn from_index(index: u8) -> Result<Self, EquipmentError> {
        match index {
            0 => Ok(HandId::Left),
            1 => Ok(HandId::Right),
            other => Err(EquipmentError::UnmappedHand(other)),
        }
    }
}

/// Рука актёра
#[derive(Clone, Debug)]
pub struct Hand {
    pub id: HandId,
    pub bindings: HandBindings,
    /// Anchor entity (child актёра), к которому reparent'ится предмет
    pub anchor: Option<Entity>,
    /// Сглаженный поворот к точке прицеливания (только визуал)
    pub aim_rotation: Quat,

    current: Option<Entity>,
    /// Предмет, зарезервированный незавершённым swap'ом
    pending_swap: Option<Entity>,
    last_transition_tick: Option<u64>,
}

impl Hand {
    pub fn new(id: HandId, anchor: Option<Entity>, bindings: HandBindings) -> Self {
        Self {
            id,
            bindings,
            anchor,
            aim_rotation: Quat::IDENTITY,
            current: None,
            pending_swap: None,
            last_transition_tick: None,
        }
    }

    /// Предмет в руке
    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Рука ждёт завершения swap'а (input игнорируется)
    pub fn is_busy(&self) -> bool {
        self.pending_swap.is_some()
    }

    pub fn pending_swap(&self) -> Option<Entity> {
        self.pending_swap
    }

    /// Был ли equip/drop/swap у этой руки на данном тике
    pub fn transitioned_at(&self, tick: u64) -> bool {
        self.last_transition_tick == Some(tick)
    }

    pub(crate) fn equip(&mut self, item: Entity, tick: u64) {
        self.current = Some(item);
        self.last_transition_tick = Some(tick);
    }

    pub(crate) fn release(&mut self, tick: u64) -> Option<Entity> {
        self.last_transition_tick = Some(tick);
        self.current.take()
    }

    pub(crate) fn reserve_swap(&mut self, item: Entity) {
        self.pending_swap = Some(item);
    }

    pub(crate) fn take_swap(&mut self) -> Option<Entity> {
        self.pending_swap.take()
    }

    /// Invariant repair: сбросить stale binding без отметки о transition
    pub(crate) fn clear_stale(&mut self) -> Option<Entity> {
        self.current.take()
    }

    /// Плавный доворот к целевому повороту
    pub fn smooth_aim(&mut self, target: Quat, speed: f32, delta_secs: f32) {
        let t = (speed * delta_secs).clamp(0.0, 1.0);
        self.aim_rotation = self.aim_rotation.slerp(target, t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand() -> Hand {
        Hand::new(HandId::Left, None, HandBindings::default_for(HandId::Left))
    }

    #[test]
    fn test_opposite_and_index() {
        assert_eq!(HandId::Left.opposite(), HandId::Right);
        assert_eq!(HandId::Right.opposite(), HandId::Left);
        assert_eq!(HandId::from_index(1).unwrap(), HandId::Right);
        assert_eq!(HandId::from_index(2), Err(EquipmentError::UnmappedHand(2)));
    }

    #[test]
    fn test_equip_release() {
        let mut hand = hand();
        let item = Entity::from_raw(7);

        hand.equip(item, 3);
        assert_eq!(hand.current(), Some(item));
        assert!(hand.transitioned_at(3));
        assert!(!hand.transitioned_at(4));

        assert_eq!(hand.release(5), Some(item));
        assert!(hand.is_empty());
        assert!(hand.transitioned_at(5));
    }

    #[test]
    fn test_pending_swap_marks_busy() {
        let mut hand = hand();
        let item = Entity::from_raw(9);

        hand.reserve_swap(item);
        assert!(hand.is_busy());
        assert_eq!(hand.take_swap(), Some(item));
        assert!(!hand.is_busy());
    }

    #[test]
    fn test_smooth_aim_converges() {
        let mut hand = hand();
        let target = Quat::from_rotation_y(1.0);

        hand.smooth_aim(target, 10.0, 0.05);
        let halfway = hand.aim_rotation.angle_between(target);
        assert!(halfway > 0.0 && halfway < 1.0);

        // speed * dt >= 1 → сразу в цель
        hand.smooth_aim(target, 100.0, 0.05);
        assert!(hand.aim_rotation.angle_between(target) < 1e-4);
    }
}
