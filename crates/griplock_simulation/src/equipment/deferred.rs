//! Deferred actions - явные отложенные переходы
//!
//! Вместо скрытых suspension points: flat список `{fire_at_tick, seq, action}`.
//! Каждый тик `take_due` отдаёт созревшие записи в порядке `(fire_at_tick, seq)`
//! (FIFO для одного предмета). Despawn предмета через coordinator вызывает
//! `cancel_for`, остальное отменяется проверкой preconditions при исполнении.

use bevy::prelude::*;

use crate::components::HandId;

/// Счётчик тиков симуляции (один инкремент на `Update`)
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct SimulationClock {
    tick: u64,
}

impl SimulationClock {
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub(crate) fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// Отложенный переход
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    /// `can_drop = true` (тик после equip)
    EnableDrop { item: Entity },
    /// Второй шаг swap'а: equip нового предмета
    CompleteSwap { actor: Entity, hand: HandId, item: Entity },
    /// Бросок после `throw_delay`
    ExecuteThrow { item: Entity },
    /// Шапка считается worn после settle delay
    SettleApparel { item: Entity },
}

impl DeferredAction {
    pub fn item(&self) -> Entity {
        match *self {
            DeferredAction::EnableDrop { item }
            | DeferredAction::CompleteSwap { item, .. }
            | DeferredAction::ExecuteThrow { item }
            | DeferredAction::SettleApparel { item } => item,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeferredRecord {
    pub fire_at_tick: u64,
    pub seq: u64,
    pub action: DeferredAction,
}

#[derive(Resource, Debug, Default)]
pub struct DeferredActions {
    records: Vec<DeferredRecord>,
    next_seq: u64,
}

impl DeferredActions {
    pub fn schedule(&mut self, fire_at_tick: u64, action: DeferredAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.records.push(DeferredRecord {
            fire_at_tick,
            seq,
            action,
        });
    }

    /// Забрать все записи с `fire_at_tick <= tick`
    pub fn take_due(&mut self, tick: u64) -> Vec<DeferredAction> {
        let (mut due, rest): (Vec<_>, Vec<_>) = self
            .records
            .drain(..)
            .partition(|record| record.fire_at_tick <= tick);
        self.records = rest;

        due.sort_by_key(|record| (record.fire_at_tick, record.seq));
        due.into_iter().map(|record| record.action).collect()
    }

    /// Удалить все записи предмета. Возвращает сколько удалено.
    pub fn cancel_for(&mut self, item: Entity) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.action.item() != item);
        before - self.records.len()
    }

    pub fn pending_for(&self, item: Entity) -> impl Iterator<Item = &DeferredRecord> {
        self.records.iter().filter(move |record| record.action.item() == item)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_due_ordering() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let mut deferred = DeferredActions::default();

        deferred.schedule(5, DeferredAction::ExecuteThrow { item: a });
        deferred.schedule(3, DeferredAction::EnableDrop { item: b });
        deferred.schedule(5, DeferredAction::SettleApparel { item: b });
        deferred.schedule(9, DeferredAction::EnableDrop { item: a });

        assert!(deferred.take_due(2).is_empty());

        let due = deferred.take_due(5);
        assert_eq!(
            due,
            vec![
                DeferredAction::EnableDrop { item: b },
                DeferredAction::ExecuteThrow { item: a },
                DeferredAction::SettleApparel { item: b },
            ]
        );
        assert_eq!(deferred.len(), 1);
    }

    #[test]
    fn test_cancel_for_item() {
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);
        let mut deferred = DeferredActions::default();

        deferred.schedule(1, DeferredAction::EnableDrop { item: a });
        deferred.schedule(
            4,
            DeferredAction::CompleteSwap {
                actor: b,
                hand: HandId::Left,
                item: a,
            },
        );
        deferred.schedule(2, DeferredAction::EnableDrop { item: b });

        assert_eq!(deferred.pending_for(a).count(), 2);
        assert_eq!(deferred.cancel_for(a), 2);
        assert_eq!(deferred.pending_for(a).count(), 0);
        assert_eq!(deferred.len(), 1);
    }

    #[test]
    fn test_clock_advances() {
        let mut clock = SimulationClock::default();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.tick(), 1);
    }
}
