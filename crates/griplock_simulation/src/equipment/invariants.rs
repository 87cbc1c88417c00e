//! Проверка двусторонней связи Hand ↔ EquipmentItem (конец тика)
//!
//! - Debug build: нарушение = `debug_assert!` (fatal)
//! - Release: stale binding сбрасывается, нарушение репортится

use std::collections::HashMap;

use bevy::prelude::*;

use crate::components::{EquipmentCoordinator, EquipmentItem, HandId, ItemState};
use crate::equipment::{EquipmentDiagnostic, EquipmentError};
use crate::log_error;
use crate::physics::ItemPhysics;

/// Найденное нарушение
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingViolation {
    /// Рука ссылается на предмет, который не считает себя в этой руке
    StaleHand { actor: Entity, hand: HandId, item: Entity },
    /// Предмет в двух руках сразу (вторая ссылка)
    DuplicateHand { actor: Entity, hand: HandId, item: Entity },
    /// Held предмет, на который не ссылается ни одна рука
    OrphanedItem { item: Entity },
}

/// Snapshot предмета для аудита
#[derive(Clone, Copy, Debug)]
pub struct ItemBinding {
    pub state: ItemState,
    pub held_by: Option<HandId>,
    pub holder: Option<Entity>,
}

impl From<&EquipmentItem> for ItemBinding {
    fn from(item: &EquipmentItem) -> Self {
        Self {
            state: item.state(),
            held_by: item.held_by(),
            holder: item.holder(),
        }
    }
}

/// Чистая проверка: руки vs предметы
pub fn audit_bindings<'a>(
    coordinators: impl IntoIterator<Item = (Entity, &'a EquipmentCoordinator)>,
    items: &HashMap<Entity, ItemBinding>,
) -> Vec<BindingViolation> {
    let mut violations = Vec::new();
    let mut referenced: HashMap<Entity, (Entity, HandId)> = HashMap::new();

    for (actor, coordinator) in coordinators {
        for hand in HandId::ALL {
            let Some(item) = coordinator.hand(hand).current() else {
                continue;
            };

            if referenced.contains_key(&item) {
                violations.push(BindingViolation::DuplicateHand { actor, hand, item });
                continue;
            }

            let consistent = items.get(&item).is_some_and(|binding| {
                binding.state == ItemState::Held && binding.held_by == Some(hand) && binding.holder == Some(actor)
            });
            if consistent {
                referenced.insert(item, (actor, hand));
            } else {
                violations.push(BindingViolation::StaleHand { actor, hand, item });
            }
        }
    }

    let mut orphaned: Vec<Entity> = items
        .iter()
        .filter(|(item, binding)| {
            let claims_hand = binding.state == ItemState::Held || binding.held_by.is_some();
            claims_hand && !referenced.contains_key(*item)
        })
        .map(|(item, _)| *item)
        .collect();
    orphaned.sort_by_key(|item| item.index());
    violations.extend(orphaned.into_iter().map(|item| BindingViolation::OrphanedItem { item }));

    violations
}

/// Система: аудит + repair + report
pub fn check_equipment_invariants(
    mut commands: Commands,
    mut coordinators: Query<(Entity, &mut EquipmentCoordinator)>,
    mut items: Query<(Entity, &mut EquipmentItem, &mut ItemPhysics)>,
    mut diagnostics: EventWriter<EquipmentDiagnostic>,
) {
    let snapshot: HashMap<Entity, ItemBinding> = items
        .iter()
        .map(|(entity, item, _)| (entity, ItemBinding::from(item)))
        .collect();

    let violations = audit_bindings(coordinators.iter(), &snapshot);
    if violations.is_empty() {
        return;
    }

    for violation in &violations {
        let message = format!("{:?}", violation);
        log_error(&format!("Equipment invariant violated: {}", message));

        match *violation {
            BindingViolation::StaleHand { actor, hand, item }
            | BindingViolation::DuplicateHand { actor, hand, item } => {
                if let Ok((_, mut coordinator)) = coordinators.get_mut(actor) {
                    coordinator.hand_mut(hand).clear_stale();
                }
                diagnostics.write(EquipmentDiagnostic {
                    actor: Some(actor),
                    item: Some(item),
                    error: EquipmentError::InvariantViolation(message),
                });
            }
            BindingViolation::OrphanedItem { item } => {
                if let Ok((_, mut equipment, mut physics)) = items.get_mut(item) {
                    equipment.detach();
                    physics.unlock();
                    commands.entity(item).remove::<ChildOf>();
                }
                diagnostics.write(EquipmentDiagnostic {
                    actor: None,
                    item: Some(item),
                    error: EquipmentError::InvariantViolation(message),
                });
            }
        }
    }

    debug_assert!(
        violations.is_empty(),
        "equipment invariant violated: {:?}",
        violations
    );
}
