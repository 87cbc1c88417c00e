//! Equipment error taxonomy
//!
//! Ни одна ошибка не пересекает границу тика: каждая операция над предметом
//! превращается в no-op + diagnostic (log + `EquipmentDiagnostic` event).

use bevy::prelude::*;

use crate::components::HandId;
use crate::item_system::{ItemId, ItemKind};
use crate::logger::LogLevel;

/// Категория ошибки (определяет реакцию и уровень логирования)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Нет обязательной ссылки при инициализации - объект отключён, симуляция идёт дальше
    Configuration,
    /// Неизвестный binding / несуществующая рука - молча игнорируем
    TransientInput,
    /// Операция отклонена preconditions (не в руке, вне радиуса, drop lock...)
    Refused,
    /// Нарушение двусторонней связи Hand ↔ EquipmentItem
    Invariant,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EquipmentError {
    // === Configuration ===
    #[error("hand {hand:?} has no anchor entity")]
    MissingHandAnchor { hand: HandId },

    #[error("actor {actor:?} has no head anchor for apparel")]
    MissingHeadAnchor { actor: Entity },

    #[error("weapon '{item}' has no firepoint")]
    MissingFirepoint { item: ItemId },

    #[error("tool '{item}' has no light emitter")]
    MissingLight { item: ItemId },

    #[error("item '{item}' of kind {kind:?} has no matching template")]
    MissingTemplate { item: ItemId, kind: ItemKind },

    #[error("invalid item definition '{item}': {reason}")]
    InvalidDefinition { item: ItemId, reason: String },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    // === Transient input ===
    #[error("unknown input binding '{0}'")]
    UnknownBinding(String),

    #[error("unmapped hand index {0}")]
    UnmappedHand(u8),

    // === Refusals ===
    #[error("entity {0:?} is not an equipment item")]
    UnknownItem(Entity),

    #[error("entity {0:?} has no equipment coordinator")]
    UnknownActor(Entity),

    #[error("item '{item}' is not grounded")]
    NotGrounded { item: ItemId },

    #[error("item '{item}' is not held")]
    NotHeld { item: ItemId },

    #[error("hand {hand:?} holds nothing")]
    EmptyHand { hand: HandId },

    #[error("item '{item}' is out of range ({distance:.2} > {range:.2})")]
    OutOfRange { item: ItemId, distance: f32, range: f32 },

    #[error("item '{item}' is not targeted by the view ray")]
    NotTargeted { item: ItemId },

    #[error("item '{item}' cannot be dropped on the tick it was equipped")]
    DropLocked { item: ItemId },

    #[error("hand {hand:?} is busy with a pending transition")]
    HandBusy { hand: HandId },

    #[error("hand {hand:?} already holds an item")]
    HandOccupied { hand: HandId },

    #[error("no weapon in the {hand:?} hand to reload")]
    NoWeaponInOppositeHand { hand: HandId },

    #[error("throw of '{item}' is already pending")]
    ThrowPending { item: ItemId },

    #[error("no eligible hand for '{item}'")]
    NoEligibleHand { item: ItemId },

    // === Invariant ===
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl EquipmentError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EquipmentError::MissingHandAnchor { .. }
            | EquipmentError::MissingHeadAnchor { .. }
            | EquipmentError::MissingFirepoint { .. }
            | EquipmentError::MissingLight { .. }
            | EquipmentError::MissingTemplate { .. }
            | EquipmentError::InvalidDefinition { .. }
            | EquipmentError::ConfigParse(_) => ErrorCategory::Configuration,

            EquipmentError::UnknownBinding(_) | EquipmentError::UnmappedHand(_) => {
                ErrorCategory::TransientInput
            }

            EquipmentError::InvariantViolation(_) => ErrorCategory::Invariant,

            _ => ErrorCategory::Refused,
        }
    }

    /// Уровень логирования для diagnostic report
    pub fn log_level(&self) -> LogLevel {
        match self.category() {
            ErrorCategory::Configuration => LogLevel::Warning,
            ErrorCategory::TransientInput | ErrorCategory::Refused => LogLevel::Debug,
            ErrorCategory::Invariant => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let missing = EquipmentError::MissingFirepoint { item: "rifle".into() };
        assert_eq!(missing.category(), ErrorCategory::Configuration);
        assert_eq!(missing.log_level(), LogLevel::Warning);

        let binding = EquipmentError::UnknownBinding("Mouse9".into());
        assert_eq!(binding.category(), ErrorCategory::TransientInput);

        let locked = EquipmentError::DropLocked { item: "rifle".into() };
        assert_eq!(locked.category(), ErrorCategory::Refused);

        let broken = EquipmentError::InvariantViolation("two hands".into());
        assert_eq!(broken.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_messages() {
        let err = EquipmentError::OutOfRange {
            item: "rifle".into(),
            distance: 5.0,
            range: 2.5,
        };
        assert_eq!(err.to_string(), "item 'rifle' is out of range (5.00 > 2.50)");
    }
}
