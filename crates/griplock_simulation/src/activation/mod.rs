//! Activation - type-specific реакция предмета на Activate()
//!
//! # Архитектура
//!
//! `Activation` - tagged enum, вариант выбирается один раз при spawn'е
//! по `ItemDefinition.kind` и больше не меняется.
//!
//! `activate()` чистый: меняет только собственный runtime state варианта
//! и возвращает `ActivationEffect`. Мир (spawn projectile, reload соседней
//! руки, deferred throw, свет, голова) меняет coordinator, применяя effect.
//!
//! Ошибки (нет firepoint, нет света, нет оружия в соседней руке) → caller
//! превращает в no-op + diagnostic.

use bevy::prelude::*;

use crate::components::HandId;
use crate::equipment::EquipmentError;
use crate::item_system::{ItemDefinition, ItemId, ItemKind};

pub mod ammunition;
pub mod apparel;
pub mod throwable;
pub mod tool;
pub mod weapon;

pub use ammunition::*;
pub use apparel::*;
pub use throwable::*;
pub use tool::*;
pub use weapon::*;

#[cfg(test)]
mod activation_tests;

/// Контекст вызова (что activation может знать о мире)
#[derive(Clone, Debug)]
pub struct ActivationContext<'a> {
    pub item: &'a ItemId,
    /// Рука, которая держит предмет
    pub hand: HandId,
    /// Тип предмета в соседней руке
    pub opposite_kind: Option<ItemKind>,
}

/// Что coordinator должен сделать после activate
#[derive(Clone, Debug, PartialEq)]
pub enum ActivationEffect {
    /// Ничего (пустое оружие, шапка уже на голове)
    None,
    FireProjectile(Shot),
    ReloadOppositeHand(AmmoLoad),
    /// Deferred throw через `delay_secs`
    ScheduleThrow { delay_secs: f32 },
    ToggleLight,
    WearOnHead,
}

#[derive(Component, Clone, Debug)]
pub enum Activation {
    Weapon(WeaponActivation),
    Ammunition(AmmunitionActivation),
    Throwable(ThrowableActivation),
    Tool(ToolActivation),
    Apparel(ApparelActivation),
}

impl Activation {
    /// Выбрать вариант по kind (template обязателен)
    pub fn from_definition(definition: &ItemDefinition) -> Result<Self, EquipmentError> {
        let missing = || EquipmentError::MissingTemplate {
            item: definition.id.clone(),
            kind: definition.kind,
        };

        let activation = match definition.kind {
            ItemKind::Weapon => {
                Activation::Weapon(WeaponActivation::new(definition.weapon.as_ref().ok_or_else(missing)?))
            }
            ItemKind::Ammunition => Activation::Ammunition(AmmunitionActivation::new(
                definition.ammunition.as_ref().ok_or_else(missing)?,
            )),
            ItemKind::Throwable => Activation::Throwable(ThrowableActivation::new(
                definition.throwable.as_ref().ok_or_else(missing)?,
            )),
            ItemKind::Tool => Activation::Tool(ToolActivation::new(definition.tool.as_ref().ok_or_else(missing)?)),
            ItemKind::Apparel => Activation::Apparel(ApparelActivation::new(
                definition.apparel.as_ref().ok_or_else(missing)?,
            )),
        };

        Ok(activation)
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            Activation::Weapon(_) => ItemKind::Weapon,
            Activation::Ammunition(_) => ItemKind::Ammunition,
            Activation::Throwable(_) => ItemKind::Throwable,
            Activation::Tool(_) => ItemKind::Tool,
            Activation::Apparel(_) => ItemKind::Apparel,
        }
    }

    /// Единая точка dispatch'а
    pub fn activate(&mut self, ctx: &ActivationContext) -> Result<ActivationEffect, EquipmentError> {
        match self {
            Activation::Weapon(weapon) => weapon.fire(ctx),
            Activation::Ammunition(ammo) => ammo.activate(ctx),
            Activation::Throwable(throwable) => throwable.activate(ctx),
            Activation::Tool(tool) => tool.activate(ctx),
            Activation::Apparel(apparel) => Ok(apparel.activate()),
        }
    }

    pub fn as_weapon(&self) -> Option<&WeaponActivation> {
        match self {
            Activation::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    pub fn as_weapon_mut(&mut self) -> Option<&mut WeaponActivation> {
        match self {
            Activation::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    pub fn as_throwable_mut(&mut self) -> Option<&mut ThrowableActivation> {
        match self {
            Activation::Throwable(throwable) => Some(throwable),
            _ => None,
        }
    }

    pub fn as_apparel(&self) -> Option<&ApparelActivation> {
        match self {
            Activation::Apparel(apparel) => Some(apparel),
            _ => None,
        }
    }

    pub fn as_apparel_mut(&mut self) -> Option<&mut ApparelActivation> {
        match self {
            Activation::Apparel(apparel) => Some(apparel),
            _ => None,
        }
    }
}
