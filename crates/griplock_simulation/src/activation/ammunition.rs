//! AmmunitionActivation - одноразовый reload оружия в соседней руке

use crate::activation::{ActivationContext, ActivationEffect};
use crate::equipment::EquipmentError;
use crate::item_system::{AmmunitionTemplate, ItemKind, ProjectileTemplate};

/// Что передаётся оружию при reload
#[derive(Clone, Debug, PartialEq)]
pub struct AmmoLoad {
    pub bullets_amount: u32,
    pub projectile: ProjectileTemplate,
}

#[derive(Clone, Debug)]
pub struct AmmunitionActivation {
    pub load: AmmoLoad,
}

impl AmmunitionActivation {
    pub fn new(template: &AmmunitionTemplate) -> Self {
        Self {
            load: AmmoLoad {
                bullets_amount: template.bullets_amount,
                projectile: template.projectile.clone(),
            },
        }
    }

    /// Нет оружия в соседней руке → ошибка, магазин остаётся целым
    pub fn activate(&self, ctx: &ActivationContext) -> Result<ActivationEffect, EquipmentError> {
        if ctx.opposite_kind != Some(ItemKind::Weapon) {
            return Err(EquipmentError::NoWeaponInOppositeHand {
                hand: ctx.hand.opposite(),
            });
        }

        Ok(ActivationEffect::ReloadOppositeHand(self.load.clone()))
    }
}
