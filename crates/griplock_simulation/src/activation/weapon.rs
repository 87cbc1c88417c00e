//! WeaponActivation - стрельба, reload, fire mode

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::activation::{ActivationContext, ActivationEffect};
use crate::equipment::EquipmentError;
use crate::item_system::{ProjectileTemplate, WeaponTemplate};

/// Режим огня
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum FireMode {
    /// Один выстрел на нажатие
    #[default]
    SemiAuto,
    /// Очередь пока кнопка удерживается (через `fire_interval_secs`)
    FullAuto,
}

impl FireMode {
    pub fn next(&self) -> FireMode {
        match self {
            FireMode::SemiAuto => FireMode::FullAuto,
            FireMode::FullAuto => FireMode::SemiAuto,
        }
    }

    /// Label для HUD
    pub fn label(&self) -> &'static str {
        match self {
            FireMode::SemiAuto => "SEMI",
            FireMode::FullAuto => "AUTO",
        }
    }
}

/// Мутабельное состояние оружия (меняется выстрелом и reload'ом)
#[derive(Clone, Debug, PartialEq)]
pub struct WeaponRuntimeState {
    pub current_ammo: u32,
    pub max_ammo: u32,
    pub fire_mode: FireMode,
    /// Текущий template снаряда (reload подменяет на template патронов)
    pub projectile: ProjectileTemplate,
}

/// Параметры одного выстрела для coordinator'а
#[derive(Clone, Debug, PartialEq)]
pub struct Shot {
    /// Firepoint в local space предмета
    pub firepoint: Vec3,
    pub projectile: ProjectileTemplate,
    pub max_hit_distance: f32,
}

#[derive(Clone, Debug)]
pub struct WeaponActivation {
    pub state: WeaponRuntimeState,
    pub firepoint: Option<Vec3>,
    pub max_hit_distance: f32,
    pub fire_interval_secs: f32,
    last_shot_tick: Option<u64>,
}

impl WeaponActivation {
    pub fn new(template: &WeaponTemplate) -> Self {
        Self {
            state: WeaponRuntimeState {
                current_ammo: template.starting_ammo.min(template.max_ammo),
                max_ammo: template.max_ammo,
                fire_mode: template.fire_mode,
                projectile: template.projectile.clone(),
            },
            firepoint: template.firepoint,
            max_hit_distance: template.max_hit_distance,
            fire_interval_secs: template.fire_interval_secs,
            last_shot_tick: None,
        }
    }

    pub fn current_ammo(&self) -> u32 {
        self.state.current_ammo
    }

    /// Выстрел
    ///
    /// - 0 патронов → `ActivationEffect::None` (ammo не меняется)
    /// - нет firepoint → `MissingFirepoint` (ammo не меняется)
    pub fn fire(&mut self, ctx: &ActivationContext) -> Result<ActivationEffect, EquipmentError> {
        if self.state.current_ammo == 0 {
            return Ok(ActivationEffect::None);
        }

        let Some(firepoint) = self.firepoint else {
            return Err(EquipmentError::MissingFirepoint {
                item: ctx.item.clone(),
            });
        };

        self.state.current_ammo -= 1;

        Ok(ActivationEffect::FireProjectile(Shot {
            firepoint,
            projectile: self.state.projectile.clone(),
            max_hit_distance: self.max_hit_distance,
        }))
    }

    /// Reload: ammo = min(bullets, max), template снаряда → template патронов
    pub fn reload(&mut self, bullets_amount: u32, projectile: ProjectileTemplate) {
        self.state.current_ammo = bullets_amount.min(self.state.max_ammo);
        self.state.projectile = projectile;
    }

    pub fn cycle_fire_mode(&mut self) -> FireMode {
        self.state.fire_mode = self.state.fire_mode.next();
        self.state.fire_mode
    }

    pub(crate) fn record_shot(&mut self, tick: u64) {
        self.last_shot_tick = Some(tick);
    }

    /// Готово ли оружие к следующему выстрелу очереди (только FullAuto)
    pub fn ready_for_auto_fire(&self, tick: u64, interval_ticks: u64) -> bool {
        if self.state.fire_mode != FireMode::FullAuto {
            return false;
        }
        self.last_shot_tick
            .map_or(true, |last| tick >= last + interval_ticks)
    }
}
