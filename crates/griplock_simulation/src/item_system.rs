//! Item System - статические определения предметов
//!
//! # Архитектура
//!
//! **ItemDefinition** - immutable blueprint одного типа предмета:
//! - offsets/rotations/scale для руки и для земли
//! - drop force, equip range, скорость доворота к прицелу
//! - template блок под конкретный `ItemKind` (weapon / ammunition / throwable / tool / apparel)
//!
//! **ItemDefinitions** - registry (resource), definitions раздаются как `Arc`:
//! - hardcoded presets в `ItemDefinitions::presets()` (`default()` - пустой registry)
//! - или каталог из RON (`ItemDefinitions::from_ron_str`)
//!
//! Runtime состояние (ammo, fire mode, throw pending) живёт не здесь,
//! а в `Activation` компоненте конкретного предмета.
//!
//! # Пример
//!
//! ```ignore
//! let defs = ItemDefinitions::presets();
//! let rifle = defs.get(&"assault_rifle".into()).expect("preset");
//! assert_eq!(rifle.kind, ItemKind::Weapon);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::activation::FireMode;
use crate::components::HandId;
use crate::equipment::EquipmentError;

// ============================================================================
// ItemId
// ============================================================================

/// Item identifier (unique string ID)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// ItemKind
// ============================================================================

/// Тип предмета (определяет какой Activation вариант получит instance)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon,
    Ammunition,
    Throwable,
    Tool,
    Apparel,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Weapon => "Weapon",
            ItemKind::Ammunition => "Ammunition",
            ItemKind::Throwable => "Throwable",
            ItemKind::Tool => "Tool",
            ItemKind::Apparel => "Apparel",
        }
    }
}

// ============================================================================
// Shared data blocks
// ============================================================================

/// Offset предмета относительно anchor'а каждой руки
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandOffsets {
    pub left: Vec3,
    pub right: Vec3,
}

impl HandOffsets {
    pub fn for_hand(&self, hand: HandId) -> Vec3 {
        match hand {
            HandId::Left => self.left,
            HandId::Right => self.right,
        }
    }

    /// Зеркальные offsets (правая рука = +X, левая = -X)
    pub fn mirrored(right: Vec3) -> Self {
        Self {
            left: Vec3::new(-right.x, right.y, right.z),
            right,
        }
    }
}

/// Сила drop impulse (вдоль forward и up viewpoint'а)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropForce {
    pub forward: f32,
    pub upward: f32,
}

/// Данные снаряда (prefab + скорость + стартовый поворот)
///
/// Weapon держит текущий template, Reload подменяет его на template патронов.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileTemplate {
    /// Prefab path для визуала (host spawn'ит по нему)
    pub prefab: String,
    /// Скорость снаряда (impulse magnitude)
    pub speed: f32,
    /// Стартовый поворот (euler, градусы) относительно firepoint
    pub start_rotation: Vec3,
    /// Время жизни до despawn (секунды)
    pub lifetime_secs: f32,
}

// ============================================================================
// Templates (по одному на ItemKind)
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponTemplate {
    pub max_ammo: u32,
    pub starting_ammo: u32,
    /// Дальность aim raycast'а (fallback - точка на этой дистанции)
    pub max_hit_distance: f32,
    /// Firepoint относительно предмета (None = не настроен)
    pub firepoint: Option<Vec3>,
    pub fire_mode: FireMode,
    /// Интервал автоматической стрельбы (секунды)
    pub fire_interval_secs: f32,
    pub projectile: ProjectileTemplate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmmunitionTemplate {
    pub bullets_amount: u32,
    pub projectile: ProjectileTemplate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThrowableTemplate {
    pub throw_delay_secs: f32,
    pub max_throw_distance: f32,
    pub throw_force: f32,
    /// Upward impulse = distance / distance_divider (форма дуги)
    pub distance_divider: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightTemplate {
    pub intensity: f32,
    pub range: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolTemplate {
    /// Источник света (None = не настроен, activate → warning no-op)
    pub light: Option<LightTemplate>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApparelTemplate {
    /// Поза на head anchor'е
    pub head_offset: Vec3,
    pub head_rotation: Vec3,
    pub head_scale: Vec3,
}

// ============================================================================
// ItemDefinition
// ============================================================================

/// Static item definition (blueprint)
///
/// Immutable после загрузки, шарится между instances через `Arc`.
/// Rotations - euler углы в градусах (порядок Y → X → Z).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    /// Отображаемое имя (UI)
    pub name: String,
    pub kind: ItemKind,
    /// Максимальная дистанция от viewpoint для equip
    pub equip_range: f32,
    pub hand_offset: HandOffsets,
    pub equipped_rotation: Vec3,
    pub unequipped_rotation: Vec3,
    pub equipped_scale: Vec3,
    pub unequipped_scale: Vec3,
    pub drop_force: DropForce,
    /// Скорость доворота руки к точке прицеливания
    pub rotate_to_mouse_speed: f32,
    /// Half extents коробки коллайдера
    #[serde(default = "default_collider_half_extents")]
    pub collider_half_extents: Vec3,

    #[serde(default)]
    pub weapon: Option<WeaponTemplate>,
    #[serde(default)]
    pub ammunition: Option<AmmunitionTemplate>,
    #[serde(default)]
    pub throwable: Option<ThrowableTemplate>,
    #[serde(default)]
    pub tool: Option<ToolTemplate>,
    #[serde(default)]
    pub apparel: Option<ApparelTemplate>,
}

fn default_collider_half_extents() -> Vec3 {
    Vec3::splat(0.15)
}

/// Euler (градусы, Y → X → Z) → Quat
pub fn euler_degrees(angles: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        angles.y.to_radians(),
        angles.x.to_radians(),
        angles.z.to_radians(),
    )
}

impl ItemDefinition {
    /// Поза предмета в руке (local transform относительно hand anchor'а)
    pub fn equipped_pose(&self, hand: HandId) -> Transform {
        Transform {
            translation: self.hand_offset.for_hand(hand),
            rotation: euler_degrees(self.equipped_rotation),
            scale: self.equipped_scale,
        }
    }

    pub fn unequipped_rotation_quat(&self) -> Quat {
        euler_degrees(self.unequipped_rotation)
    }

    /// Проверка что template под kind присутствует
    pub fn has_template_for_kind(&self) -> bool {
        match self.kind {
            ItemKind::Weapon => self.weapon.is_some(),
            ItemKind::Ammunition => self.ammunition.is_some(),
            ItemKind::Throwable => self.throwable.is_some(),
            ItemKind::Tool => self.tool.is_some(),
            ItemKind::Apparel => self.apparel.is_some(),
        }
    }

    /// Валидация definition (вызывается при загрузке каталога и spawn'е)
    pub fn validate(&self) -> Result<(), EquipmentError> {
        let invalid = |reason: &str| EquipmentError::InvalidDefinition {
            item: self.id.clone(),
            reason: reason.to_string(),
        };

        if !(self.equip_range > 0.0) {
            return Err(invalid("equip_range must be positive"));
        }

        let scales = [self.equipped_scale, self.unequipped_scale];
        if scales.iter().any(|s| s.abs().min_element() < f32::EPSILON) {
            return Err(invalid("scale components must be non-zero"));
        }

        if !self.has_template_for_kind() {
            return Err(EquipmentError::MissingTemplate {
                item: self.id.clone(),
                kind: self.kind,
            });
        }

        if let Some(weapon) = &self.weapon {
            if weapon.max_ammo == 0 {
                return Err(invalid("weapon max_ammo must be positive"));
            }
            if weapon.starting_ammo > weapon.max_ammo {
                return Err(invalid("weapon starting_ammo exceeds max_ammo"));
            }
        }

        if let Some(throwable) = &self.throwable {
            if !(throwable.distance_divider > 0.0) {
                return Err(invalid("throwable distance_divider must be positive"));
            }
            if throwable.throw_delay_secs < 0.0 {
                return Err(invalid("throwable throw_delay_secs must not be negative"));
            }
        }

        Ok(())
    }
}

// ============================================================================
// ItemDefinitions (Resource)
// ============================================================================

/// RON каталог: `(items: [ ... ])`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<ItemDefinition>,
}

/// Item definitions lookup table (resource)
#[derive(Resource, Clone, Debug, Default)]
pub struct ItemDefinitions {
    definitions: HashMap<ItemId, Arc<ItemDefinition>>,
}

impl ItemDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ItemId) -> Option<Arc<ItemDefinition>> {
        self.definitions.get(id).cloned()
    }

    /// Добавить definition (после validate)
    pub fn add(&mut self, definition: ItemDefinition) -> Result<Arc<ItemDefinition>, EquipmentError> {
        definition.validate()?;
        let shared = Arc::new(definition);
        self.definitions.insert(shared.id.clone(), shared.clone());
        Ok(shared)
    }

    /// Все IDs (отсортированы для детерминизма)
    pub fn all_ids(&self) -> Vec<&ItemId> {
        let mut ids: Vec<_> = self.definitions.keys().collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        ids
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Загрузить каталог из RON
    ///
    /// Любая невалидная definition → ошибка всего каталога (ConfigurationError).
    pub fn from_ron_str(source: &str) -> Result<Self, EquipmentError> {
        let catalog: ItemCatalog =
            ron::from_str(source).map_err(|e| EquipmentError::ConfigParse(e.to_string()))?;

        let mut defs = Self::new();
        for definition in catalog.items {
            defs.add(definition)?;
        }

        Ok(defs)
    }

    /// Hardcoded presets (по одному на каждый ItemKind + пистолет)
    pub fn presets() -> Self {
        let mut defs = Self::new();

        for definition in [
            preset_assault_rifle(),
            preset_pistol(),
            preset_rifle_magazine(),
            preset_frag_grenade(),
            preset_flashlight(),
            preset_cowboy_hat(),
        ] {
            // Presets валидны по построению (покрыто тестом)
            if let Err(err) = defs.add(definition) {
                crate::log_error(&format!("Invalid item preset: {}", err));
            }
        }

        defs
    }
}

// ============================================================================
// Presets
// ============================================================================

fn rifle_round() -> ProjectileTemplate {
    ProjectileTemplate {
        prefab: "projectiles/rifle_round".to_string(),
        speed: 120.0,
        start_rotation: Vec3::new(90.0, 0.0, 0.0),
        lifetime_secs: 3.0,
    }
}

pub fn preset_assault_rifle() -> ItemDefinition {
    ItemDefinition {
        id: "assault_rifle".into(),
        name: "Assault Rifle".to_string(),
        kind: ItemKind::Weapon,
        equip_range: 2.5,
        hand_offset: HandOffsets::mirrored(Vec3::new(0.35, -0.3, -0.6)),
        equipped_rotation: Vec3::ZERO,
        unequipped_rotation: Vec3::new(0.0, 0.0, 90.0),
        equipped_scale: Vec3::ONE,
        unequipped_scale: Vec3::ONE,
        drop_force: DropForce { forward: 4.0, upward: 2.0 },
        rotate_to_mouse_speed: 12.0,
        collider_half_extents: Vec3::new(0.08, 0.12, 0.5),
        weapon: Some(WeaponTemplate {
            max_ammo: 30,
            starting_ammo: 30,
            max_hit_distance: 100.0,
            firepoint: Some(Vec3::new(0.0, 0.05, -0.6)),
            fire_mode: FireMode::FullAuto,
            fire_interval_secs: 0.1,
            projectile: rifle_round(),
        }),
        ammunition: None,
        throwable: None,
        tool: None,
        apparel: None,
    }
}

pub fn preset_pistol() -> ItemDefinition {
    ItemDefinition {
        id: "pistol".into(),
        name: "Pistol".to_string(),
        kind: ItemKind::Weapon,
        equip_range: 2.0,
        hand_offset: HandOffsets::mirrored(Vec3::new(0.3, -0.25, -0.45)),
        equipped_rotation: Vec3::ZERO,
        unequipped_rotation: Vec3::new(0.0, 0.0, 90.0),
        equipped_scale: Vec3::ONE,
        unequipped_scale: Vec3::ONE,
        drop_force: DropForce { forward: 3.0, upward: 1.5 },
        rotate_to_mouse_speed: 16.0,
        collider_half_extents: Vec3::new(0.05, 0.1, 0.15),
        weapon: Some(WeaponTemplate {
            max_ammo: 12,
            starting_ammo: 12,
            max_hit_distance: 60.0,
            firepoint: Some(Vec3::new(0.0, 0.04, -0.2)),
            fire_mode: FireMode::SemiAuto,
            fire_interval_secs: 0.2,
            projectile: ProjectileTemplate {
                prefab: "projectiles/pistol_round".to_string(),
                speed: 80.0,
                start_rotation: Vec3::new(90.0, 0.0, 0.0),
                lifetime_secs: 2.0,
            },
        }),
        ammunition: None,
        throwable: None,
        tool: None,
        apparel: None,
    }
}

pub fn preset_rifle_magazine() -> ItemDefinition {
    ItemDefinition {
        id: "rifle_magazine".into(),
        name: "Rifle Magazine (AP)".to_string(),
        kind: ItemKind::Ammunition,
        equip_range: 2.0,
        hand_offset: HandOffsets::mirrored(Vec3::new(0.3, -0.3, -0.4)),
        equipped_rotation: Vec3::ZERO,
        unequipped_rotation: Vec3::new(90.0, 0.0, 0.0),
        equipped_scale: Vec3::ONE,
        unequipped_scale: Vec3::ONE,
        drop_force: DropForce { forward: 2.0, upward: 1.0 },
        rotate_to_mouse_speed: 10.0,
        collider_half_extents: Vec3::new(0.03, 0.1, 0.05),
        weapon: None,
        ammunition: Some(AmmunitionTemplate {
            bullets_amount: 30,
            projectile: ProjectileTemplate {
                prefab: "projectiles/rifle_round_ap".to_string(),
                speed: 140.0,
                start_rotation: Vec3::new(90.0, 0.0, 0.0),
                lifetime_secs: 3.0,
            },
        }),
        throwable: None,
        tool: None,
        apparel: None,
    }
}

pub fn preset_frag_grenade() -> ItemDefinition {
    ItemDefinition {
        id: "frag_grenade".into(),
        name: "Frag Grenade".to_string(),
        kind: ItemKind::Throwable,
        equip_range: 2.0,
        hand_offset: HandOffsets::mirrored(Vec3::new(0.3, -0.25, -0.4)),
        equipped_rotation: Vec3::ZERO,
        unequipped_rotation: Vec3::ZERO,
        equipped_scale: Vec3::splat(0.8),
        unequipped_scale: Vec3::ONE,
        drop_force: DropForce { forward: 2.0, upward: 1.0 },
        rotate_to_mouse_speed: 10.0,
        collider_half_extents: Vec3::splat(0.06),
        weapon: None,
        ammunition: None,
        throwable: Some(ThrowableTemplate {
            throw_delay_secs: 0.3,
            max_throw_distance: 25.0,
            throw_force: 12.0,
            distance_divider: 4.0,
        }),
        tool: None,
        apparel: None,
    }
}

pub fn preset_flashlight() -> ItemDefinition {
    ItemDefinition {
        id: "flashlight".into(),
        name: "Flashlight".to_string(),
        kind: ItemKind::Tool,
        equip_range: 2.0,
        hand_offset: HandOffsets::mirrored(Vec3::new(0.3, -0.3, -0.5)),
        equipped_rotation: Vec3::ZERO,
        unequipped_rotation: Vec3::new(0.0, 0.0, 90.0),
        equipped_scale: Vec3::ONE,
        unequipped_scale: Vec3::ONE,
        drop_force: DropForce { forward: 3.0, upward: 1.0 },
        rotate_to_mouse_speed: 14.0,
        collider_half_extents: Vec3::new(0.04, 0.04, 0.15),
        weapon: None,
        ammunition: None,
        throwable: None,
        tool: Some(ToolTemplate {
            light: Some(LightTemplate {
                intensity: 800.0,
                range: 15.0,
            }),
        }),
        apparel: None,
    }
}

pub fn preset_cowboy_hat() -> ItemDefinition {
    ItemDefinition {
        id: "cowboy_hat".into(),
        name: "Cowboy Hat".to_string(),
        kind: ItemKind::Apparel,
        equip_range: 2.0,
        hand_offset: HandOffsets::mirrored(Vec3::new(0.35, -0.2, -0.5)),
        equipped_rotation: Vec3::new(-20.0, 0.0, 0.0),
        unequipped_rotation: Vec3::ZERO,
        equipped_scale: Vec3::splat(0.7),
        unequipped_scale: Vec3::ONE,
        drop_force: DropForce { forward: 1.5, upward: 1.0 },
        rotate_to_mouse_speed: 8.0,
        collider_half_extents: Vec3::new(0.2, 0.08, 0.2),
        weapon: None,
        ammunition: None,
        throwable: None,
        tool: None,
        apparel: Some(ApparelTemplate {
            head_offset: Vec3::new(0.0, 0.15, 0.0),
            head_rotation: Vec3::ZERO,
            head_scale: Vec3::ONE,
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_cover_every_kind() {
        let defs = ItemDefinitions::presets();
        assert_eq!(defs.len(), 6);
        // default() - пустой registry, presets только через presets()
        assert!(ItemDefinitions::default().is_empty());

        let kinds: Vec<ItemKind> = defs
            .all_ids()
            .into_iter()
            .filter_map(|id| defs.get(id))
            .map(|def| def.kind)
            .collect();

        for kind in [
            ItemKind::Weapon,
            ItemKind::Ammunition,
            ItemKind::Throwable,
            ItemKind::Tool,
            ItemKind::Apparel,
        ] {
            assert!(kinds.contains(&kind), "missing preset for {:?}", kind);
        }
    }

    #[test]
    fn test_validate_rejects_missing_template() {
        let mut rifle = preset_assault_rifle();
        rifle.weapon = None;

        assert_eq!(
            rifle.validate(),
            Err(EquipmentError::MissingTemplate {
                item: "assault_rifle".into(),
                kind: ItemKind::Weapon,
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        let mut rifle = preset_assault_rifle();
        rifle.equip_range = 0.0;
        assert!(matches!(rifle.validate(), Err(EquipmentError::InvalidDefinition { .. })));

        let mut grenade = preset_frag_grenade();
        if let Some(throwable) = grenade.throwable.as_mut() {
            throwable.distance_divider = 0.0;
        }
        assert!(matches!(grenade.validate(), Err(EquipmentError::InvalidDefinition { .. })));

        let mut hat = preset_cowboy_hat();
        hat.unequipped_scale = Vec3::new(1.0, 0.0, 1.0);
        assert!(hat.validate().is_err());
    }

    #[test]
    fn test_equipped_pose_uses_hand_offset() {
        let rifle = preset_assault_rifle();

        let left = rifle.equipped_pose(HandId::Left);
        let right = rifle.equipped_pose(HandId::Right);

        assert_eq!(left.translation, Vec3::new(-0.35, -0.3, -0.6));
        assert_eq!(right.translation, Vec3::new(0.35, -0.3, -0.6));
        assert_eq!(right.scale, Vec3::ONE);
    }

    #[test]
    fn test_euler_degrees_yaw() {
        let quat = euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        let rotated = quat * Vec3::NEG_Z;
        assert!((rotated - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_catalog_from_ron() {
        let source = r#"(
            items: [
                (
                    id: "torch",
                    name: "Torch",
                    kind: Tool,
                    equip_range: 1.5,
                    hand_offset: (left: (-0.3, -0.3, -0.5), right: (0.3, -0.3, -0.5)),
                    equipped_rotation: (0.0, 0.0, 0.0),
                    unequipped_rotation: (0.0, 0.0, 90.0),
                    equipped_scale: (1.0, 1.0, 1.0),
                    unequipped_scale: (1.0, 1.0, 1.0),
                    drop_force: (forward: 2.0, upward: 1.0),
                    rotate_to_mouse_speed: 10.0,
                    tool: Some((light: None)),
                ),
            ],
        )"#;

        let defs = ItemDefinitions::from_ron_str(source).unwrap();
        let torch = defs.get(&"torch".into()).unwrap();

        assert_eq!(torch.kind, ItemKind::Tool);
        assert_eq!(torch.collider_half_extents, Vec3::splat(0.15)); // default
        assert_eq!(torch.tool, Some(ToolTemplate { light: None }));
    }

    #[test]
    fn test_catalog_rejects_invalid_item() {
        let source = r#"(
            items: [
                (
                    id: "broken",
                    name: "Broken",
                    kind: Weapon,
                    equip_range: 1.5,
                    hand_offset: (left: (0.0, 0.0, 0.0), right: (0.0, 0.0, 0.0)),
                    equipped_rotation: (0.0, 0.0, 0.0),
                    unequipped_rotation: (0.0, 0.0, 0.0),
                    equipped_scale: (1.0, 1.0, 1.0),
                    unequipped_scale: (1.0, 1.0, 1.0),
                    drop_force: (forward: 2.0, upward: 1.0),
                    rotate_to_mouse_speed: 10.0,
                ),
            ],
        )"#;

        assert!(matches!(
            ItemDefinitions::from_ron_str(source),
            Err(EquipmentError::MissingTemplate { .. })
        ));
    }
}
