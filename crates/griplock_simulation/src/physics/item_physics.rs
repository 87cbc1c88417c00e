//! ItemPhysics - состояние rigid body предмета + impulse math
//!
//! Архитектура:
//! - В руке: kinematic, коллайдеры (ground + detection) выключены
//! - На земле: dynamic, коллайдеры включены
//! - Impulse копится в `pending`, sync система переносит в `ExternalImpulse`
//!
//! Random torque берётся из `DeterministicRng` (seeded) для детерминизма.

use bevy::prelude::*;
use rand::Rng;

use crate::item_system::{ItemDefinition, ThrowableTemplate};

/// Сколько тиков после unlock ground contact не засчитывается
/// (даём Rapier применить impulse)
pub const AIRBORNE_GRACE_TICKS: u8 = 3;

/// Impulse к применению на следующем sync
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ItemImpulse {
    /// Скорость держателя (наследуется при drop)
    pub inherited_velocity: Option<Vec3>,
    pub linear: Vec3,
    pub torque: Vec3,
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct ItemPhysics {
    kinematic: bool,
    colliders_enabled: bool,
    ground_contact: bool,
    airborne_grace: u8,
    pending: Option<ItemImpulse>,
}

impl ItemPhysics {
    /// Лежит на земле (состояние при spawn'е)
    pub fn resting() -> Self {
        Self {
            kinematic: false,
            colliders_enabled: true,
            ground_contact: true,
            airborne_grace: 0,
            pending: None,
        }
    }

    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    pub fn colliders_enabled(&self) -> bool {
        self.colliders_enabled
    }

    pub fn has_ground_contact(&self) -> bool {
        self.ground_contact
    }

    pub fn pending(&self) -> Option<&ItemImpulse> {
        self.pending.as_ref()
    }

    /// Equip: kinematic + коллайдеры off, незаконченный impulse выбрасываем
    pub fn lock(&mut self) {
        self.kinematic = true;
        self.colliders_enabled = false;
        self.ground_contact = false;
        self.airborne_grace = 0;
        self.pending = None;
    }

    /// Drop / throw: dynamic + коллайдеры on
    pub fn unlock(&mut self) {
        self.kinematic = false;
        self.colliders_enabled = true;
        self.ground_contact = false;
        self.airborne_grace = AIRBORNE_GRACE_TICKS;
    }

    /// Impulse суммируется до следующего sync. Kinematic тело impulse не принимает.
    pub fn apply_impulse(&mut self, impulse: ItemImpulse) -> bool {
        if self.kinematic {
            return false;
        }

        let merged = match self.pending.take() {
            Some(prev) => ItemImpulse {
                inherited_velocity: impulse.inherited_velocity.or(prev.inherited_velocity),
                linear: prev.linear + impulse.linear,
                torque: prev.torque + impulse.torque,
            },
            None => impulse,
        };
        self.pending = Some(merged);
        true
    }

    pub(crate) fn take_pending(&mut self) -> Option<ItemImpulse> {
        self.pending.take()
    }

    /// Обновить ground contact по скорости. Возвращает новое значение.
    pub(crate) fn update_ground_contact(&mut self, speed: f32, rest_threshold: f32) -> bool {
        if self.kinematic {
            self.ground_contact = false;
        } else if self.airborne_grace > 0 {
            self.airborne_grace -= 1;
            self.ground_contact = false;
        } else {
            self.ground_contact = speed <= rest_threshold;
        }
        self.ground_contact
    }
}

/// Bounded random torque: каждая компонента в [-max, max]
pub fn random_torque(rng: &mut impl Rng, max_torque: f32) -> Vec3 {
    if max_torque <= 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0),
    ) * max_torque
}

/// Drop impulse: скорость держателя + forward/up drop force + random torque
pub fn drop_impulse(
    definition: &ItemDefinition,
    holder_velocity: Vec3,
    forward: Vec3,
    up: Vec3,
    rng: &mut impl Rng,
    max_torque: f32,
) -> ItemImpulse {
    let force = definition.drop_force;
    ItemImpulse {
        inherited_velocity: Some(holder_velocity),
        linear: forward.normalize_or_zero() * force.forward + up.normalize_or_zero() * force.upward,
        torque: random_torque(rng, max_torque),
    }
}

/// Throw impulse: forward × throw_force + up × (distance / divider) + random torque
///
/// `origin` - позиция руки, `target` - точка прицела (raycast или max distance).
pub fn throw_impulse(
    template: &ThrowableTemplate,
    origin: Vec3,
    target: Vec3,
    rng: &mut impl Rng,
    max_torque: f32,
) -> ItemImpulse {
    let offset = target - origin;
    let distance = offset.length();
    let direction = offset.normalize_or_zero();

    ItemImpulse {
        inherited_velocity: None,
        linear: direction * template.throw_force + Vec3::Y * (distance / template.distance_divider),
        torque: random_torque(rng, max_torque),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_system::{preset_assault_rifle, preset_frag_grenade};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_lock_unlock() {
        let mut physics = ItemPhysics::resting();
        assert!(physics.has_ground_contact());

        physics.lock();
        assert!(physics.is_kinematic());
        assert!(!physics.colliders_enabled());
        assert!(!physics.apply_impulse(ItemImpulse::default()));

        physics.unlock();
        assert!(!physics.is_kinematic());
        assert!(physics.colliders_enabled());
        assert!(!physics.has_ground_contact());
    }

    #[test]
    fn test_ground_contact_after_grace() {
        let mut physics = ItemPhysics::resting();
        physics.lock();
        physics.unlock();

        for _ in 0..AIRBORNE_GRACE_TICKS {
            assert!(!physics.update_ground_contact(0.0, 0.05));
        }
        assert!(!physics.update_ground_contact(3.0, 0.05)); // ещё летит
        assert!(physics.update_ground_contact(0.01, 0.05));
    }

    #[test]
    fn test_pending_impulses_accumulate() {
        let mut physics = ItemPhysics::resting();
        physics.apply_impulse(ItemImpulse {
            inherited_velocity: None,
            linear: Vec3::X,
            torque: Vec3::ZERO,
        });
        physics.apply_impulse(ItemImpulse {
            inherited_velocity: Some(Vec3::Z),
            linear: Vec3::Y,
            torque: Vec3::ONE,
        });

        let pending = physics.take_pending().unwrap();
        assert_eq!(pending.linear, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(pending.torque, Vec3::ONE);
        assert_eq!(pending.inherited_velocity, Some(Vec3::Z));
        assert!(physics.pending().is_none());
    }

    #[test]
    fn test_random_torque_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let torque = random_torque(&mut rng, 10.0);
            assert!(torque.abs().max_element() <= 10.0);
        }
        assert_eq!(random_torque(&mut rng, 0.0), Vec3::ZERO);
    }

    #[test]
    fn test_drop_impulse_composition() {
        let rifle = preset_assault_rifle();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let impulse = drop_impulse(&rifle, Vec3::new(2.0, 0.0, 0.0), Vec3::NEG_Z, Vec3::Y, &mut rng, 0.0);

        assert_eq!(impulse.inherited_velocity, Some(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(impulse.linear, Vec3::new(0.0, 2.0, -4.0));
        assert_eq!(impulse.torque, Vec3::ZERO);
    }

    #[test]
    fn test_throw_impulse_arc() {
        let grenade = preset_frag_grenade();
        let template = grenade.throwable.unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let impulse = throw_impulse(&template, Vec3::ZERO, Vec3::new(0.0, 0.0, -8.0), &mut rng, 0.0);

        // forward 12 + upward 8 / 4
        assert_eq!(impulse.linear, Vec3::new(0.0, 2.0, -12.0));
        assert_eq!(impulse.inherited_velocity, None);
    }
}
