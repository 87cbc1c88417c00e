//! Projectile - граница ответственности
//!
//! Симуляция только spawn'ит снаряд (transform + impulse к точке прицела)
//! и despawn'ит его по истечении lifetime. Полёт и попадания - Rapier/host.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::equipment::SimulationClock;
use crate::item_system::ProjectileTemplate;

/// Снаряд, выпущенный оружием
#[derive(Component, Clone, Debug)]
pub struct Projectile {
    pub weapon: Entity,
    /// Prefab path для визуала host'а
    pub prefab: String,
}

/// Тик, на котором снаряд despawn'ится
#[derive(Component, Clone, Copy, Debug)]
pub struct ProjectileLifetime {
    pub expires_at_tick: u64,
}

/// Spawn снаряда в firepoint
pub fn spawn_projectile(
    commands: &mut Commands,
    weapon: Entity,
    template: &ProjectileTemplate,
    origin: Vec3,
    rotation: Quat,
    direction: Vec3,
    expires_at_tick: u64,
) -> Entity {
    commands
        .spawn((
            Name::new("Projectile"),
            Projectile {
                weapon,
                prefab: template.prefab.clone(),
            },
            ProjectileLifetime { expires_at_tick },
            Transform {
                translation: origin,
                rotation,
                scale: Vec3::ONE,
            },
            // Rapier physics
            RigidBody::Dynamic,
            Collider::ball(0.02),
            Velocity::zero(),
            ExternalImpulse {
                impulse: direction * template.speed,
                torque_impulse: Vec3::ZERO,
            },
        ))
        .id()
}

/// Despawn снарядов с истёкшим lifetime
pub fn despawn_expired_projectiles(
    mut commands: Commands,
    clock: Res<SimulationClock>,
    projectiles: Query<(Entity, &ProjectileLifetime), With<Projectile>>,
) {
    for (entity, lifetime) in projectiles.iter() {
        if clock.tick() >= lifetime.expires_at_tick {
            commands.entity(entity).despawn();
        }
    }
}
