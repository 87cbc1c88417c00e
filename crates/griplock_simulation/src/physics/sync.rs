//! ItemPhysics → Rapier синхронизация
//!
//! Rapier компоненты (`RigidBody`, `Velocity`, `ExternalImpulse`,
//! `ColliderDisabled`) пишем только здесь. Остальной код меняет `ItemPhysics`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::config::EquipmentConfig;
use crate::physics::ItemPhysics;

/// Зеркалим изменённый ItemPhysics в Rapier
pub fn sync_item_physics_to_rapier(
    mut commands: Commands,
    mut query: Query<
        (
            Entity,
            &mut ItemPhysics,
            &mut RigidBody,
            &mut Velocity,
            &mut ExternalImpulse,
            Has<ColliderDisabled>,
        ),
        Changed<ItemPhysics>,
    >,
) {
    for (entity, mut physics, mut body, mut velocity, mut external, collider_disabled) in query.iter_mut() {
        let wanted = if physics.is_kinematic() {
            RigidBody::KinematicPositionBased
        } else {
            RigidBody::Dynamic
        };
        if *body != wanted {
            *body = wanted;
        }

        if physics.is_kinematic() {
            *velocity = Velocity::zero();
            *external = ExternalImpulse::default();
        }

        match (physics.colliders_enabled(), collider_disabled) {
            (false, false) => {
                commands.entity(entity).insert(ColliderDisabled);
            }
            (true, true) => {
                commands.entity(entity).remove::<ColliderDisabled>();
            }
            _ => {}
        }

        // take_pending не должен снова пометить компонент как Changed
        if let Some(impulse) = physics.bypass_change_detection().take_pending() {
            if let Some(inherited) = impulse.inherited_velocity {
                velocity.linvel = inherited;
            }
            external.impulse += impulse.linear;
            external.torque_impulse += impulse.torque;
        }
    }
}

/// Ground contact по resting скорости
pub fn detect_item_ground_contact(
    mut query: Query<(&mut ItemPhysics, &Velocity)>,
    config: Res<EquipmentConfig>,
) {
    for (mut physics, velocity) in query.iter_mut() {
        let speed = velocity.linvel.length();
        // Без лишних Changed для sync системы
        let physics = physics.bypass_change_detection();
        physics.update_ground_contact(speed, config.rest_speed_threshold);
    }
}
