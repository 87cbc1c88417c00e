//! Доворот рук к точке прицеливания (только визуал, state не меняет)

use bevy::prelude::*;

use crate::components::{ActorView, EquipmentCoordinator, EquipmentItem, HandAnchor, HandId};
use crate::config::EquipmentConfig;

/// Скорость доворота пустой руки
const EMPTY_HAND_ROTATE_SPEED: f32 = 10.0;

/// Поворот "смотреть из `from` на `target`"; вырожденный случай → None
pub fn aim_rotation(from: Vec3, target: Vec3, up: Vec3) -> Option<Quat> {
    let direction = (target - from).try_normalize()?;
    let up = up.try_normalize().unwrap_or(Vec3::Y);
    if direction.cross(up).length_squared() < 1e-6 {
        return None;
    }
    Some(Transform::from_translation(from).looking_to(direction, up).rotation)
}

pub fn aim_hands(
    mut actors: Query<(&mut EquipmentCoordinator, &ActorView)>,
    anchors: Query<&GlobalTransform, With<HandAnchor>>,
    items: Query<&EquipmentItem>,
    config: Res<EquipmentConfig>,
) {
    let delta = config.tick_seconds();

    for (mut coordinator, view) in actors.iter_mut() {
        let target = view.aim_point(config.aim_distance);

        for hand in HandId::ALL {
            let slot = coordinator.hand(hand);
            let Some(anchor) = slot.anchor.and_then(|anchor| anchors.get(anchor).ok()) else {
                continue;
            };
            let Some(desired) = aim_rotation(anchor.translation(), target, view.up) else {
                continue;
            };

            let speed = slot
                .current()
                .and_then(|item| items.get(item).ok())
                .map_or(EMPTY_HAND_ROTATE_SPEED, |item| item.definition.rotate_to_mouse_speed);

            coordinator.hand_mut(hand).smooth_aim(desired, speed, delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_rotation_faces_target() {
        let rotation = aim_rotation(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0), Vec3::Y).unwrap();
        let forward = rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_aim_rotation_degenerate() {
        assert!(aim_rotation(Vec3::ONE, Vec3::ONE, Vec3::Y).is_none());
        // Цель строго сверху - up параллелен направлению
        assert!(aim_rotation(Vec3::ZERO, Vec3::Y * 3.0, Vec3::Y).is_none());
    }
}
