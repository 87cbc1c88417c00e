//! Компоненты актёра: входы от host'а и выход для UI
//!
//! Host каждый тик пишет `ActorView` (viewpoint + raycast) и `HandInput`
//! (нажатые bindings). Симуляция пишет `HudSnapshot` (read-only для UI).

use std::collections::HashSet;

use bevy::prelude::*;

use crate::components::HandId;
use crate::config::InputBinding;

/// Результат raycast'а из viewpoint
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewHit {
    pub position: Vec3,
    /// Entity под лучом (None = геометрия уровня)
    pub entity: Option<Entity>,
    pub distance: f32,
}

/// Viewpoint актёра (камера/голова)
#[derive(Component, Clone, Debug)]
pub struct ActorView {
    pub origin: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Линейная скорость актёра (наследуется при drop)
    pub velocity: Vec3,
    /// Ближайшее попадание луча из центра экрана (host raycast)
    pub hit: Option<ViewHit>,
}

impl Default for ActorView {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
            velocity: Vec3::ZERO,
            hit: None,
        }
    }
}

impl ActorView {
    pub fn new(origin: Vec3, forward: Vec3) -> Self {
        Self {
            origin,
            forward: forward.normalize_or(Vec3::NEG_Z),
            ..default()
        }
    }

    /// Попадание в пределах `max_distance`
    pub fn raycast_from_view(&self, max_distance: f32) -> Option<ViewHit> {
        self.hit.filter(|hit| hit.distance <= max_distance)
    }

    /// Точка прицеливания: попадание или точка на максимальной дистанции
    pub fn aim_point(&self, max_distance: f32) -> Vec3 {
        match self.raycast_from_view(max_distance) {
            Some(hit) => hit.position,
            None => self.origin + self.forward * max_distance,
        }
    }

    /// Луч указывает на detection collider этого entity
    pub fn targets(&self, entity: Entity) -> bool {
        self.hit.and_then(|hit| hit.entity) == Some(entity)
    }

    pub fn targeted_entity(&self) -> Option<Entity> {
        self.hit.and_then(|hit| hit.entity)
    }
}

/// Input актёра за текущий тик
///
/// `down` - edge (нажато на этом тике), `held` - удерживается.
/// Очищается в конце тика (`end_tick`).
#[derive(Component, Clone, Debug, Default)]
pub struct HandInput {
    down: HashSet<InputBinding>,
    held: HashSet<InputBinding>,
}

impl HandInput {
    /// Нажатие (edge + held)
    pub fn press(&mut self, binding: InputBinding) {
        self.down.insert(binding);
        self.held.insert(binding);
    }

    /// Удержание без edge
    pub fn hold(&mut self, binding: InputBinding) {
        self.held.insert(binding);
    }

    pub fn release(&mut self, binding: InputBinding) {
        self.down.remove(&binding);
        self.held.remove(&binding);
    }

    /// Unmapped binding (`None`) никогда не срабатывает
    pub fn is_key_down(&self, binding: Option<InputBinding>) -> bool {
        binding.is_some_and(|b| self.down.contains(&b))
    }

    pub fn is_key_held(&self, binding: Option<InputBinding>) -> bool {
        binding.is_some_and(|b| self.held.contains(&b))
    }

    /// Edge'и живут один тик, held сохраняется до release
    pub fn end_tick(&mut self) {
        self.down.clear();
    }
}

/// Данные руки для UI
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandHud {
    pub item_name: Option<String>,
    /// (current, max)
    pub ammo: Option<(u32, u32)>,
    pub fire_mode: Option<&'static str>,
}

/// Snapshot для UI collaborator'а (пишется каждый тик)
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct HudSnapshot {
    /// Имя grounded предмета под прицелом
    pub targeted_name: Option<String>,
    pub left: HandHud,
    pub right: HandHud,
}

impl HudSnapshot {
    pub fn hand(&self, hand: HandId) -> &HandHud {
        match hand {
            HandId::Left => &self.left,
            HandId::Right => &self.right,
        }
    }

    pub fn hand_mut(&mut self, hand: HandId) -> &mut HandHud {
        match hand {
            HandId::Left => &mut self.left,
            HandId::Right => &mut self.right,
        }
    }
}

/// Marker: anchor entity руки
#[derive(Component, Clone, Copy, Debug)]
pub struct HandAnchor {
    pub actor: Entity,
    pub hand: HandId,
}

/// Marker: anchor entity головы (apparel)
#[derive(Component, Clone, Copy, Debug)]
pub struct HeadAnchor {
    pub actor: Entity,
}

/// Источник света (flashlight)
#[derive(Component, Clone, Debug, PartialEq)]
pub struct LightEmitter {
    pub enabled: bool,
    pub intensity: f32,
    pub range: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_point_fallback() {
        let mut view = ActorView::new(Vec3::new(0.0, 1.6, 0.0), Vec3::NEG_Z);
        assert_eq!(view.aim_point(10.0), Vec3::new(0.0, 1.6, -10.0));

        view.hit = Some(ViewHit {
            position: Vec3::new(0.0, 1.6, -4.0),
            entity: None,
            distance: 4.0,
        });
        assert_eq!(view.aim_point(10.0), Vec3::new(0.0, 1.6, -4.0));

        // Попадание дальше max_distance игнорируется
        assert_eq!(view.aim_point(2.0), Vec3::new(0.0, 1.6, -2.0));
    }

    #[test]
    fn test_targets() {
        let item = Entity::from_raw(5);
        let mut view = ActorView::default();
        assert!(!view.targets(item));

        view.hit = Some(ViewHit {
            position: Vec3::ZERO,
            entity: Some(item),
            distance: 1.0,
        });
        assert!(view.targets(item));
        assert_eq!(view.targeted_entity(), Some(item));
    }

    #[test]
    fn test_input_edges_reset() {
        let fire = InputBinding::key('F');
        let mut input = HandInput::default();

        input.press(fire);
        assert!(input.is_key_down(Some(fire)));
        assert!(input.is_key_held(Some(fire)));
        assert!(!input.is_key_down(None));

        input.end_tick();
        assert!(!input.is_key_down(Some(fire)));
        assert!(input.is_key_held(Some(fire)));

        input.release(fire);
        assert!(!input.is_key_held(Some(fire)));
    }
}
