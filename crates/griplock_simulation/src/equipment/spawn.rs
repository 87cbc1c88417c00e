//! Spawn helpers: предметы и актёры
//!
//! Явная конструкция вместо поиска по scene graph: актёр получает
//! anchors рук/головы при spawn'е, предмет - activation по своему kind.

use std::sync::Arc;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::activation::Activation;
use crate::components::{
    ActorView, EquipmentCoordinator, EquipmentItem, Hand, HandAnchor, HandId, HandInput, HeadAnchor,
    HudSnapshot, LightEmitter,
};
use crate::config::EquipmentConfig;
use crate::equipment::EquipmentError;
use crate::item_system::ItemDefinition;
use crate::logger::log;
use crate::physics::ItemPhysics;

/// Высота глаз актёра (viewpoint origin)
pub const EYE_HEIGHT: f32 = 1.6;

/// Spawn предмета на земле
///
/// Невалидная definition / нет template под kind → ConfigurationError,
/// предмет не создаётся.
pub fn spawn_equipment_item(
    commands: &mut Commands,
    definition: Arc<ItemDefinition>,
    position: Vec3,
) -> Result<Entity, EquipmentError> {
    definition.validate()?;
    let activation = Activation::from_definition(&definition)?;

    let half = definition.collider_half_extents;
    let light = definition
        .tool
        .as_ref()
        .and_then(|tool| tool.light.as_ref())
        .map(|light| LightEmitter {
            enabled: false,
            intensity: light.intensity,
            range: light.range,
        });

    let mut entity = commands.spawn((
        Name::new(definition.name.clone()),
        Transform {
            translation: position,
            rotation: definition.unequipped_rotation_quat(),
            scale: definition.unequipped_scale,
        },
        EquipmentItem::new(definition.clone()),
        ItemPhysics::resting(),
        activation,
        // Rapier physics
        RigidBody::Dynamic,
        Collider::cuboid(half.x, half.y, half.z),
        Velocity::zero(),
        ExternalImpulse::default(),
    ));

    if let Some(light) = light {
        entity.insert(light);
    }

    let id = entity.id();
    log(&format!("Spawned {} ({}) at {:?}", definition.name, definition.id, position));
    Ok(id)
}

/// Layout anchors относительно актёра
#[derive(Clone, Copy, Debug)]
pub struct ActorAnchors {
    pub left_hand: Vec3,
    pub right_hand: Vec3,
    /// None = актёр без головы (apparel не надевается)
    pub head: Option<Vec3>,
}

impl Default for ActorAnchors {
    fn default() -> Self {
        Self {
            left_hand: Vec3::new(-0.4, 1.3, -0.3),
            right_hand: Vec3::new(0.4, 1.3, -0.3),
            head: Some(Vec3::new(0.0, 1.75, 0.0)),
        }
    }
}

/// Spawn актёра с координатором, anchors, view и input
pub fn spawn_equipment_actor(
    commands: &mut Commands,
    config: &EquipmentConfig,
    position: Vec3,
    anchors: ActorAnchors,
) -> Entity {
    let actor = commands
        .spawn((
            Name::new("EquipmentActor"),
            Transform::from_translation(position),
            ActorView::new(position + Vec3::Y * EYE_HEIGHT, Vec3::NEG_Z),
            HandInput::default(),
            HudSnapshot::default(),
        ))
        .id();

    let mut spawn_hand = |hand: HandId, offset: Vec3| {
        commands
            .spawn((
                Name::new(format!("{:?}HandAnchor", hand)),
                Transform::from_translation(offset),
                HandAnchor { actor, hand },
                ChildOf(actor),
            ))
            .id()
    };
    let left = spawn_hand(HandId::Left, anchors.left_hand);
    let right = spawn_hand(HandId::Right, anchors.right_hand);

    let head = anchors.head.map(|offset| {
        commands
            .spawn((
                Name::new("HeadAnchor"),
                Transform::from_translation(offset),
                HeadAnchor { actor },
                ChildOf(actor),
            ))
            .id()
    });

    commands.entity(actor).insert(EquipmentCoordinator::new(
        Hand::new(HandId::Left, Some(left), config.bindings_for(HandId::Left).clone()),
        Hand::new(HandId::Right, Some(right), config.bindings_for(HandId::Right).clone()),
        head,
    ));

    actor
}
