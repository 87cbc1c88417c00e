//! HUD snapshot для UI collaborator'а (read-only, пишется каждый тик)

use bevy::prelude::*;

use crate::activation::Activation;
use crate::components::{ActorView, EquipmentCoordinator, EquipmentItem, HandHud, HandId, HudSnapshot};

pub fn update_hud_snapshot(
    mut actors: Query<(&EquipmentCoordinator, &ActorView, &mut HudSnapshot)>,
    items: Query<(&EquipmentItem, &Activation)>,
) {
    for (coordinator, view, mut hud) in actors.iter_mut() {
        let targeted_name = view
            .targeted_entity()
            .and_then(|entity| items.get(entity).ok())
            .filter(|(item, _)| item.is_grounded())
            .map(|(item, _)| item.definition.name.clone());

        let mut next = HudSnapshot {
            targeted_name,
            ..default()
        };

        for hand in HandId::ALL {
            let Some((item, activation)) = coordinator
                .hand(hand)
                .current()
                .and_then(|entity| items.get(entity).ok())
            else {
                continue;
            };

            let weapon = activation.as_weapon();
            *next.hand_mut(hand) = HandHud {
                item_name: Some(item.definition.name.clone()),
                ammo: weapon.map(|weapon| (weapon.state.current_ammo, weapon.state.max_ammo)),
                fire_mode: weapon.map(|weapon| weapon.state.fire_mode.label()),
            };
        }

        // Без лишнего Changed<HudSnapshot> для host'а
        if *hud != next {
            *hud = next;
        }
    }
}
