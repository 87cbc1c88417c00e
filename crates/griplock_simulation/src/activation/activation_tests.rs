//! Tests for activation variants.

#[cfg(test)]
mod tests {
    use crate::activation::*;
    use crate::components::HandId;
    use crate::equipment::EquipmentError;
    use crate::item_system::*;

    fn ctx<'a>(item: &'a ItemId, hand: HandId, opposite_kind: Option<ItemKind>) -> ActivationContext<'a> {
        ActivationContext {
            item,
            hand,
            opposite_kind,
        }
    }

    fn rifle() -> (ItemId, Activation) {
        let definition = preset_assault_rifle();
        let activation = Activation::from_definition(&definition).unwrap();
        (definition.id, activation)
    }

    #[test]
    fn test_variant_follows_kind() {
        for definition in [
            preset_assault_rifle(),
            preset_rifle_magazine(),
            preset_frag_grenade(),
            preset_flashlight(),
            preset_cowboy_hat(),
        ] {
            let activation = Activation::from_definition(&definition).unwrap();
            assert_eq!(activation.kind(), definition.kind);
        }
    }

    #[test]
    fn test_missing_template_refused() {
        let mut definition = preset_flashlight();
        definition.tool = None;

        assert!(matches!(
            Activation::from_definition(&definition),
            Err(EquipmentError::MissingTemplate { kind: ItemKind::Tool, .. })
        ));
    }

    #[test]
    fn test_five_shots_consume_five_rounds() {
        let (id, mut activation) = rifle();

        for _ in 0..5 {
            let effect = activation.activate(&ctx(&id, HandId::Right, None)).unwrap();
            assert!(matches!(effect, ActivationEffect::FireProjectile(_)));
        }

        assert_eq!(activation.as_weapon().unwrap().current_ammo(), 25);
    }

    #[test]
    fn test_empty_weapon_fires_nothing() {
        let (id, mut activation) = rifle();
        let weapon = activation.as_weapon_mut().unwrap();
        weapon.state.current_ammo = 0;

        let effect = activation.activate(&ctx(&id, HandId::Right, None)).unwrap();
        assert_eq!(effect, ActivationEffect::None);
        assert_eq!(activation.as_weapon().unwrap().current_ammo(), 0);
    }

    #[test]
    fn test_missing_firepoint_keeps_ammo() {
        let mut definition = preset_pistol();
        if let Some(weapon) = definition.weapon.as_mut() {
            weapon.firepoint = None;
        }
        let mut activation = Activation::from_definition(&definition).unwrap();

        let result = activation.activate(&ctx(&definition.id, HandId::Left, None));
        assert_eq!(
            result,
            Err(EquipmentError::MissingFirepoint { item: "pistol".into() })
        );
        assert_eq!(activation.as_weapon().unwrap().current_ammo(), 12);
    }

    #[test]
    fn test_reload_clamps_and_swaps_projectile() {
        let (_, mut activation) = rifle();
        let weapon = activation.as_weapon_mut().unwrap();
        weapon.state.current_ammo = 3;

        let magazine = preset_rifle_magazine();
        let ammo = magazine.ammunition.unwrap();

        weapon.reload(45, ammo.projectile.clone());
        assert_eq!(weapon.current_ammo(), 30); // clamp до max_ammo
        assert_eq!(weapon.state.projectile, ammo.projectile);

        weapon.reload(10, ammo.projectile);
        assert_eq!(weapon.current_ammo(), 10);
    }

    #[test]
    fn test_fire_mode_cycle_and_auto_interval() {
        let (_, mut activation) = rifle();
        let weapon = activation.as_weapon_mut().unwrap();

        // Пресет винтовки - FullAuto
        assert!(weapon.ready_for_auto_fire(10, 6));
        weapon.record_shot(10);
        assert!(!weapon.ready_for_auto_fire(15, 6));
        assert!(weapon.ready_for_auto_fire(16, 6));

        assert_eq!(weapon.cycle_fire_mode(), FireMode::SemiAuto);
        assert!(!weapon.ready_for_auto_fire(100, 6));
        assert_eq!(FireMode::SemiAuto.label(), "SEMI");
    }

    #[test]
    fn test_ammunition_requires_weapon_opposite() {
        let definition = preset_rifle_magazine();
        let mut activation = Activation::from_definition(&definition).unwrap();

        let refused = activation.activate(&ctx(&definition.id, HandId::Left, Some(ItemKind::Tool)));
        assert_eq!(
            refused,
            Err(EquipmentError::NoWeaponInOppositeHand { hand: HandId::Right })
        );

        let effect = activation
            .activate(&ctx(&definition.id, HandId::Left, Some(ItemKind::Weapon)))
            .unwrap();
        match effect {
            ActivationEffect::ReloadOppositeHand(load) => assert_eq!(load.bullets_amount, 30),
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_throwable_debounced() {
        let definition = preset_frag_grenade();
        let mut activation = Activation::from_definition(&definition).unwrap();
        let context = ctx(&definition.id, HandId::Right, None);

        assert_eq!(
            activation.activate(&context),
            Ok(ActivationEffect::ScheduleThrow { delay_secs: 0.3 })
        );
        assert!(matches!(&activation, Activation::Throwable(throwable) if throwable.is_pending()));
        assert!(matches!(
            activation.activate(&context),
            Err(EquipmentError::ThrowPending { .. })
        ));

        activation.as_throwable_mut().unwrap().finish();
        assert!(activation.activate(&context).is_ok());
    }

    #[test]
    fn test_tool_without_light() {
        let mut definition = preset_flashlight();
        definition.tool = Some(ToolTemplate { light: None });
        let mut activation = Activation::from_definition(&definition).unwrap();

        assert!(matches!(
            activation.activate(&ctx(&definition.id, HandId::Left, None)),
            Err(EquipmentError::MissingLight { .. })
        ));

        let mut with_light = Activation::from_definition(&preset_flashlight()).unwrap();
        assert_eq!(
            with_light.activate(&ctx(&definition.id, HandId::Left, None)),
            Ok(ActivationEffect::ToggleLight)
        );
    }

    #[test]
    fn test_apparel_settle_cycle() {
        let definition = preset_cowboy_hat();
        let mut activation = Activation::from_definition(&definition).unwrap();
        let context = ctx(&definition.id, HandId::Left, None);

        assert_eq!(activation.activate(&context), Ok(ActivationEffect::WearOnHead));

        let apparel = activation.as_apparel_mut().unwrap();
        apparel.begin_wear();
        assert!(apparel.is_settling());
        assert!(!apparel.is_worn());

        // Уже на голове → no-op
        assert_eq!(activation.activate(&context), Ok(ActivationEffect::None));

        let apparel = activation.as_apparel_mut().unwrap();
        assert!(apparel.settle());
        assert!(apparel.is_worn());

        apparel.take_off();
        assert!(!apparel.settle()); // settle после снятия игнорируется
        assert!(!apparel.is_on_head());
    }
}
