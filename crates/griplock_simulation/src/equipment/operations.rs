//! Equipment operations - единственное место, где меняется binding Hand ↔ Item
//!
//! # Правила
//!
//! - Каждая операция сначала проверяет preconditions, потом мутирует.
//!   Ошибка = ничего не изменилось.
//! - Ошибки не пересекают границу тика: caller делает `report` (log +
//!   `EquipmentDiagnostic`) и продолжает с остальными предметами.
//! - Физику предмета меняет только `ItemPhysics` этого предмета.
//!
//! `EquipmentOps` - SystemParam, его используют input/intent/deferred системы.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::activation::{Activation, ActivationContext, ActivationEffect, AmmoLoad, Shot};
use crate::components::{
    ActorView, EquipmentCoordinator, EquipmentItem, HandId, HandInput, ItemState, LightEmitter,
};
use crate::config::EquipmentConfig;
use crate::equipment::{
    ApparelWorn, DeferredAction, DeferredActions, EquipmentDiagnostic, EquipmentError, ItemDropped,
    ItemEquipped, ItemThrown, ProjectileFired, SimulationClock, WeaponReloaded,
};
use crate::item_system::euler_degrees;
use crate::logger::{log, log_with_level};
use crate::physics::{drop_impulse, throw_impulse, ItemPhysics};
use crate::projectile::spawn_projectile;
use crate::DeterministicRng;

/// Output events equipment подсистемы
#[derive(SystemParam)]
pub struct EquipmentEvents<'w> {
    pub equipped: EventWriter<'w, ItemEquipped>,
    pub dropped: EventWriter<'w, ItemDropped>,
    pub thrown: EventWriter<'w, ItemThrown>,
    pub apparel_worn: EventWriter<'w, ApparelWorn>,
    pub fired: EventWriter<'w, ProjectileFired>,
    pub reloaded: EventWriter<'w, WeaponReloaded>,
    pub diagnostics: EventWriter<'w, EquipmentDiagnostic>,
}

type ItemData = (
    &'static mut EquipmentItem,
    &'static mut ItemPhysics,
    &'static mut Activation,
    &'static mut Transform,
    &'static GlobalTransform,
);

#[derive(SystemParam)]
pub struct EquipmentOps<'w, 's> {
    commands: Commands<'w, 's>,
    clock: Res<'w, SimulationClock>,
    config: Res<'w, EquipmentConfig>,
    deferred: ResMut<'w, DeferredActions>,
    rng: ResMut<'w, DeterministicRng>,
    actors: Query<'w, 's, (&'static mut EquipmentCoordinator, &'static ActorView)>,
    items: Query<'w, 's, ItemData>,
    item_entities: Query<'w, 's, Entity, With<EquipmentItem>>,
    anchors: Query<'w, 's, &'static GlobalTransform, Without<EquipmentItem>>,
    lights: Query<'w, 's, &'static mut LightEmitter>,
    events: EquipmentEvents<'w>,
}

impl EquipmentOps<'_, '_> {
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Downgrade ошибки: log + diagnostic event
    pub fn report(&mut self, actor: Option<Entity>, item: Option<Entity>, error: EquipmentError) {
        log_with_level(error.log_level(), &format!("Equipment: {}", error));
        self.events.diagnostics.write(EquipmentDiagnostic { actor, item, error });
    }

    fn report_result(&mut self, actor: Option<Entity>, item: Option<Entity>, result: Result<(), EquipmentError>) {
        if let Err(error) = result {
            self.report(actor, item, error);
        }
    }

    // ========================================================================
    // Eligibility
    // ========================================================================

    /// Grounded + ground contact + в радиусе equip_range + под прицелом
    pub fn check_equip_eligibility(&self, actor: Entity, item: Entity) -> Result<(), EquipmentError> {
        let Ok((_, view)) = self.actors.get(actor) else {
            return Err(EquipmentError::UnknownActor(actor));
        };
        let Ok((equipment, physics, _, transform, _)) = self.items.get(item) else {
            return Err(EquipmentError::UnknownItem(item));
        };

        let definition = &equipment.definition;
        if !equipment.is_grounded() || !physics.has_ground_contact() {
            return Err(EquipmentError::NotGrounded {
                item: definition.id.clone(),
            });
        }

        // Grounded предмет без parent'а: local transform == world
        let distance = view.origin.distance(transform.translation);
        if distance > definition.equip_range {
            return Err(EquipmentError::OutOfRange {
                item: definition.id.clone(),
                distance,
                range: definition.equip_range,
            });
        }

        if !view.targets(item) {
            return Err(EquipmentError::NotTargeted {
                item: definition.id.clone(),
            });
        }

        Ok(())
    }

    // ========================================================================
    // Equip / Drop
    // ========================================================================

    /// Equip grounded предмета в руку (targeting/range не проверяются)
    pub fn equip(&mut self, actor: Entity, item: Entity, hand: HandId) -> Result<(), EquipmentError> {
        let Ok((equipment, ..)) = self.items.get(item) else {
            return Err(EquipmentError::UnknownItem(item));
        };
        if !equipment.is_grounded() {
            return Err(EquipmentError::NotGrounded {
                item: equipment.definition.id.clone(),
            });
        }

        self.attach_to_hand(actor, item, hand)
    }

    /// Equip с eligibility и автоматическим выбором руки
    pub fn try_equip(&mut self, actor: Entity, item: Entity) -> Result<(), EquipmentError> {
        self.check_equip_eligibility(actor, item)?;

        let Ok((coordinator, _)) = self.actors.get(actor) else {
            return Err(EquipmentError::UnknownActor(actor));
        };
        let free = coordinator.first_free_hand();
        let swappable = coordinator.first_swappable_hand();

        match (free, swappable) {
            (Some(hand), _) => self.equip(actor, item, hand),
            (None, Some(hand)) => self.begin_swap(actor, hand, item),
            (None, None) => Err(EquipmentError::NoEligibleHand {
                item: self.item_id(item),
            }),
        }
    }

    /// Общий шаг equip: reparent, pose, kinematic lock, EnableDrop на следующий тик.
    /// Состояние предмета проверяет caller.
    fn attach_to_hand(&mut self, actor: Entity, item: Entity, hand: HandId) -> Result<(), EquipmentError> {
        let tick = self.clock.tick();

        let Ok((mut coordinator, _)) = self.actors.get_mut(actor) else {
            return Err(EquipmentError::UnknownActor(actor));
        };
        let slot = coordinator.hand(hand);
        if slot.is_busy() {
            return Err(EquipmentError::HandBusy { hand });
        }
        if !slot.is_empty() {
            return Err(EquipmentError::HandOccupied { hand });
        }
        let Some(anchor) = slot.anchor.filter(|anchor| self.anchors.contains(*anchor)) else {
            return Err(EquipmentError::MissingHandAnchor { hand });
        };

        let Ok((mut equipment, mut physics, _, mut transform, _)) = self.items.get_mut(item) else {
            return Err(EquipmentError::UnknownItem(item));
        };

        coordinator.hand_mut(hand).equip(item, tick);
        equipment.attach(hand, actor);
        physics.lock();
        *transform = equipment.equipped_transform(hand);

        self.commands.entity(item).insert(ChildOf(anchor));
        self.deferred.schedule(tick + 1, DeferredAction::EnableDrop { item });
        self.events.equipped.write(ItemEquipped { actor, item, hand });

        log(&format!(
            "✅ Equipped {} to {:?} hand (tick {})",
            equipment.definition.name, hand, tick
        ));
        Ok(())
    }

    /// Drop предмета из руки
    ///
    /// Требует `Held` + `can_drop`. Восстанавливает unequipped pose,
    /// снимает kinematic lock, опционально применяет drop impulse.
    pub fn drop_item(
        &mut self,
        actor: Entity,
        item: Entity,
        hand: HandId,
        apply_forces: bool,
    ) -> Result<(), EquipmentError> {
        let tick = self.clock.tick();

        let Ok((mut coordinator, view)) = self.actors.get_mut(actor) else {
            return Err(EquipmentError::UnknownActor(actor));
        };
        let Ok((mut equipment, mut physics, mut activation, mut transform, global)) = self.items.get_mut(item)
        else {
            return Err(EquipmentError::UnknownItem(item));
        };

        if coordinator.hand(hand).current() != Some(item) {
            return Err(EquipmentError::NotHeld {
                item: equipment.definition.id.clone(),
            });
        }
        equipment.check_drop()?;

        let world_position = global.translation();

        coordinator.hand_mut(hand).release(tick);
        equipment.detach();
        physics.unlock();
        *transform = equipment.unequipped_transform(world_position);

        if apply_forces {
            let impulse = drop_impulse(
                &equipment.definition,
                view.velocity,
                view.forward,
                view.up,
                &mut self.rng.rng,
                self.config.max_random_torque,
            );
            physics.apply_impulse(impulse);
        }

        // Незавершённый бросок отменяется вместе с drop
        if let Some(throwable) = activation.as_throwable_mut() {
            throwable.finish();
        }
        self.deferred.cancel_for(item);

        self.commands.entity(item).remove::<ChildOf>();
        self.events.dropped.write(ItemDropped {
            actor,
            item,
            hand,
            applied_forces: apply_forces,
        });

        log(&format!(
            "Dropped {} from {:?} hand (forces: {})",
            equipment.definition.name, hand, apply_forces
        ));
        Ok(())
    }

    // ========================================================================
    // Swap (Drop + deferred Equip)
    // ========================================================================

    /// Первый шаг swap'а: drop текущего (без impulse), резерв нового,
    /// CompleteSwap через `swap_delay`. Рука busy до завершения.
    pub fn begin_swap(&mut self, actor: Entity, hand: HandId, new_item: Entity) -> Result<(), EquipmentError> {
        let tick = self.clock.tick();

        let Ok((equipment, ..)) = self.items.get(new_item) else {
            return Err(EquipmentError::UnknownItem(new_item));
        };
        if !equipment.is_grounded() {
            return Err(EquipmentError::NotGrounded {
                item: equipment.definition.id.clone(),
            });
        }

        let old_item = {
            let Ok((coordinator, _)) = self.actors.get(actor) else {
                return Err(EquipmentError::UnknownActor(actor));
            };
            let slot = coordinator.hand(hand);
            if slot.is_busy() {
                return Err(EquipmentError::HandBusy { hand });
            }
            if slot.anchor.is_none() {
                return Err(EquipmentError::MissingHandAnchor { hand });
            }
            let Some(old_item) = slot.current() else {
                return Err(EquipmentError::EmptyHand { hand });
            };
            old_item
        };

        self.drop_item(actor, old_item, hand, false)?;

        let Ok((mut coordinator, _)) = self.actors.get_mut(actor) else {
            return Err(EquipmentError::UnknownActor(actor));
        };
        let Ok((mut equipment, ..)) = self.items.get_mut(new_item) else {
            return Err(EquipmentError::UnknownItem(new_item));
        };

        equipment.reserve(actor);
        coordinator.hand_mut(hand).reserve_swap(new_item);

        let fire_at = tick + self.config.ticks_for(self.config.swap_delay_secs);
        self.deferred.schedule(
            fire_at,
            DeferredAction::CompleteSwap {
                actor,
                hand,
                item: new_item,
            },
        );

        log(&format!(
            "Swap started in {:?} hand: {} arrives at tick {}",
            hand, equipment.definition.name, fire_at
        ));
        Ok(())
    }

    /// Второй шаг swap'а. Отменяется молча если актёр/предмет исчезли.
    /// Ошибка equip'а возвращает предмет в Grounded (никогда не застревает).
    pub fn complete_swap(&mut self, actor: Entity, hand: HandId, item: Entity) -> Result<(), EquipmentError> {
        let Ok((mut coordinator, _)) = self.actors.get_mut(actor) else {
            return Ok(());
        };
        if coordinator.hand(hand).pending_swap() != Some(item) {
            return Ok(());
        }
        coordinator.hand_mut(hand).take_swap();

        let reserved = self
            .items
            .get(item)
            .is_ok_and(|(equipment, ..)| {
                equipment.state() == ItemState::Transitioning && equipment.holder() == Some(actor)
            });
        if !reserved {
            return Ok(());
        }

        if let Err(error) = self.attach_to_hand(actor, item, hand) {
            if let Ok((mut equipment, ..)) = self.items.get_mut(item) {
                equipment.detach();
            }
            return Err(error);
        }

        Ok(())
    }

    // ========================================================================
    // Activate
    // ========================================================================

    /// Activate() предмета. Не в руке → `NotHeld` (state не меняется).
    pub fn activate(&mut self, item: Entity) -> Result<(), EquipmentError> {
        let (id, hand, actor) = {
            let Ok((equipment, ..)) = self.items.get(item) else {
                return Err(EquipmentError::UnknownItem(item));
            };
            let id = equipment.definition.id.clone();
            if !equipment.is_held() {
                return Err(EquipmentError::NotHeld { item: id });
            }
            let (Some(hand), Some(actor)) = (equipment.held_by(), equipment.holder()) else {
                return Err(EquipmentError::InvariantViolation(format!(
                    "held item '{}' has no hand binding",
                    id
                )));
            };
            (id, hand, actor)
        };

        let opposite_item = {
            let Ok((coordinator, _)) = self.actors.get(actor) else {
                return Err(EquipmentError::UnknownActor(actor));
            };
            coordinator.hand(hand.opposite()).current()
        };
        let opposite_kind = opposite_item
            .and_then(|other| self.items.get(other).ok())
            .map(|(equipment, ..)| equipment.definition.kind);

        let effect = {
            let Ok((_, _, mut activation, _, _)) = self.items.get_mut(item) else {
                return Err(EquipmentError::UnknownItem(item));
            };
            let ctx = ActivationContext {
                item: &id,
                hand,
                opposite_kind,
            };
            activation.activate(&ctx)?
        };

        match effect {
            ActivationEffect::None => {
                log(&format!("Activate {}: nothing to do", id));
                Ok(())
            }
            ActivationEffect::FireProjectile(shot) => self.fire_projectile(actor, item, shot),
            ActivationEffect::ReloadOppositeHand(load) => self.reload_opposite(actor, item, hand, opposite_item, load),
            ActivationEffect::ScheduleThrow { delay_secs } => {
                let fire_at = self.clock.tick() + self.config.ticks_for(delay_secs);
                self.deferred.schedule(fire_at, DeferredAction::ExecuteThrow { item });
                Ok(())
            }
            ActivationEffect::ToggleLight => {
                let Ok(mut light) = self.lights.get_mut(item) else {
                    return Err(EquipmentError::MissingLight { item: id });
                };
                light.enabled = !light.enabled;
                Ok(())
            }
            ActivationEffect::WearOnHead => self.wear_on_head(actor, item, hand),
        }
    }

    fn fire_projectile(&mut self, actor: Entity, weapon: Entity, shot: Shot) -> Result<(), EquipmentError> {
        let tick = self.clock.tick();

        let Ok((_, view)) = self.actors.get(actor) else {
            return Err(EquipmentError::UnknownActor(actor));
        };
        let Ok((_, _, mut activation, _, global)) = self.items.get_mut(weapon) else {
            return Err(EquipmentError::UnknownItem(weapon));
        };

        let origin = global.transform_point(shot.firepoint);
        let target = view.aim_point(shot.max_hit_distance);
        let direction = (target - origin).normalize_or(view.forward);
        let rotation = global.rotation() * euler_degrees(shot.projectile.start_rotation);

        let ammo_left = match activation.as_weapon_mut() {
            Some(state) => {
                state.record_shot(tick);
                state.current_ammo()
            }
            None => 0,
        };

        let expires_at = tick + self.config.ticks_for(shot.projectile.lifetime_secs);
        let projectile = spawn_projectile(
            &mut self.commands,
            weapon,
            &shot.projectile,
            origin,
            rotation,
            direction,
            expires_at,
        );

        self.events.fired.write(ProjectileFired {
            weapon,
            projectile,
            origin,
            direction,
            speed: shot.projectile.speed,
            ammo_left,
        });
        Ok(())
    }

    /// Reload оружия в соседней руке, магазин одноразовый
    fn reload_opposite(
        &mut self,
        actor: Entity,
        ammunition: Entity,
        hand: HandId,
        weapon: Option<Entity>,
        load: AmmoLoad,
    ) -> Result<(), EquipmentError> {
        let missing_weapon = EquipmentError::NoWeaponInOppositeHand {
            hand: hand.opposite(),
        };
        let Some(weapon) = weapon else {
            return Err(missing_weapon);
        };

        let current_ammo = {
            let Ok((_, _, mut activation, _, _)) = self.items.get_mut(weapon) else {
                return Err(missing_weapon);
            };
            let Some(state) = activation.as_weapon_mut() else {
                return Err(missing_weapon);
            };
            state.reload(load.bullets_amount, load.projectile);
            state.current_ammo()
        };

        self.events.reloaded.write(WeaponReloaded {
            weapon,
            ammunition,
            current_ammo,
        });
        log(&format!("Reloaded weapon {:?}: {} rounds", weapon, current_ammo));

        self.despawn_item(actor, ammunition);
        Ok(())
    }

    /// Despawn предмета через coordinator: release руки (и swap резерва) +
    /// отмена deferred записей
    pub fn despawn_item(&mut self, actor: Entity, item: Entity) {
        let tick = self.clock.tick();

        if let Ok((mut coordinator, _)) = self.actors.get_mut(actor) {
            coordinator.forget_item(item, tick);
        }
        if let Ok((mut equipment, ..)) = self.items.get_mut(item) {
            equipment.detach();
        }

        self.deferred.cancel_for(item);
        self.commands.entity(item).despawn();
    }

    // ========================================================================
    // Throw
    // ========================================================================

    /// Deferred бросок. Предмет исчез или уже не в руке → отмена.
    pub fn execute_throw(&mut self, item: Entity) -> Result<(), EquipmentError> {
        let tick = self.clock.tick();

        let Ok((mut equipment, mut physics, mut activation, mut transform, global)) = self.items.get_mut(item)
        else {
            return Ok(());
        };
        let Some(throwable) = activation.as_throwable_mut() else {
            return Ok(());
        };
        let template = throwable.template.clone();
        throwable.finish();

        let (Some(hand), Some(actor)) = (equipment.held_by(), equipment.holder()) else {
            return Ok(());
        };
        let Ok((mut coordinator, view)) = self.actors.get_mut(actor) else {
            return Ok(());
        };

        let world_position = global.translation();
        let origin = coordinator
            .hand(hand)
            .anchor
            .and_then(|anchor| self.anchors.get(anchor).ok())
            .map_or(world_position, |anchor| anchor.translation());
        let target = view.aim_point(template.max_throw_distance);

        // Release без drop impulse, потом throw impulse
        coordinator.hand_mut(hand).release(tick);
        equipment.detach();
        physics.unlock();
        *transform = equipment.unequipped_transform(world_position);

        let impulse = throw_impulse(
            &template,
            origin,
            target,
            &mut self.rng.rng,
            self.config.max_random_torque,
        );
        physics.apply_impulse(impulse);

        self.deferred.cancel_for(item);
        self.commands.entity(item).remove::<ChildOf>();
        self.events.thrown.write(ItemThrown {
            actor,
            item,
            target,
            impulse: impulse.linear,
        });

        log(&format!("🎯 Thrown {} toward {:?}", equipment.definition.name, target));
        Ok(())
    }

    // ========================================================================
    // Apparel
    // ========================================================================

    fn wear_on_head(&mut self, actor: Entity, item: Entity, hand: HandId) -> Result<(), EquipmentError> {
        let tick = self.clock.tick();

        let Ok((mut coordinator, _)) = self.actors.get_mut(actor) else {
            return Err(EquipmentError::UnknownActor(actor));
        };
        let Some(head) = coordinator.head_anchor.filter(|head| self.anchors.contains(*head)) else {
            return Err(EquipmentError::MissingHeadAnchor { actor });
        };
        let Ok((mut equipment, _, mut activation, mut transform, _)) = self.items.get_mut(item) else {
            return Err(EquipmentError::UnknownItem(item));
        };
        let Some(apparel) = activation.as_apparel_mut() else {
            return Ok(());
        };

        coordinator.hand_mut(hand).release(tick);
        equipment.reserve(actor);
        apparel.begin_wear();
        *transform = apparel.head_transform();

        self.commands.entity(item).insert(ChildOf(head));
        let settle_at = tick + self.config.ticks_for(self.config.apparel_settle_secs);
        self.deferred.schedule(settle_at, DeferredAction::SettleApparel { item });

        log(&format!("{} goes on the head", equipment.definition.name));
        Ok(())
    }

    fn settle_apparel(&mut self, item: Entity) {
        let Ok((equipment, _, mut activation, _, _)) = self.items.get_mut(item) else {
            return;
        };
        let settled = activation.as_apparel_mut().is_some_and(|apparel| apparel.settle());

        if let (true, Some(actor)) = (settled, equipment.holder()) {
            self.events.apparel_worn.write(ApparelWorn { actor, item });
        }
    }

    /// Снять шапку с головы в пустую руку
    pub fn equip_from_head(&mut self, actor: Entity, item: Entity, hand: HandId) -> Result<(), EquipmentError> {
        {
            let Ok((equipment, _, activation, _, _)) = self.items.get(item) else {
                return Err(EquipmentError::UnknownItem(item));
            };
            let worn = activation.as_apparel().is_some_and(|apparel| apparel.is_worn());
            if !worn || equipment.holder() != Some(actor) {
                return Err(EquipmentError::NotGrounded {
                    item: equipment.definition.id.clone(),
                });
            }
        }

        self.attach_to_hand(actor, item, hand)?;

        if let Ok((_, _, mut activation, _, _)) = self.items.get_mut(item) {
            if let Some(apparel) = activation.as_apparel_mut() {
                apparel.take_off();
            }
        }
        Ok(())
    }

    /// Шапки, которые сейчас worn: (item, actor)
    pub fn worn_apparel(&self) -> Vec<(Entity, Entity)> {
        self.item_entities
            .iter()
            .filter_map(|entity| {
                let (equipment, _, activation, _, _) = self.items.get(entity).ok()?;
                let worn = activation.as_apparel().is_some_and(|apparel| apparel.is_worn());
                worn.then_some((entity, equipment.holder()?))
            })
            .collect()
    }

    /// Poll рук для worn шапки: equip key на пустой, свободной руке
    /// (left → right). Рука, уже сделавшая transition на этом тике, пропускается.
    pub fn poll_apparel_input(&mut self, actor: Entity, item: Entity, input: &HandInput) {
        let tick = self.clock.tick();

        let chosen = {
            let Ok((coordinator, _)) = self.actors.get(actor) else {
                return;
            };
            HandId::ALL.into_iter().find(|id| {
                let slot = coordinator.hand(*id);
                slot.is_empty()
                    && !slot.is_busy()
                    && !slot.transitioned_at(tick)
                    && input.is_key_down(slot.bindings.equip_drop)
            })
        };

        if let Some(hand) = chosen {
            let result = self.equip_from_head(actor, item, hand);
            self.report_result(Some(actor), Some(item), result);
        }
    }

    // ========================================================================
    // Fire mode
    // ========================================================================

    pub fn cycle_fire_mode(&mut self, actor: Entity, hand: HandId) -> Result<(), EquipmentError> {
        let Ok((coordinator, _)) = self.actors.get(actor) else {
            return Err(EquipmentError::UnknownActor(actor));
        };
        let Some(item) = coordinator.hand(hand).current() else {
            return Err(EquipmentError::EmptyHand { hand });
        };
        let Ok((_, _, mut activation, _, _)) = self.items.get_mut(item) else {
            return Err(EquipmentError::UnknownItem(item));
        };

        // Не оружие → клавиша ничего не делает
        if let Some(weapon) = activation.as_weapon_mut() {
            let mode = weapon.cycle_fire_mode();
            log(&format!("Fire mode ({:?} hand): {}", hand, mode.label()));
        }
        Ok(())
    }

    /// Зажатая кнопка у FullAuto оружия и интервал выдержан
    fn wants_auto_fire(&self, item: Entity) -> bool {
        let Ok((_, _, activation, _, _)) = self.items.get(item) else {
            return false;
        };
        activation.as_weapon().is_some_and(|weapon| {
            let interval = self.config.ticks_for(weapon.fire_interval_secs);
            weapon.ready_for_auto_fire(self.clock.tick(), interval)
        })
    }

    // ========================================================================
    // Deferred / Input
    // ========================================================================

    pub fn take_due_actions(&mut self) -> Vec<DeferredAction> {
        let tick = self.clock.tick();
        self.deferred.take_due(tick)
    }

    pub fn run_deferred(&mut self, action: DeferredAction) {
        let item = action.item();
        let result = match action {
            DeferredAction::EnableDrop { item } => {
                if let Ok((mut equipment, ..)) = self.items.get_mut(item) {
                    equipment.enable_drop();
                }
                Ok(())
            }
            DeferredAction::CompleteSwap { actor, hand, item } => self.complete_swap(actor, hand, item),
            DeferredAction::ExecuteThrow { item } => self.execute_throw(item),
            DeferredAction::SettleApparel { item } => {
                self.settle_apparel(item);
                Ok(())
            }
        };
        self.report_result(None, Some(item), result);
    }

    /// Input одной руки за тик
    ///
    /// 1. equip/drop edge: eligible предмет под прицелом → equip (или swap),
    ///    иначе drop предмета в руке
    /// 2. activation edge → Activate(); у FullAuto зажатая кнопка стреляет по интервалу
    /// 3. fire mode edge → смена режима
    pub fn handle_hand_input(&mut self, actor: Entity, hand: HandId, input: &HandInput) {
        let tick = self.clock.tick();

        let (bindings, held_before, target) = {
            let Ok((coordinator, view)) = self.actors.get(actor) else {
                return;
            };
            let slot = coordinator.hand(hand);
            if slot.is_busy() {
                return;
            }
            (slot.bindings.clone(), slot.current(), view.targeted_entity())
        };

        if input.is_key_down(bindings.equip_drop) {
            let eligible = target.filter(|item| self.check_equip_eligibility(actor, *item).is_ok());

            match (eligible, held_before) {
                (Some(item), None) => {
                    let result = self.equip(actor, item, hand);
                    self.report_result(Some(actor), Some(item), result);
                }
                (Some(item), Some(_)) => {
                    let result = self.begin_swap(actor, hand, item);
                    self.report_result(Some(actor), Some(item), result);
                }
                (None, Some(item)) => {
                    // Соседняя рука только что забрала предмет под прицелом - не роняем
                    if !self.claimed_this_tick(actor, hand.opposite(), target, tick) {
                        let apply_forces = self.config.throw_on_drop;
                        let result = self.drop_item(actor, item, hand, apply_forces);
                        self.report_result(Some(actor), Some(item), result);
                    }
                }
                (None, None) => {}
            }
        }

        // Activate только для предмета, который был в руке до шага equip/drop
        let still_held = self
            .actors
            .get(actor)
            .ok()
            .and_then(|(coordinator, _)| coordinator.hand(hand).current());
        let Some(item) = held_before.filter(|item| still_held == Some(*item)) else {
            return;
        };

        if input.is_key_down(bindings.activation)
            || (input.is_key_held(bindings.activation) && self.wants_auto_fire(item))
        {
            let result = self.activate(item);
            self.report_result(Some(actor), Some(item), result);
        }

        if input.is_key_down(bindings.fire_mode) {
            let result = self.cycle_fire_mode(actor, hand);
            self.report_result(Some(actor), Some(item), result);
        }
    }

    fn claimed_this_tick(&self, actor: Entity, other_hand: HandId, target: Option<Entity>, tick: u64) -> bool {
        let Some(target) = target else {
            return false;
        };
        let Ok((coordinator, _)) = self.actors.get(actor) else {
            return false;
        };
        let other = coordinator.hand(other_hand);
        let claimed = other.current() == Some(target) || other.pending_swap() == Some(target);
        claimed && other.transitioned_at(tick)
    }

    fn item_id(&self, item: Entity) -> crate::item_system::ItemId {
        self.items
            .get(item)
            .map(|(equipment, ..)| equipment.definition.id.clone())
            .unwrap_or_else(|_| format!("{:?}", item).as_str().into())
    }
}
