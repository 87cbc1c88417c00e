//! Headless симуляция GRIPLOCK
//!
//! Скриптованный прогон: актёр подбирает винтовку и магазин, перезаряжается,
//! стреляет, бросает гранату, надевает и снимает шапку.

use bevy::prelude::*;
use griplock_simulation::*;

fn main() {
    let seed = 42;
    println!("Starting GRIPLOCK headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    let config = app.world().resource::<EquipmentConfig>().clone();
    let actor = {
        let world = app.world_mut();
        let actor = spawn_equipment_actor(&mut world.commands(), &config, Vec3::ZERO, ActorAnchors::default());
        world.flush();
        actor
    };

    let items: Vec<(&str, Vec3)> = vec![
        ("assault_rifle", Vec3::new(0.0, 0.8, -1.0)),
        ("rifle_magazine", Vec3::new(0.4, 0.8, -1.0)),
        ("frag_grenade", Vec3::new(-0.4, 0.8, -1.0)),
        ("cowboy_hat", Vec3::new(0.8, 0.8, -0.8)),
        ("flashlight", Vec3::new(-0.8, 0.8, -0.8)),
    ];
    let spawned: Vec<Option<Entity>> = items
        .iter()
        .map(|(id, position)| spawn_item(&mut app, id, *position))
        .collect();
    let &[Some(rifle), Some(magazine), Some(grenade), Some(hat), Some(_flashlight)] = spawned.as_slice() else {
        log_error("Demo items failed to spawn");
        return;
    };

    // Первый тик: propagation transforms
    app.update();

    let left = config.bindings_for(HandId::Left).clone();
    let right = config.bindings_for(HandId::Right).clone();

    // 1. Винтовка в левую, магазин в правую
    look_at(&mut app, actor, rifle);
    tap(&mut app, actor, left.equip_drop);
    look_at(&mut app, actor, magazine);
    tap(&mut app, actor, right.equip_drop);
    print_hud(&app, actor, "picked up rifle + magazine");

    // 2. Стрельба (5 выстрелов), затем reload магазином
    clear_view(&mut app, actor);
    app.world_mut().send_event(CycleFireModeIntent { actor, hand: HandId::Left });
    app.update();
    for _ in 0..5 {
        tap(&mut app, actor, left.activation);
    }
    print_hud(&app, actor, "after 5 shots");

    tap(&mut app, actor, right.activation);
    print_hud(&app, actor, "after reload");

    // 3. Граната в правую руку и бросок
    look_at(&mut app, actor, grenade);
    tap(&mut app, actor, right.equip_drop);
    clear_view(&mut app, actor);
    tap(&mut app, actor, right.activation);
    tap(&mut app, actor, right.activation); // debounce: второй бросок игнорируется
    run_ticks(&mut app, config.ticks_for(0.5));
    print_hud(&app, actor, "after throw");

    // 4. Шапка: надеть, дождаться settle, снять в пустую руку
    look_at(&mut app, actor, hat);
    tap(&mut app, actor, right.equip_drop);
    clear_view(&mut app, actor);
    tap(&mut app, actor, right.activation);
    run_ticks(&mut app, config.ticks_for(config.apparel_settle_secs) + 1);
    tap(&mut app, actor, right.equip_drop);
    print_hud(&app, actor, "hat back in hand");

    // 5. Дальше мир просто тикает
    for tick in 0..300 {
        app.update();

        if tick % 100 == 0 {
            let entity_count = app.world().entities().len();
            println!("Tick {}: {} entities", tick, entity_count);
        }
    }

    println!("Simulation complete!");
}

fn spawn_item(app: &mut App, id: &str, position: Vec3) -> Option<Entity> {
    let definition = app.world().resource::<ItemDefinitions>().get(&id.into())?;
    let world = app.world_mut();
    let result = spawn_equipment_item(&mut world.commands(), definition, position);
    world.flush();

    match result {
        Ok(entity) => Some(entity),
        Err(error) => {
            log_warning(&format!("Item '{}' not spawned: {}", id, error));
            None
        }
    }
}

/// Host raycast: луч из глаз попадает в предмет
fn look_at(app: &mut App, actor: Entity, item: Entity) {
    let world = app.world_mut();
    let Some(position) = world.get::<Transform>(item).map(|transform| transform.translation) else {
        return;
    };
    if let Some(mut view) = world.get_mut::<ActorView>(actor) {
        let distance = view.origin.distance(position);
        view.forward = (position - view.origin).normalize_or(Vec3::NEG_Z);
        view.hit = Some(ViewHit {
            position,
            entity: Some(item),
            distance,
        });
    }
}

fn clear_view(app: &mut App, actor: Entity) {
    if let Some(mut view) = app.world_mut().get_mut::<ActorView>(actor) {
        view.forward = Vec3::NEG_Z;
        view.hit = None;
    }
}

/// Нажать и отпустить binding за один тик
fn tap(app: &mut App, actor: Entity, binding: Option<InputBinding>) {
    let Some(binding) = binding else {
        return;
    };
    if let Some(mut input) = app.world_mut().get_mut::<HandInput>(actor) {
        input.press(binding);
    }
    app.update();
    if let Some(mut input) = app.world_mut().get_mut::<HandInput>(actor) {
        input.release(binding);
    }
}

fn run_ticks(app: &mut App, ticks: u64) {
    for _ in 0..ticks {
        app.update();
    }
}

fn print_hud(app: &App, actor: Entity, label: &str) {
    let Some(hud) = app.world().get::<HudSnapshot>(actor) else {
        return;
    };
    let tick = app.world().resource::<SimulationClock>().tick();
    println!(
        "[tick {}] {}: left={:?} {:?} {:?} | right={:?} {:?} {:?}",
        tick,
        label,
        hud.left.item_name,
        hud.left.ammo,
        hud.left.fire_mode,
        hud.right.item_name,
        hud.right.ammo,
        hud.right.fire_mode,
    );
}
