//! GRIPLOCK Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: подсистема взаимодействия с предметами
//! (equip / drop / swap / activate) для двух рук актёра.
//!
//! Граница с host'ом (движок, рендер, камера, raw input):
//! - Host пишет `ActorView` (viewpoint, raycast, скорость) и `HandInput`
//! - Host владеет Rapier step'ом, симуляция пишет только Rapier компоненты
//! - UI читает `HudSnapshot` и output events

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod activation;
pub mod components;
pub mod config;
pub mod equipment;
pub mod item_system;
pub mod logger;
pub mod physics;
pub mod projectile;

// Re-export базовых типов для удобства
pub use activation::{Activation, ActivationEffect, FireMode};
pub use components::*;
pub use config::{EquipmentConfig, HandBindings, InputBinding, NamedKey, PointerButton};
pub use equipment::*;
pub use item_system::{ItemDefinition, ItemDefinitions, ItemId, ItemKind};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level, set_logger,
    set_logger_if_needed, ConsoleLogger, LogLevel, LogPrinter, MemoryLogger,
};
pub use physics::ItemPhysics;
pub use projectile::{Projectile, ProjectileLifetime};

/// Главный plugin симуляции (default config + presets)
///
/// RNG не перезаписывается: seed из `create_headless_app` сохраняется,
/// иначе `EquipmentPlugin` ставит seed 42.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EquipmentPlugin::default());
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Equipment plugin добавляет вызывающий (с нужным config).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, bevy::transform::TransformPlugin))
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
