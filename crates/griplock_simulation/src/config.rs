//! Конфигурация equipment подсистемы
//!
//! - `EquipmentConfig` - immutable resource, передаётся явно через `EquipmentPlugin`
//! - `InputBinding` - host-agnostic binding ("Mouse0", "E", "Space")
//! - `HandBindings` - три binding'а на руку (activate / equip-drop / fire mode)

use std::fmt;
use std::str::FromStr;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::HandId;
use crate::equipment::EquipmentError;
use crate::logger::log_warning;

// ============================================================================
// InputBinding
// ============================================================================

/// Кнопка указателя
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Именованные клавиши (не-символьные)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Space,
    Tab,
    Shift,
    Control,
    Alt,
    Enter,
    Escape,
}

impl NamedKey {
    const ALL: [NamedKey; 7] = [
        NamedKey::Space,
        NamedKey::Tab,
        NamedKey::Shift,
        NamedKey::Control,
        NamedKey::Alt,
        NamedKey::Enter,
        NamedKey::Escape,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            NamedKey::Space => "Space",
            NamedKey::Tab => "Tab",
            NamedKey::Shift => "Shift",
            NamedKey::Control => "Control",
            NamedKey::Alt => "Alt",
            NamedKey::Enter => "Enter",
            NamedKey::Escape => "Escape",
        }
    }
}

/// Input binding (host переводит свои key codes в этот формат)
///
/// # Формат строки
/// - `"Mouse0"` / `"Mouse1"` / `"Mouse2"` - кнопки мыши
/// - `"E"`, `"q"`, `"4"` - символьные клавиши (регистр не важен)
/// - `"Space"`, `"Tab"`, `"Shift"`, `"Control"`, `"Alt"`, `"Enter"`, `"Escape"`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InputBinding {
    Pointer(PointerButton),
    Key(char),
    Named(NamedKey),
}

impl InputBinding {
    pub fn key(c: char) -> Self {
        Self::Key(c.to_ascii_uppercase())
    }
}

impl FromStr for InputBinding {
    type Err = EquipmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        match trimmed {
            "Mouse0" => return Ok(Self::Pointer(PointerButton::Left)),
            "Mouse1" => return Ok(Self::Pointer(PointerButton::Right)),
            "Mouse2" => return Ok(Self::Pointer(PointerButton::Middle)),
            _ => {}
        }

        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphanumeric() {
                return Ok(Self::key(c));
            }
        }

        NamedKey::ALL
            .iter()
            .find(|named| named.as_str().eq_ignore_ascii_case(trimmed))
            .map(|named| Self::Named(*named))
            .ok_or_else(|| EquipmentError::UnknownBinding(s.to_string()))
    }
}

impl TryFrom<String> for InputBinding {
    type Error = EquipmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InputBinding> for String {
    fn from(binding: InputBinding) -> Self {
        binding.to_string()
    }
}

impl fmt::Display for InputBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputBinding::Pointer(PointerButton::Left) => write!(f, "Mouse0"),
            InputBinding::Pointer(PointerButton::Right) => write!(f, "Mouse1"),
            InputBinding::Pointer(PointerButton::Middle) => write!(f, "Mouse2"),
            InputBinding::Key(c) => write!(f, "{}", c),
            InputBinding::Named(named) => write!(f, "{}", named.as_str()),
        }
    }
}

// ============================================================================
// HandBindings
// ============================================================================

/// Bindings одной руки
///
/// `None` = binding не замаплен (никогда не срабатывает).
/// Из config читается через `HandBindingNames`: нераспознанная строка
/// логируется и остаётся unmapped, остальной config сохраняется.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HandBindingNames")]
pub struct HandBindings {
    /// Activate() предмета в руке
    pub activation: Option<InputBinding>,
    /// Equip (если смотрим на предмет) или Drop
    pub equip_drop: Option<InputBinding>,
    /// Переключение fire mode у оружия
    pub fire_mode: Option<InputBinding>,
}

impl HandBindings {
    /// Дефолтная раскладка: левая рука - LMB/E/B, правая - RMB/Q/N
    pub fn default_for(hand: HandId) -> Self {
        match hand {
            HandId::Left => Self {
                activation: Some(InputBinding::Pointer(PointerButton::Left)),
                equip_drop: Some(InputBinding::key('E')),
                fire_mode: Some(InputBinding::key('B')),
            },
            HandId::Right => Self {
                activation: Some(InputBinding::Pointer(PointerButton::Right)),
                equip_drop: Some(InputBinding::key('Q')),
                fire_mode: Some(InputBinding::key('N')),
            },
        }
    }

    /// Собрать bindings из строк (`None` = unmapped)
    ///
    /// Нераспознанная строка → binding остаётся `None`, ошибка возвращается
    /// вызывающему для report (TransientInputError, state не меняется).
    pub fn from_names(
        activation: Option<&str>,
        equip_drop: Option<&str>,
        fire_mode: Option<&str>,
    ) -> (Self, Vec<EquipmentError>) {
        let mut errors = Vec::new();
        let mut parse = |name: Option<&str>| match name.map(str::parse::<InputBinding>) {
            Some(Ok(binding)) => Some(binding),
            Some(Err(err)) => {
                errors.push(err);
                None
            }
            None => None,
        };

        let bindings = Self {
            activation: parse(activation),
            equip_drop: parse(equip_drop),
            fire_mode: parse(fire_mode),
        };

        (bindings, errors)
    }
}

/// Bindings руки в сыром виде (как в RON config)
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct HandBindingNames {
    pub activation: Option<String>,
    pub equip_drop: Option<String>,
    pub fire_mode: Option<String>,
}

impl From<HandBindingNames> for HandBindings {
    fn from(names: HandBindingNames) -> Self {
        let (bindings, errors) = HandBindings::from_names(
            names.activation.as_deref(),
            names.equip_drop.as_deref(),
            names.fire_mode.as_deref(),
        );
        // Один раз при загрузке config'а
        for error in errors {
            log_warning(&format!("Config: {}, binding left unmapped", error));
        }
        bindings
    }
}

// ============================================================================
// EquipmentConfig
// ============================================================================

/// Immutable конфигурация equipment подсистемы (resource)
///
/// Системы читают только через `Res<EquipmentConfig>`.
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentConfig {
    /// Частота симуляции (тиков в секунду)
    pub tick_rate_hz: f32,
    /// Задержка между drop старого и equip нового предмета при swap
    pub swap_delay_secs: f32,
    /// Задержка перед тем как надетая шапка считается "worn" (anti-flicker)
    pub apparel_settle_secs: f32,
    /// Максимальный random torque при drop/throw
    pub max_random_torque: f32,
    /// Скорость (м/с) ниже которой брошенный предмет считается лежащим
    pub rest_speed_threshold: f32,
    /// Drop по клавише применяет throw impulse
    pub throw_on_drop: bool,
    /// Дистанция aim point когда view ray ни во что не попал
    pub aim_distance: f32,
    pub left_bindings: HandBindings,
    pub right_bindings: HandBindings,
}

impl Default for EquipmentConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            swap_delay_secs: 0.25,
            apparel_settle_secs: 0.2,
            max_random_torque: 10.0,
            rest_speed_threshold: 0.05,
            throw_on_drop: true,
            aim_distance: 50.0,
            left_bindings: HandBindings::default_for(HandId::Left),
            right_bindings: HandBindings::default_for(HandId::Right),
        }
    }
}

impl EquipmentConfig {
    /// Распарсить config из RON (пропущенные поля = default)
    pub fn from_ron_str(source: &str) -> Result<Self, EquipmentError> {
        let config: Self =
            ron::from_str(source).map_err(|e| EquipmentError::ConfigParse(e.to_string()))?;

        if !(config.tick_rate_hz > 0.0) {
            return Err(EquipmentError::ConfigParse(format!(
                "tick_rate_hz must be positive (got {})",
                config.tick_rate_hz
            )));
        }

        Ok(config)
    }

    /// Длительность одного тика (секунды)
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }

    /// Секунды → тики (округление вверх, минимум 1 тик)
    pub fn ticks_for(&self, secs: f32) -> u64 {
        // epsilon гасит float шум (0.2 * 60 = 12.0000002)
        let ticks = (secs.max(0.0) * self.tick_rate_hz - 1e-3).ceil();
        (ticks as u64).max(1)
    }

    pub fn bindings_for(&self, hand: HandId) -> &HandBindings {
        match hand {
            HandId::Left => &self.left_bindings,
            HandId::Right => &self.right_bindings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bindings() {
        assert_eq!(
            "Mouse0".parse::<InputBinding>().unwrap(),
            InputBinding::Pointer(PointerButton::Left)
        );
        assert_eq!("e".parse::<InputBinding>().unwrap(), InputBinding::Key('E'));
        assert_eq!(
            "space".parse::<InputBinding>().unwrap(),
            InputBinding::Named(NamedKey::Space)
        );
        assert!("Mouse7".parse::<InputBinding>().is_err());
        assert!("".parse::<InputBinding>().is_err());
    }

    #[test]
    fn test_binding_display_roundtrip() {
        let binding = InputBinding::Pointer(PointerButton::Right);
        assert_eq!(binding.to_string(), "Mouse1");
        assert_eq!(binding.to_string().parse::<InputBinding>().unwrap(), binding);
    }

    #[test]
    fn test_from_names_keeps_unknown_unmapped() {
        let (bindings, errors) = HandBindings::from_names(Some("Mouse0"), Some("Hyper"), None);

        assert_eq!(bindings.activation, Some(InputBinding::Pointer(PointerButton::Left)));
        assert_eq!(bindings.equip_drop, None);
        assert_eq!(bindings.fire_mode, None);
        assert_eq!(errors, vec![EquipmentError::UnknownBinding("Hyper".into())]);
    }

    #[test]
    fn test_ticks_for() {
        let config = EquipmentConfig::default();
        assert_eq!(config.ticks_for(0.25), 15);
        assert_eq!(config.ticks_for(0.2), 12);
        assert_eq!(config.ticks_for(0.0), 1); // минимум 1 тик
        assert_eq!(config.ticks_for(0.001), 1);
    }

    #[test]
    fn test_config_from_ron() {
        let config = EquipmentConfig::from_ron_str(
            r#"(
                swap_delay_secs: 0.5,
                throw_on_drop: false,
                left_bindings: (
                    activation: Some("Mouse0"),
                    equip_drop: Some("F"),
                    fire_mode: None,
                ),
            )"#,
        )
        .unwrap();

        assert_eq!(config.swap_delay_secs, 0.5);
        assert!(!config.throw_on_drop);
        assert_eq!(config.left_bindings.equip_drop, Some(InputBinding::Key('F')));
        assert_eq!(config.left_bindings.fire_mode, None);
        // Не указанные поля - default
        assert_eq!(config.tick_rate_hz, 60.0);
        assert_eq!(config.right_bindings, HandBindings::default_for(HandId::Right));
    }

    #[test]
    fn test_config_keeps_unknown_binding_unmapped() {
        let config = EquipmentConfig::from_ron_str(
            r#"(
                swap_delay_secs: 0.5,
                left_bindings: (activation: Some("Mouse9"), equip_drop: Some("F"), fire_mode: None),
            )"#,
        )
        .unwrap();

        assert_eq!(config.left_bindings.activation, None);
        assert_eq!(config.left_bindings.equip_drop, Some(InputBinding::Key('F')));
        assert_eq!(config.swap_delay_secs, 0.5);
        assert_eq!(config.right_bindings, HandBindings::default_for(HandId::Right));
    }

    #[test]
    fn test_config_rejects_zero_tick_rate() {
        let result = EquipmentConfig::from_ron_str("(tick_rate_hz: 0.0)");
        assert!(result.is_err());
    }
}
