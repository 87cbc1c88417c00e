//! ToolActivation (flashlight) - toggle света
//!
//! Сам флаг живёт в `LightEmitter` на entity предмета.
//! Auto-shutoff (свет гаснет когда предмет не в руке) - `systems::tool_auto_shutoff`.

use crate::activation::{ActivationContext, ActivationEffect};
use crate::equipment::EquipmentError;
use crate::item_system::ToolTemplate;

#[derive(Clone, Debug)]
pub struct ToolActivation {
    pub has_light: bool,
}

impl ToolActivation {
    pub fn new(template: &ToolTemplate) -> Self {
        Self {
            has_light: template.light.is_some(),
        }
    }

    pub fn activate(&self, ctx: &ActivationContext) -> Result<ActivationEffect, EquipmentError> {
        if !self.has_light {
            return Err(EquipmentError::MissingLight {
                item: ctx.item.clone(),
            });
        }
        Ok(ActivationEffect::ToggleLight)
    }
}
