//! ThrowableActivation - отложенный бросок (граната)
//!
//! Debounce: пока бросок pending, повторный activate игнорируется
//! (не ставится в очередь).

use crate::activation::{ActivationContext, ActivationEffect};
use crate::equipment::EquipmentError;
use crate::item_system::ThrowableTemplate;

#[derive(Clone, Debug)]
pub struct ThrowableActivation {
    pub template: ThrowableTemplate,
    pending: bool,
}

impl ThrowableActivation {
    pub fn new(template: &ThrowableTemplate) -> Self {
        Self {
            template: template.clone(),
            pending: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn activate(&mut self, ctx: &ActivationContext) -> Result<ActivationEffect, EquipmentError> {
        if self.pending {
            return Err(EquipmentError::ThrowPending {
                item: ctx.item.clone(),
            });
        }

        self.pending = true;
        Ok(ActivationEffect::ScheduleThrow {
            delay_secs: self.template.throw_delay_secs,
        })
    }

    /// Бросок выполнен или отменён
    pub(crate) fn finish(&mut self) {
        self.pending = false;
    }
}
