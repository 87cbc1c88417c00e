//! ApparelActivation (hat) - надеть на голову
//!
//! # Lifecycle
//! ```text
//! in hand ──activate──► settling ──settle delay──► worn
//!                                                   │
//!    in hand ◄──equip key на пустой руке (poll)─────┘
//! ```
//! Пока `settling`, poll рук не работает (anti-flicker: та же клавиша
//! не должна сразу снять шапку обратно).

use bevy::prelude::*;

use crate::activation::ActivationEffect;
use crate::item_system::{euler_degrees, ApparelTemplate};

#[derive(Clone, Debug)]
pub struct ApparelActivation {
    pub template: ApparelTemplate,
    worn: bool,
    settling: bool,
}

impl ApparelActivation {
    pub fn new(template: &ApparelTemplate) -> Self {
        Self {
            template: template.clone(),
            worn: false,
            settling: false,
        }
    }

    pub fn is_worn(&self) -> bool {
        self.worn
    }

    pub fn is_settling(&self) -> bool {
        self.settling
    }

    /// На голове (worn или ещё settling)
    pub fn is_on_head(&self) -> bool {
        self.worn || self.settling
    }

    pub fn activate(&self) -> ActivationEffect {
        if self.is_on_head() {
            return ActivationEffect::None;
        }
        ActivationEffect::WearOnHead
    }

    /// Local transform относительно head anchor'а
    pub fn head_transform(&self) -> Transform {
        Transform {
            translation: self.template.head_offset,
            rotation: euler_degrees(self.template.head_rotation),
            scale: self.template.head_scale,
        }
    }

    pub(crate) fn begin_wear(&mut self) {
        self.settling = true;
        self.worn = false;
    }

    /// Settle delay истёк. false если шапку успели снять.
    pub(crate) fn settle(&mut self) -> bool {
        if !self.settling {
            return false;
        }
        self.settling = false;
        self.worn = true;
        true
    }

    pub(crate) fn take_off(&mut self) {
        self.worn = false;
        self.settling = false;
    }
}
