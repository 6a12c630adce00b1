//! The Kastra entity — an orbital starbase.

use serde::{Deserialize, Serialize};

use crate::ids::KastraId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kastra {
    pub id: KastraId,
    pub commissioned_turn: u32,
    pub crippled: bool,
    pub damage: u32,
}

impl Kastra {
    pub fn new(id: KastraId, commissioned_turn: u32) -> Self {
        Self {
            id,
            commissioned_turn,
            crippled: false,
            damage: 0,
        }
    }

    /// A crippled starbase contributes zero combat strength and does not
    /// surveil (§4.7).
    pub fn combat_capable(&self) -> bool {
        !self.crippled
    }

    pub fn surveils(&self) -> bool {
        !self.crippled
    }
}
