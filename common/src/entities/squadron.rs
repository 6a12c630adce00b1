//! The Squadron entity — a tactical combat unit (flagship + escorts).

use serde::{Deserialize, Serialize};

use crate::entities::ship::Ship;
use crate::ids::{HouseId, SquadronId, SystemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SquadronType {
    Combat,
    Expansion,
    Intel,
    Fighter,
    Auxiliary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Squadron {
    pub id: SquadronId,
    pub flagship: Ship,
    pub escorts: Vec<Ship>,
    pub owner: HouseId,
    pub location: SystemId,
    pub squadron_type: SquadronType,
    pub destroyed: bool,
}

impl Squadron {
    pub fn new(
        id: SquadronId,
        flagship: Ship,
        owner: HouseId,
        location: SystemId,
        squadron_type: SquadronType,
    ) -> Self {
        Self {
            id,
            flagship,
            escorts: Vec::new(),
            owner,
            location,
            squadron_type,
            destroyed: false,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed || !self.flagship.is_alive()
    }

    pub fn escort_count(&self) -> usize {
        self.escorts.len()
    }

    /// Escorts attached plus the flagship itself.
    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        std::iter::once(&self.flagship).chain(self.escorts.iter())
    }

    pub fn ships_mut(&mut self) -> impl Iterator<Item = &mut Ship> {
        std::iter::once(&mut self.flagship).chain(self.escorts.iter_mut())
    }

    pub fn is_specialized(&self) -> bool {
        !matches!(self.squadron_type, SquadronType::Combat)
    }
}
