use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pledge_core::error::require_non_blank;
use pledge_core::{
    contains_ci, DomainError, DomainResult, Entity, FilialeId, Filter, LivreurId, TruckId,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TruckKind {
    #[default]
    Standard,
    Refrigerated,
}

/// A distributor's delivery truck and the drivers assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truck {
    pub id: TruckId,
    pub filiale_id: FilialeId,
    pub model: String,
    /// Registration plate.
    pub matricule: String,
    /// Payload capacity in tonnes.
    pub max_ton: u32,
    pub kind: TruckKind,
    livreurs: Vec<LivreurId>,
    pub is_active: bool,
    pub created_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTruck {
    pub filiale_id: FilialeId,
    pub model: String,
    pub matricule: String,
    pub max_ton: u32,
    pub kind: TruckKind,
    pub is_active: bool,
}

impl NewTruck {
    fn validate(&self) -> DomainResult<()> {
        require_non_blank("model", &self.model)?;
        require_non_blank("matricule", &self.matricule)?;
        if self.max_ton == 0 {
            return Err(DomainError::validation("max_ton", "max ton must be greater than 0"));
        }
        Ok(())
    }
}

impl Truck {
    /// A new truck starts with no drivers assigned.
    pub fn new(id: TruckId, input: NewTruck, created_on: NaiveDate) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self {
            id,
            filiale_id: input.filiale_id,
            model: input.model.trim().to_string(),
            matricule: input.matricule.trim().to_uppercase(),
            max_ton: input.max_ton,
            kind: input.kind,
            livreurs: Vec::new(),
            is_active: input.is_active,
            created_on,
        })
    }

    /// Apply an edit. Filiale and assignments are kept.
    pub fn update(&mut self, input: NewTruck) -> DomainResult<()> {
        input.validate()?;
        self.model = input.model.trim().to_string();
        self.matricule = input.matricule.trim().to_uppercase();
        self.max_ton = input.max_ton;
        self.kind = input.kind;
        self.is_active = input.is_active;
        Ok(())
    }

    pub fn livreurs(&self) -> &[LivreurId] {
        &self.livreurs
    }

    /// A truck with no driver assigned.
    pub fn is_free(&self) -> bool {
        self.livreurs.is_empty()
    }

    /// Replace the assigned drivers. Repeated ids are kept once, in first-seen order.
    pub fn assign(&mut self, livreurs: &[LivreurId]) {
        self.livreurs.clear();
        for id in livreurs {
            if !self.livreurs.contains(id) {
                self.livreurs.push(*id);
            }
        }
    }

    /// Drop a driver from the assignment; returns whether it was assigned.
    pub fn unassign(&mut self, livreur_id: LivreurId) -> bool {
        let before = self.livreurs.len();
        self.livreurs.retain(|id| *id != livreur_id);
        self.livreurs.len() != before
    }
}

impl Entity for Truck {
    type Id = TruckId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TruckFilter {
    /// Matches the model or the matricule.
    pub search: Option<String>,
    pub filiale_id: Option<FilialeId>,
    /// Only trucks without any driver.
    pub free_only: bool,
}

impl Filter<Truck> for TruckFilter {
    fn matches(&self, t: &Truck) -> bool {
        if let Some(search) = &self.search {
            if !contains_ci(&t.model, search) && !contains_ci(&t.matricule, search) {
                return false;
            }
        }
        if self.filiale_id.is_some_and(|id| t.filiale_id != id) {
            return false;
        }
        !self.free_only || t.is_free()
    }
}
