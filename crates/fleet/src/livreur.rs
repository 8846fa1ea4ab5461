use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pledge_core::error::require_non_blank;
use pledge_core::{contains_ci, DomainResult, Entity, FilialeId, Filter, LivreurId};

/// A delivery driver working for a distributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Livreur {
    pub id: LivreurId,
    pub filiale_id: FilialeId,
    pub fullname: String,
    /// Unique per console, stored lowercased.
    pub username: String,
    pub is_active: bool,
    pub created_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLivreur {
    pub filiale_id: FilialeId,
    pub fullname: String,
    pub username: String,
    pub is_active: bool,
}

impl Livreur {
    pub fn new(id: LivreurId, input: NewLivreur, created_on: NaiveDate) -> DomainResult<Self> {
        require_non_blank("fullname", &input.fullname)?;
        require_non_blank("username", &input.username)?;
        Ok(Self {
            id,
            filiale_id: input.filiale_id,
            fullname: input.fullname.trim().to_string(),
            username: input.username.trim().to_lowercase(),
            is_active: input.is_active,
            created_on,
        })
    }

    /// Apply an edit. The driver stays in their filiale.
    pub fn update(&mut self, input: NewLivreur) -> DomainResult<()> {
        let updated = Livreur::new(
            self.id,
            NewLivreur {
                filiale_id: self.filiale_id,
                ..input
            },
            self.created_on,
        )?;
        *self = updated;
        Ok(())
    }
}

impl Entity for Livreur {
    type Id = LivreurId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivreurFilter {
    /// Matches the full name or the username.
    pub search: Option<String>,
    pub filiale_id: Option<FilialeId>,
    pub is_active: Option<bool>,
}

impl Filter<Livreur> for LivreurFilter {
    fn matches(&self, l: &Livreur) -> bool {
        if let Some(search) = &self.search {
            if !contains_ci(&l.fullname, search) && !contains_ci(&l.username, search) {
                return false;
            }
        }
        if self.filiale_id.is_some_and(|id| l.filiale_id != id) {
            return false;
        }
        self.is_active.is_none_or(|a| l.is_active == a)
    }
}
