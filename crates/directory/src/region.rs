use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pledge_core::error::require_non_blank;
use pledge_core::{contains_ci, DomainResult, Entity, FilialeId, Filter, RegionId};

use crate::filiale::Filiale;

/// A sub-division of a filiale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    pub filiale_id: FilialeId,
    /// Denormalized for listing and search.
    pub filiale_name: String,
    pub created_on: NaiveDate,
}

impl Region {
    pub fn new(id: RegionId, name: &str, filiale: &Filiale, created_on: NaiveDate) -> DomainResult<Self> {
        require_non_blank("name", name)?;
        Ok(Self {
            id,
            name: name.trim().to_string(),
            filiale_id: filiale.id,
            filiale_name: filiale.name.clone(),
            created_on,
        })
    }

    /// Rename and/or move the region to another filiale.
    pub fn update(&mut self, name: &str, filiale: &Filiale) -> DomainResult<()> {
        require_non_blank("name", name)?;
        self.name = name.trim().to_string();
        self.filiale_id = filiale.id;
        self.filiale_name = filiale.name.clone();
        Ok(())
    }
}

impl Entity for Region {
    type Id = RegionId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionFilter {
    /// Matches the region name or its filiale's name.
    pub search: Option<String>,
    pub filiale_id: Option<FilialeId>,
}

impl Filter<Region> for RegionFilter {
    fn matches(&self, r: &Region) -> bool {
        if let Some(search) = &self.search {
            if !contains_ci(&r.name, search) && !contains_ci(&r.filiale_name, search) {
                return false;
            }
        }
        self.filiale_id.is_none_or(|id| r.filiale_id == id)
    }
}
