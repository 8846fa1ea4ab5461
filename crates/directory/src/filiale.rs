use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pledge_core::error::require_non_blank;
use pledge_core::{contains_ci, DomainResult, Entity, FilialeId, Filter};

/// A country/regional subsidiary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filiale {
    pub id: FilialeId,
    pub name: String,
    pub country: String,
    pub created_on: NaiveDate,
}

impl Filiale {
    pub fn new(
        id: FilialeId,
        name: &str,
        country: &str,
        created_on: NaiveDate,
    ) -> DomainResult<Self> {
        require_non_blank("name", name)?;
        require_non_blank("country", country)?;
        Ok(Self {
            id,
            name: name.trim().to_string(),
            country: country.trim().to_string(),
            created_on,
        })
    }

    pub fn rename(&mut self, name: &str, country: &str) -> DomainResult<()> {
        require_non_blank("name", name)?;
        require_non_blank("country", country)?;
        self.name = name.trim().to_string();
        self.country = country.trim().to_string();
        Ok(())
    }
}

impl Entity for Filiale {
    type Id = FilialeId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilialeFilter {
    /// Matches the name or the country.
    pub search: Option<String>,
    /// Exact country.
    pub country: Option<String>,
}

impl Filter<Filiale> for FilialeFilter {
    fn matches(&self, f: &Filiale) -> bool {
        if let Some(search) = &self.search {
            if !contains_ci(&f.name, search) && !contains_ci(&f.country, search) {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if f.country != *country {
                return false;
            }
        }
        true
    }
}
