use core::str::FromStr;

use serde::{Deserialize, Serialize};

use pledge_core::DomainError;

/// Console role. Serialized with the display names used across the console
/// ("Country Manager", not "country_manager").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[serde(rename = "Country Manager")]
    CountryManager,
    Commercial,
    Distributor,
    Shop,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::CountryManager,
        Role::Commercial,
        Role::Distributor,
        Role::Shop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::CountryManager => "Country Manager",
            Role::Commercial => "Commercial",
            Role::Distributor => "Distributor",
            Role::Shop => "Shop",
        }
    }

    /// Landing page after login: `/<role, lowercased, spaces removed>/dashboard`.
    pub fn home_path(&self) -> String {
        let segment: String = self
            .as_str()
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        format!("/{segment}/dashboard")
    }

    /// Every role except Admin operates inside a single filiale.
    pub fn requires_filiale(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation("role", format!("unknown role '{s}'")))
    }
}
