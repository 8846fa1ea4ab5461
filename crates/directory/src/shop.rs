use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pledge_core::error::require_non_blank;
use pledge_core::{contains_ci, DomainError, DomainResult, Entity, FilialeId, Filter, ShopId};

use crate::user::check_email;

/// Shop location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    fn validate(&self) -> DomainResult<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(DomainError::validation("latitude", "latitude must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(DomainError::validation(
                "longitude",
                "longitude must be between -180 and 180",
            ));
        }
        Ok(())
    }
}

/// How a shop signs in to place orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum ShopAccess {
    Email { email: String },
    QrCode { qr_code: String },
}

impl ShopAccess {
    /// QR access with a freshly generated code: `QR-<shop code>-<9 random chars>`.
    pub fn generated_qr(shop_code: &str) -> Self {
        let prefix = match shop_code.trim() {
            "" => "SHOP",
            code => code,
        };
        let random = Uuid::now_v7().simple().to_string();
        let suffix = random[random.len() - 9..].to_uppercase();
        ShopAccess::QrCode {
            qr_code: format!("QR-{prefix}-{suffix}"),
        }
    }

    fn validate(&self) -> DomainResult<()> {
        match self {
            ShopAccess::Email { email } => check_email(email),
            ShopAccess::QrCode { qr_code } => require_non_blank("qr_code", qr_code),
        }
    }

    fn normalized(self) -> Self {
        match self {
            ShopAccess::Email { email } => ShopAccess::Email {
                email: email.trim().to_lowercase(),
            },
            ShopAccess::QrCode { qr_code } => ShopAccess::QrCode {
                qr_code: qr_code.trim().to_string(),
            },
        }
    }
}

/// A point of sale registered by a commercial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub filiale_id: FilialeId,
    pub shop_name: String,
    pub contact_name: String,
    pub phone: String,
    pub address: String,
    pub location: Option<GeoPoint>,
    /// Unique per console, compared ignoring case.
    pub code: String,
    pub access: ShopAccess,
    pub created_on: NaiveDate,
}

/// Input for registering or editing a shop.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShop {
    pub filiale_id: FilialeId,
    pub shop_name: String,
    pub contact_name: String,
    pub phone: String,
    pub address: String,
    pub location: Option<GeoPoint>,
    pub code: String,
    pub access: ShopAccess,
}

impl NewShop {
    fn validate(&self) -> DomainResult<()> {
        require_non_blank("shop_name", &self.shop_name)?;
        require_non_blank("contact_name", &self.contact_name)?;
        require_non_blank("phone", &self.phone)?;
        require_non_blank("address", &self.address)?;
        require_non_blank("code", &self.code)?;
        if let Some(location) = &self.location {
            location.validate()?;
        }
        self.access.validate()
    }
}

impl Shop {
    pub fn new(id: ShopId, input: NewShop, created_on: NaiveDate) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self {
            id,
            filiale_id: input.filiale_id,
            shop_name: input.shop_name.trim().to_string(),
            contact_name: input.contact_name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            address: input.address.trim().to_string(),
            location: input.location,
            code: input.code.trim().to_string(),
            access: input.access.normalized(),
            created_on,
        })
    }

    pub fn update(&mut self, input: NewShop) -> DomainResult<()> {
        let updated = Shop::new(self.id, input, self.created_on)?;
        *self = updated;
        Ok(())
    }

    pub fn same_code(&self, other: &Shop) -> bool {
        self.code.eq_ignore_ascii_case(&other.code)
    }
}

impl Entity for Shop {
    type Id = ShopId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShopFilter {
    /// Matches the shop name, the contact name or the code.
    pub search: Option<String>,
    pub filiale_id: Option<FilialeId>,
}

impl Filter<Shop> for ShopFilter {
    fn matches(&self, s: &Shop) -> bool {
        if let Some(search) = &self.search {
            if !contains_ci(&s.shop_name, search)
                && !contains_ci(&s.contact_name, search)
                && !contains_ci(&s.code, search)
            {
                return false;
            }
        }
        self.filiale_id.is_none_or(|id| s.filiale_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 15).unwrap()
    }

    fn nord(filiale_id: FilialeId) -> NewShop {
        NewShop {
            filiale_id,
            shop_name: "Gas Station Nord".to_string(),
            contact_name: "Mohamed Ali".to_string(),
            phone: "+212 600 123 456".to_string(),
            address: "123 Avenue Hassan II, Casablanca".to_string(),
            location: Some(GeoPoint {
                latitude: 33.5731,
                longitude: -7.5898,
            }),
            code: "GS-NORD-001".to_string(),
            access: ShopAccess::Email {
                email: " GasStation.Nord@example.com ".to_string(),
            },
        }
    }

    #[test]
    fn required_fields_are_checked_in_form_order() {
        let mut input = nord(FilialeId::new());
        input.phone = " ".to_string();
        input.code = String::new();
        let err = Shop::new(ShopId::new(), input, day()).unwrap_err();
        assert_eq!(err.field(), Some("phone"));
    }

    #[test]
    fn coordinates_must_be_on_the_globe() {
        let mut input = nord(FilialeId::new());
        input.location = Some(GeoPoint {
            latitude: 91.0,
            longitude: 0.0,
        });
        let err = Shop::new(ShopId::new(), input.clone(), day()).unwrap_err();
        assert_eq!(err.field(), Some("latitude"));

        input.location = Some(GeoPoint {
            latitude: 0.0,
            longitude: -180.5,
        });
        let err = Shop::new(ShopId::new(), input.clone(), day()).unwrap_err();
        assert_eq!(err.field(), Some("longitude"));

        input.location = None;
        assert!(Shop::new(ShopId::new(), input, day()).is_ok());
    }

    #[test]
    fn access_method_is_validated() {
        let mut input = nord(FilialeId::new());
        input.access = ShopAccess::Email {
            email: "nord".to_string(),
        };
        let err = Shop::new(ShopId::new(), input.clone(), day()).unwrap_err();
        assert_eq!(err.field(), Some("email"));

        input.access = ShopAccess::QrCode {
            qr_code: "  ".to_string(),
        };
        let err = Shop::new(ShopId::new(), input, day()).unwrap_err();
        assert_eq!(err.field(), Some("qr_code"));
    }

    #[test]
    fn email_access_is_normalized() {
        let shop = Shop::new(ShopId::new(), nord(FilialeId::new()), day()).unwrap();
        assert_eq!(
            shop.access,
            ShopAccess::Email {
                email: "gasstation.nord@example.com".to_string()
            }
        );
    }

    #[test]
    fn generated_qr_codes_carry_the_shop_code() {
        let ShopAccess::QrCode { qr_code } = ShopAccess::generated_qr("MM-EXP-002") else {
            panic!("expected QR access");
        };
        assert!(qr_code.starts_with("QR-MM-EXP-002-"));
        let suffix = &qr_code["QR-MM-EXP-002-".len()..];
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

        let ShopAccess::QrCode { qr_code } = ShopAccess::generated_qr(" ") else {
            panic!("expected QR access");
        };
        assert!(qr_code.starts_with("QR-SHOP-"));
    }

    #[test]
    fn access_serializes_with_a_method_tag() {
        let json = serde_json::to_value(ShopAccess::QrCode {
            qr_code: "QR-1".to_string(),
        })
        .unwrap();
        assert_eq!(json["method"], "qrcode");
    }

    #[test]
    fn codes_compare_ignoring_case() {
        let a = Shop::new(ShopId::new(), nord(FilialeId::new()), day()).unwrap();
        let mut input = nord(FilialeId::new());
        input.code = "gs-nord-001".to_string();
        let b = Shop::new(ShopId::new(), input, day()).unwrap();
        assert!(a.same_code(&b));
    }

    #[test]
    fn search_covers_names_and_code() {
        let west = FilialeId::new();
        let mut express = nord(west);
        express.shop_name = "Mini Market Express".to_string();
        express.contact_name = "Fatima Zahra".to_string();
        express.code = "MM-EXP-002".to_string();
        let shops = vec![
            Shop::new(ShopId::new(), nord(west), day()).unwrap(),
            Shop::new(ShopId::new(), express, day()).unwrap(),
            Shop::new(ShopId::new(), nord(FilialeId::new()), day()).unwrap(),
        ];

        let by_contact = ShopFilter {
            search: Some("fatima".to_string()),
            ..Default::default()
        };
        assert_eq!(by_contact.apply(shops.clone())[0].code, "MM-EXP-002");

        let by_code = ShopFilter {
            search: Some("nord-001".to_string()),
            filiale_id: Some(west),
        };
        assert_eq!(by_code.apply(shops).len(), 1);
    }

    #[test]
    fn update_keeps_identity_and_creation_date() {
        let mut shop = Shop::new(ShopId::new(), nord(FilialeId::new()), day()).unwrap();
        let id = shop.id;
        let mut input = nord(shop.filiale_id);
        input.address = "9 Rue Tarik, Rabat".to_string();
        shop.update(input).unwrap();
        assert_eq!(shop.id, id);
        assert_eq!(shop.created_on, day());
        assert_eq!(shop.address, "9 Rue Tarik, Rabat");

        let mut bad = nord(shop.filiale_id);
        bad.shop_name = String::new();
        assert!(shop.update(bad).is_err());
        assert_eq!(shop.address, "9 Rue Tarik, Rabat");
    }
}
