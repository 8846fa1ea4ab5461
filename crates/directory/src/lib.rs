//! Organization directory: filiales, their regions, console users and the
//! shops commercials register.
//!
//! Plain entities with constructor validation plus the list filters the
//! console screens use. Storage lives behind the repository in `pledge-infra`.

pub mod filiale;
pub mod region;
pub mod shop;
pub mod user;

pub use filiale::{Filiale, FilialeFilter};
pub use region::{Region, RegionFilter};
pub use shop::{GeoPoint, NewShop, Shop, ShopAccess, ShopFilter};
pub use user::{NewUser, User, UserFilter};

pub use pledge_core::Filter;
