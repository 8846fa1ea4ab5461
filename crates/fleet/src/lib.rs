//! Distributor fleet: delivery drivers (livreurs) and the trucks they are
//! assigned to.
//!
//! Plain entities with constructor validation and list filters; storage and
//! cross-record checks (unique usernames, same-filiale assignment) are done
//! by the console service.

pub mod livreur;
pub mod truck;

pub use livreur::{Livreur, LivreurFilter, NewLivreur};
pub use truck::{NewTruck, Truck, TruckFilter, TruckKind};
