//! `pledge-auth` — role-based authorization, evaluated server-side.
//!
//! Decoupled from HTTP and storage. Role-based page routing in a client is a
//! convenience only; these checks are the actual boundary.

pub mod authorize;
pub mod permissions;
pub mod policy;
pub mod roles;

pub use authorize::{
    authorize, authorize_any, authorize_in_filiale, within_filiale, AuthzError, Principal,
};
pub use permissions::Permission;
pub use policy::{manageable_roles, permissions_for};
pub use roles::Role;
