//! Database entities of the booking service and the role views over them.

pub mod entities;
pub mod roles;

pub use roles::Role;
