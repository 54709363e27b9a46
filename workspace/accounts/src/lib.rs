//! Account management for the booking service: users and credentials,
//! API tokens, teacher groups, push tokens and the voucher ledger.

pub mod error;
pub mod jwt;
pub mod message_tokens;
pub mod password;
pub mod teacher_groups;
pub mod users;
pub mod vouchers;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AccountsError, Result};
pub use jwt::{Claims, JwtAuth, JwtPolicy};
pub use vouchers::{VoucherLedger, VoucherStatement};
