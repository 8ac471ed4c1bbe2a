/// Storage models owned by the authentication service
///
/// # Models
///
/// - `account`: Authoritative account table and CRUD operations
/// - `token`: Single-current-token bearer token store

pub mod account;
pub mod token;
