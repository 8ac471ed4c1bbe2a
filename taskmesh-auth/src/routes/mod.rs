/// API route handlers
///
/// # Modules
///
/// - `health`: Health check endpoint
/// - `sessions`: Login and cross-service token verification
/// - `accounts`: Account lifecycle (create, update, delete)

pub mod accounts;
pub mod health;
pub mod sessions;
