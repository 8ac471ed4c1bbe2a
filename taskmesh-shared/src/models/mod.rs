/// Types shared across the taskmesh service boundary
///
/// Only types that cross the boundary between the authentication service and
/// the task-tracking service live here. Each service keeps the models for the
/// tables it exclusively owns in its own crate.
///
/// # Models
///
/// - `role`: The account role hierarchy carried in events and tokens

pub mod role;

pub use role::Role;
