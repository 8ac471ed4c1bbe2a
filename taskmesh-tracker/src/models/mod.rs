/// Storage models owned by the task-tracking service
///
/// # Models
///
/// - `mirror`: Local, eventually-consistent copy of the authentication
///   service's accounts
/// - `task`: Tasks and the dashboard read view
/// - `payment`: Task/account payment associations

pub mod mirror;
pub mod payment;
pub mod task;
