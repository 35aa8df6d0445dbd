pub mod stats;
pub mod sync;

pub use stats::{current_week, last_7_days, monthly, weekly};
pub use sync::{run as sync_run, status as sync_status};
