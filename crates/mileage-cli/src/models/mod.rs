pub mod activity;

pub use activity::{ActivityTypeField, RawActivity};
