mod api;

pub use api::{ConnectClient, Session};
