pub mod auth;
pub mod errors;
pub mod openapi;
pub mod routes;
pub mod schemas;
pub mod startup;
pub mod state;

pub use startup::{app, run};
pub use state::ServerState;
