pub mod auth;
pub mod error;
pub mod middleware;
pub mod profile;
pub mod resources;
pub mod routes;
pub mod sessions;
