//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Token issuing and verification live here so the HTTP layer only has to
//! extract the bearer token and call [`AuthService::current_user`].

pub mod domain;
pub mod errors;
pub mod jwt;
pub mod provider;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::AuthService;
