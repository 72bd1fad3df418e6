//! Service layer for Horizon: business rules on top of the `models` entities.
//! - Functions take any `ConnectionTrait`, so the same code runs on the pool
//!   or inside a request [`unit_of_work::UnitOfWork`].
//! - Errors are [`errors::ServiceError`]; the HTTP layer maps them once.

pub mod errors;
pub mod filters;
pub mod pagination;
pub mod unit_of_work;
pub mod auth;
pub mod namespace_service;
pub mod hwm_service;
pub mod hwm_history_service;
#[cfg(test)]
pub mod test_support;
