pub mod cli;
pub mod compute;
pub mod config;
pub mod error;
pub mod gateway;
pub mod iam;
pub mod middleware;
pub mod provision;
pub mod routes;
pub mod types;

#[cfg(test)]
pub mod testing;
