pub mod access;
pub mod applications;
pub mod config;
pub mod errors;
pub mod ids;
pub mod jobs;
pub mod marketplace;
pub mod models;
pub mod remote;
pub mod routes;
pub mod session;
pub mod state;
