pub mod config;
pub mod encoding;
pub mod error;
pub mod features;
pub mod inference;
pub mod models;
pub mod normalize;
pub mod results;
pub mod routes;
