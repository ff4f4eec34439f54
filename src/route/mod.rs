pub mod admin;
pub mod analytics;
pub mod docs;
pub mod generate;
pub mod model;
pub mod post;
pub mod schedule;
pub mod social;
