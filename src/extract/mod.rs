//! Request extractors. Every rejection renders as an
//! [`ErrorBody`](crate::error::ErrorBody).

mod admin;
mod input;
mod visitor;

pub use admin::{AdminAuth, Principal};
pub use input::{Json, Path, Query};
pub use visitor::Visitor;
