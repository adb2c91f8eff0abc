#![forbid(unsafe_code)]

mod cache;
mod campaign;
mod engine;
mod error;
mod model;
mod store;

pub use cache::*;
pub use campaign::*;
pub use engine::*;
pub use error::*;
pub use evently_query::{Predicate, Property, PropertyBag};
pub use model::*;
pub use store::*;
