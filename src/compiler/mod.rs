//! Request-parameter compiler
//!
//! Turns loosely typed request parameters into validated, ordered calls on
//! the engine's query and command interfaces.

pub mod case;
pub mod coerce;
pub mod expression;
pub mod operator;
pub mod pagination;
pub mod params;
pub mod registry;
pub mod request;
pub mod selector;
pub mod sorting;

pub use coerce::Coercer;
pub use params::RequestParams;
pub use request::QueryRequest;
