//! Types library for the exchange trading client
//!
//! Transport-agnostic type definitions shared by the client services:
//! identifiers, integer prices and sizes, and the order lifecycle.
//!
//! # Modules
//! - `ids`: Identifiers (OrderId and its issuing sequence, Symbol)
//! - `numeric`: Integer price/size types and book levels
//! - `order`: Order lifecycle types
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod order;
pub mod errors;

