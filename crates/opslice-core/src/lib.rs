//! Cut operation subsets out of large OpenAPI documents.
//!
//! A slice keeps the selected operations, every component they reach through
//! `$ref`, and a fixed security scheme and server. It can optionally collapse
//! `anyOf` unions for generators that reject them.

pub mod closure;
pub mod config;
pub mod error;
pub mod index;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod search;
pub mod select;
pub mod source;
pub mod subset;
pub mod walk;
pub mod write;
