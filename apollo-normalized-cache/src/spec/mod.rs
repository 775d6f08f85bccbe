//! Query documents, as consumed by the cache.
//!
//! Documents are parsed by `apollo-compiler` and prepared once into a [`Query`]: the operation
//! is selected, fragment spreads are inlined and directive conditions are extracted so that the
//! cache walks only ever deal with fields and inline fragments.

mod fragments;
pub(crate) mod query;
mod selection;

pub(crate) use fragments::*;
pub use query::Query;
pub(crate) use selection::*;
