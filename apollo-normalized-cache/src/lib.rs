//! Normalized client-side cache for GraphQL responses.
//!
//! A response is flattened into a [`NormMap`], a table of entities keyed by type name and
//! identity, with nested entities replaced by their [`EntityKey`]. The same query can later be
//! answered from that table with [`denormalize`], which reports whether the reconstruction is
//! partial and whether it touched fields marked in [`StaleEntities`].
//!
//! ```text
//! response --normalize--> NormMap --merge--> cached NormMap --denormalize--> data + flags
//! ```
//!
//! Every operation is a pure function of its inputs. The owning cache is responsible for
//! serializing updates of its persisted [`NormMap`] and [`StaleEntities`].

#![cfg_attr(feature = "failfast", allow(unreachable_code))]
#![warn(unreachable_pub)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

macro_rules! failfast_debug {
    ($($tokens:tt)+) => {{
        tracing::debug!($($tokens)+);
        #[cfg(feature = "failfast")]
        panic!(
            "failfast triggered. \
            Please remove the feature failfast if you don't want to see these panics"
        );
    }};
}

pub mod cache;
pub mod configuration;
mod denormalize;
pub mod error;
pub mod json_ext;
mod normalize;
mod spec;

pub use cache::EntityKey;
pub use cache::NormMap;
pub use cache::NormObj;
pub use cache::ROOT_MUTATION;
pub use cache::ROOT_QUERY;
pub use cache::ROOT_SUBSCRIPTION;
pub use cache::merge;
pub use cache::key::KeyPolicy;
pub use cache::stale::StaleEntities;
pub use configuration::Configuration;
pub use denormalize::Denormalized;
pub use denormalize::denormalize;
pub use error::ConfigurationError;
pub use error::InvalidDocument;
pub use normalize::normalize;
pub use spec::Query;
