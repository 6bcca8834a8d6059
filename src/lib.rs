//! Multi-source football player statistics: fetch, normalize, resolve,
//! merge, score, rank, cache.

pub mod collect;
pub mod export;
pub mod fake_source;
pub mod fotmob_source;
pub mod http_client;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod rank;
pub mod rating_source;
pub mod resolve;
pub mod result_cache;
pub mod source;
