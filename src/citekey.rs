//! # Citation key generation (§4.F)
//! A template-driven key generator (`{author}{year}`-style patterns), case transforms,
//! Unicode-to-ASCII sanitization, and collision resolution (synchronous and async).
mod async_gen;
mod case;
mod generator;
mod pattern;
mod resolve;
mod sanitize;
mod tokens;

pub use async_gen::{generate_batch_async, generate_key_async, AsyncExistsChecker};
pub use case::Case;
pub use generator::generate_key;
pub use pattern::{KeyPattern, Segment};
pub use resolve::{resolve_collision, CollisionStrategy, APPEND_NUMBER_CAP};
pub use sanitize::{sanitize, transliterate};
pub use tokens::STOPWORDS;
