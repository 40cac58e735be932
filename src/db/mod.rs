//! Vector storage.
//!
//! Only the in-process store ships today; other backends plug in behind the
//! [`VectorStore`] trait.

pub mod vectorstore;

pub use vectorstore::{CollectionStats, InMemoryVectorStore, VectorStore};
