//! Order store implementations for different backends

#[cfg(feature = "http")]
pub mod http;
pub mod in_memory;

#[cfg(feature = "http")]
pub use http::HttpOrderStore;
pub use in_memory::InMemoryOrderStore;
