//! Read access to the content platform.

pub mod in_memory;
pub mod queries;
pub mod sanity;
pub mod traits;

pub use in_memory::InMemoryContent;
pub use sanity::SanityClient;
pub use traits::ContentSource;
