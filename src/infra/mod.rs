mod credential_store_file;
mod credential_store_memory;
mod transport_fake;
mod transport_reqwest;

pub use credential_store_file::*;
pub use credential_store_memory::*;
pub use transport_fake::*;
pub use transport_reqwest::*;
