// store

mod credential_store;

pub use credential_store::*;

// network

mod transport;

pub use transport::*;
