mod auth_service_impl;
mod renewal_coordinator;
mod request_interceptor;
mod session_client;
mod session_events;

pub use auth_service_impl::*;
pub use renewal_coordinator::*;
pub use request_interceptor::*;
pub use session_client::*;
pub use session_events::*;
