mod credential;
mod request;
mod response;
mod user;

pub use credential::*;
pub use request::*;
pub use response::*;
pub use user::*;
