use super::{Parser, Subcommand};
use crate::domain_model::Method;

#[derive(Parser, Debug)]
#[command(name = "pocketbook", about = "Authenticated client for the budgeting API")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Exchange a username and password for a session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Show the user behind the stored session
    Me,
    /// Send an authenticated request and print the response body
    Request {
        method: Method,
        path: String,
        /// JSON request body
        #[arg(long)]
        data: Option<String>,
    },
    /// Drop the stored session
    Logout,
}
