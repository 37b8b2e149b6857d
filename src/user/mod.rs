//! User accounts: signup, login and profile management.

mod service;

pub use service::{LoginOutcome, UserInfo, UserService};
