mod health;
mod rewrite;
mod session;
mod token;

pub use health::health_check;
pub use rewrite::rewrite_text;
pub use session::{login, logout};
pub use token::issue_token;
