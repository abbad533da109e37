mod reset_token;
mod user;

pub use reset_token::ResetToken;
pub use user::User;
