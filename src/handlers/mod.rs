mod health;
mod protected;

pub use health::health_check;
pub use protected::{login, whoami};
