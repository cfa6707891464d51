mod health_check;
mod helpers;
mod home;

pub use health_check::*;
pub use helpers::*;
pub use home::*;
