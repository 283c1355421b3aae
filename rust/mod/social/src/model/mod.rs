mod user;
mod tweet;
mod media;

pub use user::*;
pub use tweet::*;
pub use media::*;
