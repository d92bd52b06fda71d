mod login;
mod logout;
mod status;
mod sync;
mod watch;

pub use login::run as login;
pub use logout::run as logout;
pub use status::run as status;
pub use sync::run as sync;
pub use watch::run as watch;
