pub mod codec;
#[cfg(test)]
mod fixture;
pub mod fwd;
pub mod link;
pub mod node;
pub mod protocol;
pub mod route;
mod utils;

pub use link::header::WireHeader;
pub use protocol::Protocol;
