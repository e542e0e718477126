pub mod error;
pub mod messages;
pub mod requests;
pub mod responses;

pub use error::*;
pub use messages::*;
pub use requests::*;
pub use responses::*;
