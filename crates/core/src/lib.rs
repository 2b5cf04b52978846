pub mod models;
pub mod period;
pub mod traits;

pub use models::*;
pub use period::*;
pub use traits::*;
