pub mod curves;
pub mod dimensions;
pub mod models;
pub mod scorer;


pub use dimensions::*;
pub use models::*;
pub use scorer::*;
