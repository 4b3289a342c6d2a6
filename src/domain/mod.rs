pub mod cart;
pub mod customer;
pub mod item;
pub mod order;

pub use cart::*;
pub use customer::*;
pub use item::*;
pub use order::*;
