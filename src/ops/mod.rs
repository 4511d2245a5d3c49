pub mod item_ops;
pub mod order;
pub mod paste;
