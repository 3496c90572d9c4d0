pub mod adapter;
pub mod array;
pub mod copy;
pub mod decoder;
pub mod encoder;
pub mod row;
pub mod utils;
