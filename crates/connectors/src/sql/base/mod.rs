pub mod adapter;
pub mod copy_options;
pub mod encoder;
pub mod error;
