pub mod data_type;
pub mod errors;
pub mod utils;
pub mod value;
