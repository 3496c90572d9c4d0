pub mod record;
pub mod row;
