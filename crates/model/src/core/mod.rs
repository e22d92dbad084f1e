pub mod data_type;
pub mod duration;
pub mod value;
