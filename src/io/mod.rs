pub mod dataset_read;
pub mod excel_write;

pub use dataset_read::LoadOptions;
