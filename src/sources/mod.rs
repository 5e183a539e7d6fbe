pub mod base;
pub mod csv_format;
pub mod csv_file;
pub mod google;
