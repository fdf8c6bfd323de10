pub mod staging;
pub mod track_writer;
