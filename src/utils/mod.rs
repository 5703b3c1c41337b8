pub mod array;
pub mod coordinate;
pub mod geometry;
pub mod utils;
