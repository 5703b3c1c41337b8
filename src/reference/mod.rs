pub mod library;
pub mod reference;
