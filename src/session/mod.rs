pub mod drill;
pub mod input;
pub mod lesson;
pub mod result;
