pub mod content;
pub mod index;
