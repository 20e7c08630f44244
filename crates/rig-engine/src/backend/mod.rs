pub mod headless;
pub mod traits;
