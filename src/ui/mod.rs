pub mod confirm;
pub mod render;

pub use confirm::confirm;
