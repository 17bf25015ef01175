pub mod strip;
pub mod theme;

pub use theme::styles;
