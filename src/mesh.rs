pub mod grid;
pub mod warp;
