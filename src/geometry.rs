pub mod corners;
pub mod measure;
pub mod orientation;
pub mod tuning;
