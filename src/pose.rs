pub mod landmark;
