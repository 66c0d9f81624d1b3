//! Opponent controller components

pub mod controller;


pub use controller::*;
