mod active_space;
mod dmet;

pub use active_space::*;
pub use dmet::*;
