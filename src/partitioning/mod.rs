mod logging;
mod svd;

pub use svd::*;
