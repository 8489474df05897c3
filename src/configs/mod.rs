pub mod base;
pub mod encoder;
pub mod input;
pub mod logging;

pub use base::*;
pub use encoder::*;
pub use input::*;
pub use logging::*;
