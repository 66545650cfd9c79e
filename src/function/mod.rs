mod descriptor;
mod meta;

pub use descriptor::*;
pub use meta::*;
