//! Runtime values and the two pure functions over them: shape inference
//! and bounded rendering.

mod infer;
mod repr;
mod value;

pub use infer::*;
pub use repr::*;
pub use value::*;
