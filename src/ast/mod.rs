pub mod display;
pub mod expression;
pub mod value;

pub use display::*;
pub use expression::*;
pub use value::*;
