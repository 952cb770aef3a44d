mod feed;
mod gc;

pub use feed::*;
pub use gc::*;
