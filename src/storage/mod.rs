mod change_log;
mod object_store;
mod typed_view;

pub use change_log::*;
pub use object_store::*;
pub use typed_view::*;

#[cfg(test)]
mod object_store_test;
