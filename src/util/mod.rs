pub mod store;
pub mod subscribe;

pub use store::Store;
pub use subscribe::{NextFn, Observer, Unsubscribe};
