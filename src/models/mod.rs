pub mod common;
pub mod employee;
pub mod event;
pub mod guest;
pub mod module_config;
pub mod pagination;
pub mod qr;
pub mod raffle;

pub use common::*;
pub use employee::*;
pub use event::*;
pub use guest::*;
pub use module_config::*;
pub use pagination::*;
pub use qr::*;
pub use raffle::*;
