pub mod employee_service;
pub mod event_service;
pub mod module_config_service;
pub mod raffle_service;

pub use employee_service::*;
pub use event_service::*;
pub use module_config_service::*;
pub use raffle_service::*;
