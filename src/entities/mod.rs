pub mod employees;
pub mod events;
pub mod guests;
pub mod module_configs;
pub mod raffles;

pub use employees as employee_entity;
pub use events as event_entity;
pub use guests as guest_entity;
pub use module_configs as module_config_entity;
pub use raffles as raffle_entity;
