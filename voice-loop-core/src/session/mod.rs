pub mod capture_session;
pub mod controller;
pub mod events;
pub mod route_selector;
