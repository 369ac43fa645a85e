pub mod ports;
pub mod event_bus;
pub mod frame;
pub mod store;
pub mod reconcile;
pub mod pane;
