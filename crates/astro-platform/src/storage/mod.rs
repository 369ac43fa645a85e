pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod local;
pub mod auto;

pub use memory::MemoryStorage;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;
pub use auto::auto_detect_storage;
