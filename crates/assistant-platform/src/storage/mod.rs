pub mod memory;
pub mod local_storage;
pub mod auto;

pub use memory::MemoryStorage;
pub use local_storage::LocalStorage;
pub use auto::{auto_detect_storage, open_storage};
