pub mod slot_storage;

pub use slot_storage::{FileSlotStorage, MemorySlotStorage, SlotStorage};
