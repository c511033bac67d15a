pub mod ffi;
pub mod invoker;
pub mod loader;

pub use invoker::{ExtractionRequest, Extractor};
pub use loader::{DynamicEntryPoint, DynamicLoader, EntryPoint, LibraryLoader};

#[cfg(test)]
pub(crate) mod testing;
