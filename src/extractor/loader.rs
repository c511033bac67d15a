use crate::error::{ExtractorError, Result};
use crate::extractor::ffi::{self, RawExtractFn};
use crate::ui::ProgressSink;
use libloading::{Library, Symbol};
use std::ffi::CStr;
use std::path::Path;
use std::sync::Arc;

/// A resolved extraction routine.
pub trait EntryPoint {
    /// Runs the routine to completion and returns its raw status (0 is success).
    fn invoke(&self, input: &CStr, dest: &CStr, progress: Arc<dyn ProgressSink>) -> i32;
}

/// Loads plugin libraries and resolves their entry points.
pub trait LibraryLoader {
    type Library;
    type EntryPoint: EntryPoint;

    fn load(&self, path: &Path) -> Result<Self::Library>;

    /// The returned entry point must keep whatever it needs from `library` alive.
    fn resolve(&self, library: &Self::Library, symbol: &str) -> Result<Self::EntryPoint>;
}

/// Loader backed by the platform's dynamic linker.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicLoader;

/// An entry point inside a dynamically loaded library.
pub struct DynamicEntryPoint {
    func: RawExtractFn,
    _library: Arc<Library>,
}

impl DynamicLoader {
    pub fn new() -> Self {
        Self
    }

    #[cfg(unix)]
    unsafe fn open(path: &Path) -> std::result::Result<Library, libloading::Error> {
        use libloading::os::unix::{Library as UnixLibrary, RTLD_LOCAL, RTLD_NOW};

        UnixLibrary::open(Some(path), RTLD_NOW | RTLD_LOCAL).map(Library::from)
    }

    #[cfg(not(unix))]
    unsafe fn open(path: &Path) -> std::result::Result<Library, libloading::Error> {
        Library::new(path)
    }
}

impl LibraryLoader for DynamicLoader {
    type Library = Arc<Library>;
    type EntryPoint = DynamicEntryPoint;

    fn load(&self, path: &Path) -> Result<Self::Library> {
        tracing::debug!(path = %path.display(), "opening extractor library");

        // SAFETY: loading runs the library's initialisers; the user chose to trust it.
        let library = unsafe { Self::open(path) }.map_err(|source| {
            tracing::debug!(error = %source, "dlopen failed");
            ExtractorError::LoadLibrary {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Ok(Arc::new(library))
    }

    fn resolve(&self, library: &Self::Library, symbol: &str) -> Result<Self::EntryPoint> {
        tracing::debug!(symbol, "resolving extract function");

        // SAFETY: the symbol is assumed to have the `RawExtractFn` signature, which is
        // the documented interface of dsc_extractor.bundle.
        let func = unsafe {
            let func: Symbol<RawExtractFn> =
                library
                    .get(symbol.as_bytes())
                    .map_err(|source| ExtractorError::ResolveSymbol {
                        symbol: symbol.to_string(),
                        source,
                    })?;
            *func
        };

        Ok(DynamicEntryPoint {
            func,
            _library: Arc::clone(library),
        })
    }
}

impl EntryPoint for DynamicEntryPoint {
    fn invoke(&self, input: &CStr, dest: &CStr, progress: Arc<dyn ProgressSink>) -> i32 {
        // SAFETY: `func` was resolved from `_library`, which this value keeps loaded.
        unsafe { ffi::call_extract(self.func, input, dest, progress) }
    }
}
