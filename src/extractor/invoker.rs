use crate::error::{ExtractorError, Result};
use crate::extractor::ffi::path_to_cstring;
use crate::extractor::loader::{EntryPoint, LibraryLoader};
use crate::ui::{OutputFormatter, ProgressSink};
use std::ffi::CString;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything needed for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub input_path: PathBuf,
    pub dest_path: PathBuf,
    pub library_path: PathBuf,
    pub entry_point: String,
}

/// A loaded extractor library with its entry point resolved.
///
/// Constructing one means both the load and the symbol lookup succeeded.
/// [`Extractor::extract`] consumes it, so the routine runs at most once.
pub struct Extractor<E> {
    entry_point: E,
    input_path: CString,
    dest_path: CString,
    output: OutputFormatter,
}

impl<E: EntryPoint> Extractor<E> {
    pub fn open<L>(loader: &L, request: &ExtractionRequest, output: OutputFormatter) -> Result<Self>
    where
        L: LibraryLoader<EntryPoint = E>,
    {
        let input_path = path_to_cstring(&request.input_path)?;
        let dest_path = path_to_cstring(&request.dest_path)?;

        output.verbose("loading the extractor library...");
        let library = loader.load(&request.library_path)?;
        let entry_point = loader.resolve(&library, &request.entry_point)?;
        output.verbose("library loaded!");

        Ok(Self {
            entry_point,
            input_path,
            dest_path,
            output,
        })
    }

    /// Blocks until the library returns. There is no timeout.
    pub fn extract(self, progress: Arc<dyn ProgressSink>) -> Result<()> {
        self.output
            .verbose("verifying the cache file, this may take a minute");

        let status = self
            .entry_point
            .invoke(&self.input_path, &self.dest_path, progress);
        tracing::debug!(status, "extractor library returned");

        if status == 0 {
            Ok(())
        } else {
            Err(ExtractorError::ExtractionFailed { status })
        }
    }
}
