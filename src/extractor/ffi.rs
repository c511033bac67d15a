//! Calling convention of the extractor library's entry point.
//!
//! On Apple platforms `dsc_extractor.bundle` takes an Objective-C block for
//! progress. Elsewhere the entry point takes a plain C function pointer, and
//! the sink is reached through a process-wide slot.

use crate::error::{ExtractorError, Result};
use crate::ui::ProgressSink;
use std::ffi::{CStr, CString};
use std::os::raw::c_int;
use std::path::Path;
use std::sync::Arc;

pub use imp::{call_extract, RawExtractFn};

#[cfg(target_vendor = "apple")]
mod imp {
    use super::{c_int, Arc, CStr, ProgressSink};
    use block2::{Block, RcBlock};
    use std::os::raw::{c_char, c_uint};

    pub type RawExtractFn = unsafe extern "C" fn(
        shared_cache_file_path: *const c_char,
        extraction_root_path: *const c_char,
        progress: &Block<dyn Fn(c_uint, c_uint) + 'static>,
    ) -> c_int;

    /// # Safety
    ///
    /// `func` must point to a live function with the `RawExtractFn` signature.
    pub unsafe fn call_extract(
        func: RawExtractFn,
        input: &CStr,
        dest: &CStr,
        progress: Arc<dyn ProgressSink>,
    ) -> c_int {
        let block: RcBlock<dyn Fn(c_uint, c_uint)> =
            RcBlock::new(move |current: c_uint, total: c_uint| progress.report(current, total));

        func(input.as_ptr(), dest.as_ptr(), &block)
    }
}

#[cfg(not(target_vendor = "apple"))]
mod imp {
    use super::{c_int, Arc, CStr, ProgressSink};
    use std::os::raw::{c_char, c_uint};
    use std::sync::{Mutex, MutexGuard};

    pub type RawExtractFn = unsafe extern "C" fn(
        shared_cache_file_path: *const c_char,
        extraction_root_path: *const c_char,
        progress: extern "C" fn(c_uint, c_uint),
    ) -> c_int;

    static CALL_LOCK: Mutex<()> = Mutex::new(());
    static ACTIVE_SINK: Mutex<Option<Arc<dyn ProgressSink>>> = Mutex::new(None);

    fn active_sink() -> MutexGuard<'static, Option<Arc<dyn ProgressSink>>> {
        ACTIVE_SINK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    extern "C" fn progress_trampoline(current: c_uint, total: c_uint) {
        let sink = active_sink().clone();
        match sink {
            Some(sink) => sink.report(current, total),
            None => tracing::warn!(current, total, "progress reported outside of an extraction"),
        }
    }

    /// Clears the slot when the call returns, unwinding included.
    struct InstalledSink;

    impl InstalledSink {
        fn install(progress: Arc<dyn ProgressSink>) -> Self {
            *active_sink() = Some(progress);
            Self
        }
    }

    impl Drop for InstalledSink {
        fn drop(&mut self) {
            *active_sink() = None;
        }
    }

    /// # Safety
    ///
    /// `func` must point to a live function with the `RawExtractFn` signature.
    pub unsafe fn call_extract(
        func: RawExtractFn,
        input: &CStr,
        dest: &CStr,
        progress: Arc<dyn ProgressSink>,
    ) -> c_int {
        let _call = CALL_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _sink = InstalledSink::install(progress);

        func(input.as_ptr(), dest.as_ptr(), progress_trampoline)
    }
}

pub fn path_to_cstring(path: &Path) -> Result<CString> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path.to_string_lossy().into_owned().into_bytes();

    CString::new(bytes).map_err(|_| ExtractorError::InvalidPath {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_path_to_cstring() {
        let c_path = path_to_cstring(Path::new("/tmp/work")).unwrap();
        assert_eq!(c_path.to_bytes(), b"/tmp/work");
    }

    #[test]
    fn test_interior_nul_rejected() {
        let result = path_to_cstring(&PathBuf::from("cache\0.bin"));
        assert!(matches!(result, Err(ExtractorError::InvalidPath { .. })));
    }

    #[cfg(not(target_vendor = "apple"))]
    mod trampoline {
        use super::*;
        use crate::extractor::testing::RecordingSink;
        use std::os::raw::{c_char, c_uint};

        unsafe extern "C" fn fake_extract(
            input: *const c_char,
            dest: *const c_char,
            progress: extern "C" fn(c_uint, c_uint),
        ) -> c_int {
            let input = CStr::from_ptr(input).to_str().unwrap();
            let dest = CStr::from_ptr(dest).to_str().unwrap();
            if input != "cache.bin" || dest != "/tmp/work" {
                return 1;
            }

            std::thread::scope(|scope| {
                for worker in 0..4 {
                    scope.spawn(move || progress(worker, 4));
                }
            });
            0
        }

        #[test]
        fn test_progress_reaches_sink_through_trampoline() {
            let sink = Arc::new(RecordingSink::default());
            let input = CString::new("cache.bin").unwrap();
            let dest = CString::new("/tmp/work").unwrap();

            let status = unsafe { call_extract(fake_extract, &input, &dest, sink.clone()) };

            assert_eq!(status, 0);
            let mut reports = sink.reports.lock().unwrap().clone();
            reports.sort();
            assert_eq!(reports, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
        }
    }
}
