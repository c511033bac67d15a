//! In-process stand-ins for the extractor library.

use crate::error::{ExtractorError, Result};
use crate::extractor::loader::{EntryPoint, LibraryLoader};
use crate::ui::ProgressSink;
use std::cell::RefCell;
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct Calls {
    pub loads: Vec<PathBuf>,
    pub resolves: Vec<String>,
    pub invocations: Vec<(String, String)>,
}

pub struct FakeLoader {
    pub loadable: bool,
    pub exports: bool,
    pub status: i32,
    pub progress: Vec<(u32, u32)>,
    pub calls: Rc<RefCell<Calls>>,
}

pub struct FakeEntryPoint {
    status: i32,
    progress: Vec<(u32, u32)>,
    calls: Rc<RefCell<Calls>>,
}

impl FakeLoader {
    pub fn new(loadable: bool, exports: bool, status: i32) -> Self {
        Self {
            loadable,
            exports,
            status,
            progress: vec![(0, 3), (1, 3), (2, 3), (3, 3)],
            calls: Rc::new(RefCell::new(Calls::default())),
        }
    }

    pub fn working() -> Self {
        Self::new(true, true, 0)
    }
}

impl LibraryLoader for FakeLoader {
    type Library = ();
    type EntryPoint = FakeEntryPoint;

    fn load(&self, path: &Path) -> Result<()> {
        self.calls.borrow_mut().loads.push(path.to_path_buf());
        if self.loadable {
            Ok(())
        } else {
            Err(ExtractorError::LoadLibrary {
                path: path.to_path_buf(),
                source: libloading::Error::DlOpenUnknown,
            })
        }
    }

    fn resolve(&self, _library: &(), symbol: &str) -> Result<FakeEntryPoint> {
        self.calls.borrow_mut().resolves.push(symbol.to_string());
        if self.exports {
            Ok(FakeEntryPoint {
                status: self.status,
                progress: self.progress.clone(),
                calls: Rc::clone(&self.calls),
            })
        } else {
            Err(ExtractorError::ResolveSymbol {
                symbol: symbol.to_string(),
                source: libloading::Error::DlSymUnknown,
            })
        }
    }
}

impl EntryPoint for FakeEntryPoint {
    fn invoke(&self, input: &CStr, dest: &CStr, progress: Arc<dyn ProgressSink>) -> i32 {
        self.calls.borrow_mut().invocations.push((
            input.to_string_lossy().into_owned(),
            dest.to_string_lossy().into_owned(),
        ));
        for &(current, total) in &self.progress {
            progress.report(current, total);
        }
        self.status
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub reports: Mutex<Vec<(u32, u32)>>,
}

impl ProgressSink for RecordingSink {
    fn report(&self, current: u32, total: u32) {
        self.reports.lock().unwrap().push((current, total));
    }
}
