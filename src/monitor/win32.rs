//! [`ProcessTable`] backed by the Win32 process list.
//!
//! Takes a Toolhelp snapshot of all processes and asks each one for its
//! full image path.  Processes that cannot be opened with
//! `PROCESS_QUERY_LIMITED_INFORMATION` (protected or elevated ones) are
//! skipped.

use crate::traits::{ProcessTable, ProcessTableError};
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use std::path::PathBuf;
use windows::core::PWSTR;
use windows::Win32::Foundation::{CloseHandle, BOOL, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
    PROCESS_QUERY_LIMITED_INFORMATION,
};

/// Long enough for `\\?\`-prefixed paths beyond `MAX_PATH`.
const IMAGE_PATH_CAPACITY: usize = 32 * 1024;

/// Enumerates processes through the Toolhelp API.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32ProcessTable;

/// Closes the wrapped handle when dropped.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was returned by a successful Win32 call and is
        // closed exactly once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

fn image_path(pid: u32, buf: &mut [u16]) -> Option<PathBuf> {
    if pid == 0 {
        return None;
    }
    // SAFETY: plain FFI call; failure is reported through the Result.
    let handle =
        unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, BOOL::from(false), pid) }.ok()?;
    let handle = OwnedHandle(handle);
    let mut len = buf.len() as u32;
    // SAFETY: `buf` is valid for `len` u16s and outlives the call.
    unsafe {
        QueryFullProcessImageNameW(
            handle.0,
            PROCESS_NAME_WIN32,
            PWSTR(buf.as_mut_ptr()),
            &mut len,
        )
    }
    .ok()?;
    Some(PathBuf::from(OsString::from_wide(&buf[..len as usize])))
}

impl ProcessTable for Win32ProcessTable {
    fn executables(&self) -> Result<Vec<PathBuf>, ProcessTableError> {
        // SAFETY: plain FFI call; failure is reported through the Result.
        let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
            .map_err(|e| ProcessTableError::Os(e.to_string()))?;
        let snapshot = OwnedHandle(snapshot);

        let mut entry = PROCESSENTRY32W {
            dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
            ..Default::default()
        };
        let mut buf = vec![0u16; IMAGE_PATH_CAPACITY];
        let mut exes = Vec::new();

        // SAFETY: `entry.dwSize` is initialised as the API requires.
        let mut more = unsafe { Process32FirstW(snapshot.0, &mut entry) }.is_ok();
        while more {
            if let Some(path) = image_path(entry.th32ProcessID, &mut buf) {
                exes.push(path);
            }
            // SAFETY: as above.
            more = unsafe { Process32NextW(snapshot.0, &mut entry) }.is_ok();
        }
        Ok(exes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_contains_current_process() {
        let exe = std::env::current_exe().unwrap();
        let exes = Win32ProcessTable.executables().unwrap();
        let wanted = crate::monitor::matcher::normalize_exe_path(&exe);
        assert!(exes
            .iter()
            .any(|e| crate::monitor::matcher::normalize_exe_path(e) == wanted));
    }
}
