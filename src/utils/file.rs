//! File reading utilities

use crate::error::{Result, StatusError};
use std::fs;
use std::path::Path;

/// Read a whole file, mapping failures to an unavailable metric
pub fn read_metric_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .map_err(|err| StatusError::unavailable(path.display().to_string(), err.to_string()))
}

/// Read first line of a file, trimmed
/// Optimized for single-line files like /proc/loadavg or sysfs attributes
/// Uses direct syscalls to skip std's buffered reader
pub fn read_first_line<P: AsRef<Path>>(path: P) -> Result<String> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let path_cstr = CString::new(path.as_ref().as_os_str().as_bytes())
        .map_err(|_| StatusError::Config("path contains a NUL byte".to_string()))?;

    unsafe {
        let fd = libc::open(path_cstr.as_ptr(), libc::O_RDONLY);
        if fd < 0 {
            return Err(StatusError::from(std::io::Error::last_os_error()));
        }

        let mut buffer = [0u8; 256];
        let bytes_read = libc::read(fd, buffer.as_mut_ptr() as *mut libc::c_void, buffer.len());
        libc::close(fd);

        if bytes_read < 0 {
            return Err(StatusError::from(std::io::Error::last_os_error()));
        }

        let content = String::from_utf8_lossy(&buffer[..bytes_read as usize]);
        Ok(content.lines().next().unwrap_or("").trim().to_string())
    }
}

/// Check if a file exists safely
pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists()
}
