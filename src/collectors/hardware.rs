//! Disk and memory collection

use crate::data::{DiskMetrics, MemoryMetrics};
use crate::error::{Result, StatusError};
use crate::utils::file::read_metric_file;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// Whether `path` is the root of a mounted filesystem: it lives on another
/// device than its parent, or it is its own parent (`/`)
pub fn is_mount_point(path: &Path) -> Result<bool> {
    let metric = format!("disk {}", path.display());
    let here = fs::metadata(path).map_err(|err| StatusError::unavailable(&metric, err.to_string()))?;
    let parent = fs::metadata(path.join(".."))
        .map_err(|err| StatusError::unavailable(&metric, err.to_string()))?;
    Ok(here.dev() != parent.dev() || here.ino() == parent.ino())
}

/// Usage of the filesystem mounted at `path`; anything that is not a mount
/// point is reported as unavailable
pub fn disk_usage(path: &Path) -> Result<DiskMetrics> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let metric = format!("disk {}", path.display());
    if !is_mount_point(path)? {
        return Err(StatusError::unavailable(metric, "not a mount point"));
    }
    let path_cstr = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| StatusError::unavailable(&metric, "path contains a NUL byte"))?;

    // statvfs directly instead of spawning df
    let stat = unsafe {
        let mut stat: libc::statvfs = std::mem::zeroed();
        if libc::statvfs(path_cstr.as_ptr(), &mut stat) != 0 {
            let err = std::io::Error::last_os_error();
            return Err(StatusError::unavailable(metric, err.to_string()));
        }
        stat
    };

    let frsize = stat.f_frsize as u64;
    Ok(DiskMetrics {
        total: (stat.f_blocks as u64).wrapping_mul(frsize),
        free: (stat.f_bfree as u64).wrapping_mul(frsize),
        avail: (stat.f_bavail as u64).wrapping_mul(frsize),
    })
}

/// Memory figures from a meminfo file
pub fn memory_info(meminfo_path: &Path) -> Result<MemoryMetrics> {
    let meminfo = read_metric_file(meminfo_path)?;
    parse_meminfo(&meminfo)
        .ok_or_else(|| StatusError::unavailable("memory", "MemTotal missing from meminfo"))
}

/// Parse `/proc/meminfo` content; values there are in kB
pub fn parse_meminfo(meminfo: &str) -> Option<MemoryMetrics> {
    let mut total = None;
    let mut free = None;
    let mut available = None;

    for line in meminfo.lines() {
        let mut parts = line.split_whitespace();
        let key = parts.next().unwrap_or("");
        let value = parts.next().and_then(|v| v.parse::<u64>().ok());
        match key {
            "MemTotal:" => total = value,
            "MemFree:" => free = value,
            "MemAvailable:" => available = value,
            _ => {}
        }

        // Early exit if we found everything
        if total.is_some() && free.is_some() && available.is_some() {
            break;
        }
    }

    let total = total? * 1024;
    let free = free.unwrap_or(0) * 1024;
    Some(MemoryMetrics {
        total,
        free,
        available: available.map_or(free, |a| a * 1024),
    })
}
