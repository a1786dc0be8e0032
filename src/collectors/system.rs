//! Load average and process liveness

use crate::data::LoadMetrics;
use crate::error::{Result, StatusError};
use crate::utils::file::read_first_line;
use std::path::Path;

/// 1, 5 and 15 minute load averages
pub fn load_average(loadavg_path: &Path) -> Result<LoadMetrics> {
    let mut loads = [0f64; 3];
    let count = unsafe { libc::getloadavg(loads.as_mut_ptr(), 3) };
    if count == 3 {
        return Ok(LoadMetrics {
            one: loads[0],
            five: loads[1],
            fifteen: loads[2],
        });
    }

    read_loadavg(loadavg_path)
}

/// Load averages from a loadavg file only
pub fn read_loadavg(loadavg_path: &Path) -> Result<LoadMetrics> {
    let line = read_first_line(loadavg_path)
        .map_err(|err| StatusError::unavailable("load", err.to_string()))?;
    parse_loadavg(&line).ok_or_else(|| StatusError::unavailable("load", "malformed loadavg"))
}

pub fn parse_loadavg(line: &str) -> Option<LoadMetrics> {
    let mut fields = line.split_whitespace().map(|f| f.parse::<f64>().ok());
    Some(LoadMetrics {
        one: fields.next()??,
        five: fields.next()??,
        fifteen: fields.next()??,
    })
}

/// Whether the pid stored in `pidfile` names a live process
pub fn process_alive(pidfile: &Path) -> bool {
    let pid = match read_first_line(pidfile) {
        Ok(line) => match line.parse::<libc::pid_t>() {
            Ok(pid) if pid > 0 => pid,
            _ => return false,
        },
        Err(_) => return false,
    };

    // Signal 0 only checks for existence; EPERM still means the process is there
    let result = unsafe { libc::kill(pid, 0) };
    result == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loadavg_line() {
        let load = parse_loadavg("0.42 0.30 0.15 1/234 5678").unwrap();
        assert_eq!(load.one, 0.42);
        assert_eq!(load.fifteen, 0.15);
        assert!(parse_loadavg("0.42 abc").is_none());
    }

    #[test]
    fn loadavg_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1.50 0.75 0.25 2/345 6789").unwrap();
        let load = read_loadavg(file.path()).unwrap();
        assert_eq!(load.one, 1.5);
        assert_eq!(load.five, 0.75);
        assert!(read_loadavg(Path::new("/nonexistent/loadavg")).unwrap_err().is_recoverable());
    }

    #[test]
    fn own_pid_is_alive() {
        let mut pidfile = tempfile::NamedTempFile::new().unwrap();
        writeln!(pidfile, "{}", std::process::id()).unwrap();
        assert!(process_alive(pidfile.path()));
    }

    #[test]
    fn garbage_pidfile_is_dead() {
        let mut pidfile = tempfile::NamedTempFile::new().unwrap();
        writeln!(pidfile, "not-a-pid").unwrap();
        assert!(!process_alive(pidfile.path()));
        assert!(!process_alive(Path::new("/nonexistent/pid")));
    }
}
