// Devcap Kernel Property Access
// sysctl-backed property queries behind a swappable source trait

use std::collections::HashMap;

/// Result type for sysctl lookups
pub type SysctlResult<T> = Result<T, SysctlError>;

/// Errors that can occur reading kernel properties
#[derive(Debug, thiserror::Error)]
pub enum SysctlError {
    #[error("sysctl key not present: {0}")]
    NotFound(String),

    #[error("sysctl key contains an interior NUL: {0}")]
    InvalidKey(String),

    #[error("sysctl interface not available on this platform")]
    Unsupported,

    #[error("sysctl read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of kernel property strings and integers.
///
/// The engine only ever reads dotted keys (`kern.features.*` for the
/// evdev feature flag, `dev.<driver>.<unit>.%desc` and friends for
/// legacy metadata). Routing the reads through a trait keeps the
/// classification and synthesis logic testable off-target.
pub trait SysctlSource {
    fn string_value(&self, key: &str) -> SysctlResult<String>;
    fn int_value(&self, key: &str) -> SysctlResult<i32>;
}

/// Live kernel sysctl tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelSysctl;

impl KernelSysctl {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
impl SysctlSource for KernelSysctl {
    fn string_value(&self, key: &str) -> SysctlResult<String> {
        let name = std::ffi::CString::new(key)
            .map_err(|_| SysctlError::InvalidKey(key.to_string()))?;
        let mut buf = vec![0u8; 1024];
        let mut len = buf.len();
        let rc = unsafe {
            libc::sysctlbyname(
                name.as_ptr(),
                buf.as_mut_ptr().cast(),
                &mut len,
                std::ptr::null(),
                0,
            )
        };
        if rc < 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        buf.truncate(len);
        // Values arrive NUL-terminated.
        if buf.last() == Some(&0) {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn int_value(&self, key: &str) -> SysctlResult<i32> {
        let name = std::ffi::CString::new(key)
            .map_err(|_| SysctlError::InvalidKey(key.to_string()))?;
        let mut value: libc::c_int = 0;
        let mut len = std::mem::size_of::<libc::c_int>();
        let rc = unsafe {
            libc::sysctlbyname(
                name.as_ptr(),
                (&mut value as *mut libc::c_int).cast(),
                &mut len,
                std::ptr::null(),
                0,
            )
        };
        if rc < 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(value)
    }
}

#[cfg(not(any(target_os = "freebsd", target_os = "dragonfly")))]
impl SysctlSource for KernelSysctl {
    fn string_value(&self, _key: &str) -> SysctlResult<String> {
        Err(SysctlError::Unsupported)
    }

    fn int_value(&self, _key: &str) -> SysctlResult<i32> {
        Err(SysctlError::Unsupported)
    }
}

/// Fixed in-memory sysctl table.
///
/// Serves tests and platforms without a sysctl tree; lookups miss
/// with `SysctlError::NotFound`.
#[derive(Debug, Clone, Default)]
pub struct StaticSysctl {
    strings: HashMap<String, String>,
    ints: HashMap<String, i32>,
}

impl StaticSysctl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.strings.insert(key.into(), value.into());
        self
    }

    pub fn with_int(mut self, key: impl Into<String>, value: i32) -> Self {
        self.ints.insert(key.into(), value);
        self
    }
}

impl SysctlSource for StaticSysctl {
    fn string_value(&self, key: &str) -> SysctlResult<String> {
        self.strings
            .get(key)
            .cloned()
            .ok_or_else(|| SysctlError::NotFound(key.to_string()))
    }

    fn int_value(&self, key: &str) -> SysctlResult<i32> {
        self.ints
            .get(key)
            .copied()
            .ok_or_else(|| SysctlError::NotFound(key.to_string()))
    }
}
