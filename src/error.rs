//! Setup-time errors.
//!
//! Cache maintenance itself never fails; these only come out of registration,
//! firmware parsing and driver probe.

use alloc::string::String;
use core::fmt::{Debug, Display, Formatter, Result};

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
/// POSIX errno
pub enum DmaErrorNum {
    EIO = 5,     // Firmware reported a failure.
    EBUSY = 16,  // Hardware already bound elsewhere.
    EEXIST = 17, // Cache operations already registered.
    ENODEV = 19, // Node or extension missing.
    EINVAL = 22, // Bad size, granularity or window.
}

pub struct DmaError {
    pub num: DmaErrorNum,
    pub loc_line: u32,
    pub loc_col: u32,
    pub loc_file: &'static str,
    pub msg: Option<String>,
}

pub type DmaResult<T = ()> = core::result::Result<T, DmaError>;

impl DmaErrorNum {
    pub fn as_str(&self) -> &'static str {
        use DmaErrorNum::*;
        match *self {
            EIO => "I/O error",
            EBUSY => "Device or resource busy",
            EEXIST => "File exists",
            ENODEV => "No such device",
            EINVAL => "Invalid argument",
        }
    }
}

impl DmaError {
    pub fn new(
        num: DmaErrorNum,
        loc_file: &'static str,
        loc_line: u32,
        loc_col: u32,
        msg: Option<String>,
    ) -> Self {
        Self {
            num,
            loc_file,
            loc_line,
            loc_col,
            msg,
        }
    }

    /// Negative errno, as a probe routine would return it.
    pub fn code(&self) -> isize {
        -(self.num as usize as isize)
    }
}

impl Display for DmaError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self.msg {
            Some(ref msg) => write!(f, "{}: {}", self.num.as_str(), msg),
            None => f.write_str(self.num.as_str()),
        }
    }
}

impl Debug for DmaError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "[{}:{}:{}] {}", self.loc_file, self.loc_line, self.loc_col, self)
    }
}

/// Build a [`DmaError`] carrying the caller's source location.
#[macro_export]
macro_rules! dma_err {
    ($num: ident) => {{
        use $crate::error::{DmaError, DmaErrorNum::*};
        DmaError::new($num, file!(), line!(), column!(), None)
    }};
    ($num: ident, $msg: expr) => {{
        use $crate::error::{DmaError, DmaErrorNum::*};
        DmaError::new($num, file!(), line!(), column!(), Some($msg.into()))
    }};
}

/// `Err(dma_err!(..))`
#[macro_export]
macro_rules! dma_result_err {
    ($num: ident) => {
        Err($crate::dma_err!($num))
    };
    ($num: ident, $msg: expr) => {
        Err($crate::dma_err!($num, $msg))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn fails() -> DmaResult<u32> {
        dma_result_err!(EEXIST, "second registration")
    }

    #[test]
    fn error_carries_errno_and_message() {
        let err = fails().unwrap_err();
        assert_eq!(err.num, DmaErrorNum::EEXIST);
        assert_eq!(err.code(), -17);
        assert_eq!(err.to_string(), "File exists: second registration");
        assert!(err.loc_file.ends_with("error.rs"));
        assert_eq!(dma_err!(ENODEV).to_string(), "No such device");
    }
}
