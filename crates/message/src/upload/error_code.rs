use std::fmt;

use tracing::debug;

use crate::error::ArgumentError;

/// Outcome of a file upload as reported by the server that received it.
///
/// The numeric codes follow the usual upload error table; `5` is unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum UploadError {
    #[default]
    Ok = 0,
    IniSize = 1,
    FormSize = 2,
    Partial = 3,
    NoFile = 4,
    NoTmpDir = 6,
    CantWrite = 7,
    Extension = 8,
}

impl UploadError {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "the file uploaded successfully",
            Self::IniSize => "the file exceeds the server's maximum upload size",
            Self::FormSize => "the file exceeds the maximum size given by the form",
            Self::Partial => "the file was only partially uploaded",
            Self::NoFile => "no file was uploaded",
            Self::NoTmpDir => "the temporary folder is missing",
            Self::CantWrite => "the file could not be written to disk",
            Self::Extension => "an extension stopped the upload",
        }
    }
}

impl TryFrom<i64> for UploadError {
    type Error = ArgumentError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        let error = match code {
            0 => Self::Ok,
            1 => Self::IniSize,
            2 => Self::FormSize,
            3 => Self::Partial,
            4 => Self::NoFile,
            6 => Self::NoTmpDir,
            7 => Self::CantWrite,
            8 => Self::Extension,
            _ => {
                debug!(code, "rejected upload error code");
                return Err(ArgumentError::InvalidUploadError { code });
            }
        };

        Ok(error)
    }
}

impl TryFrom<i32> for UploadError {
    type Error = ArgumentError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(code))
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
