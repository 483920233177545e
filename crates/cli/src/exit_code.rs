//! Process exit codes
//!
//! Stable values scripts can branch on.

/// Exit status of an s3p invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// At least one object action failed, or an unclassified error
    GeneralError = 1,
    /// Bad arguments, malformed templates, shape mismatches
    UsageError = 2,
    NetworkError = 3,
    AuthError = 4,
    NotFound = 5,
    /// Stopped by Ctrl-C before every action ran
    Interrupted = 130,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            130 => Some(Self::Interrupted),
            _ => None,
        }
    }

    pub fn from_error(error: &s3p_core::Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_codes() {
        for code in [0, 1, 2, 3, 4, 5, 130] {
            assert_eq!(ExitCode::from_i32(code).unwrap().as_i32(), code);
        }
        assert_eq!(ExitCode::from_i32(42), None);
    }

    #[test]
    fn test_from_error() {
        let err = s3p_core::Error::AmbiguousDestination("x".into());
        assert_eq!(ExitCode::from_error(&err), ExitCode::UsageError);
        let err = s3p_core::Error::Auth("denied".into());
        assert_eq!(ExitCode::from_error(&err), ExitCode::AuthError);
        let err = s3p_core::Error::General("boom".into());
        assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
    }
}
