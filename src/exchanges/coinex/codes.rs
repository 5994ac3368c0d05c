use std::fmt;

/// Error codes carried in the `error.code` field of stream replies.
///
/// The futures and spot endpoints use disjoint code ranges (futures:
/// 1001-1014 and 3008, spot: 1-7), so one table covers both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamErrorCode {
    InvalidArgument,
    InternalError,
    ServiceUnavailable,
    MethodNotFound,
    ServiceTimeout,
    RequireAuth,
    TooQuick,
    DirectResultNull,
    AuthorizationFailed,
    AccessIdNotExists,
    TimeCheckError,
    UserForbidden,
    IpNotAllowed,
    ServiceTooBusy,
}

impl StreamErrorCode {
    pub fn from_code(code: i64) -> Option<Self> {
        let code = match code {
            1 | 1001 => Self::InvalidArgument,
            2 | 1006 => Self::InternalError,
            3 | 1002 => Self::ServiceUnavailable,
            4 | 1004 => Self::MethodNotFound,
            5 | 1003 => Self::ServiceTimeout,
            6 | 1005 => Self::RequireAuth,
            7 | 1014 => Self::TooQuick,
            1007 => Self::DirectResultNull,
            1009 => Self::AuthorizationFailed,
            1010 => Self::AccessIdNotExists,
            1011 => Self::TimeCheckError,
            1012 => Self::UserForbidden,
            1013 => Self::IpNotAllowed,
            3008 => Self::ServiceTooBusy,
            _ => return None,
        };
        Some(code)
    }

    /// Short message as sent by the server
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid argument",
            Self::InternalError => "internal error",
            Self::ServiceUnavailable => "service unavailable",
            Self::MethodNotFound => "method not found",
            Self::ServiceTimeout => "service timeout",
            Self::RequireAuth => "require auth",
            Self::TooQuick => "too quick",
            Self::DirectResultNull => "direct result null",
            Self::AuthorizationFailed => "authorization fail",
            Self::AccessIdNotExists => "access_id not exists",
            Self::TimeCheckError => "time check error",
            Self::UserForbidden => "user is forbidden",
            Self::IpNotAllowed => "ip not allow visit",
            Self::ServiceTooBusy => "service too busy",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidArgument => "Invalid argument",
            Self::InternalError => "Internal error",
            Self::ServiceUnavailable => "Service unavailable",
            Self::MethodNotFound => "No such method",
            Self::ServiceTimeout => "Service timeout",
            Self::RequireAuth => "Authorization required",
            Self::TooQuick => "Visit too frequent",
            Self::DirectResultNull => "No market found",
            Self::AuthorizationFailed => "Authorization failed",
            Self::AccessIdNotExists => "AccessId does not exist",
            Self::TimeCheckError => "Time check error",
            Self::UserForbidden => "User prohibited",
            Self::IpNotAllowed => "IP access prohibited",
            Self::ServiceTooBusy => "Service is busy",
        }
    }

    /// Codes meaning the credentials (or their absence) caused the failure
    pub const fn is_authorization(self) -> bool {
        matches!(
            self,
            Self::RequireAuth
                | Self::AuthorizationFailed
                | Self::AccessIdNotExists
                | Self::TimeCheckError
                | Self::UserForbidden
                | Self::IpNotAllowed
        )
    }
}

impl fmt::Display for StreamErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
