use std::error::Error;
use std::fmt::{Debug, Display};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required request parameter was empty or missing. Nothing was sent.
    InvalidArgument,
    /// The HTTP client failed to deliver the request or read the response.
    TransportFailure,
    /// The response body could not be parsed into the requested type.
    InvalidResponse,
    /// Options, headers or urls could not be assembled.
    Configuration,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::TransportFailure => "TransportFailure",
            ErrorKind::InvalidResponse => "InvalidResponse",
            ErrorKind::Configuration => "Configuration",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct ExplatError {
    kind: ErrorKind,
    trace: String,
    message: String,
    underlying_error: Option<String>,
}

impl ExplatError {
    pub(crate) fn new(
        kind: ErrorKind,
        trace: String,
        message: String,
        underlying: Option<String>,
    ) -> Self {
        Self {
            kind,
            trace,
            message,
            underlying_error: underlying,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Type name of the error this one was converted from, if any.
    pub fn underlying_error(&self) -> Option<&str> {
        self.underlying_error.as_deref()
    }
}

impl Error for ExplatError {}

impl Display for ExplatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.underlying_error.as_deref() {
            Some(name) => write!(f, "[{}/{}] ({}): {}", self.kind, name, self.trace, self.message),
            None => write!(f, "[{}] ({}): {}", self.kind, self.trace, self.message),
        }
    }
}

impl Debug for ExplatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

macro_rules! this_errors {
    ($kind:path, $msg:literal, $val:expr) => {
        $val.map_err(|e| $crate::error!($kind, $msg, e))?
    };
}

macro_rules! error {
    ($kind:path, $msg:expr) => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let fun_name = &name[..name.len() - 3];
        $crate::errors::ExplatError::new($kind, fun_name.into(), ($msg).to_string(), None)
    }};
    ($kind:path, $msg:expr, $err:expr) => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let err = $err;
        let name = type_name_of(f);
        let error_type_name = type_name_of(&err);
        let fun_name = &name[..name.len() - 3];
        let error_name = error_type_name.split("::").last().map(|x| x.to_string());
        let final_msg = format!("{} - {}", $msg, err);
        $crate::errors::ExplatError::new($kind, fun_name.into(), final_msg, error_name)
    }};
}

pub(crate) use error;
pub(crate) use this_errors;
