/// Creates an [Error](crate::Error) with a formatted message, capturing the
/// call stack.
///
/// ```
/// let err = errtrace::errorf!("hello {}", "world");
/// assert_eq!(err.to_string(), "hello world");
/// ```
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! errorf {
    ($($arg:tt)*) => {
        $crate::__private::errorf(::std::format!($($arg)*))
    };
}

/// Annotates an error with a formatted message and the current call stack.
///
/// ```
/// let err = errtrace::annotatef!(errtrace::new("root"), "attempt {}", 3);
/// assert_eq!(err.to_string(), "attempt 3");
/// ```
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! annotatef {
    ($err:expr, $($arg:tt)*) => {
        $crate::__private::annotatef($err, ::std::format!($($arg)*))
    };
}

/// Annotates an error with a formatted message, without capturing the call
/// stack.
///
/// ```
/// let err = errtrace::with_messagef!(errtrace::new("root"), "key {:?}", "k");
/// assert_eq!(format!("{err:+}").lines().take(2).collect::<Vec<_>>(), ["root", "key \"k\""]);
/// ```
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! with_messagef {
    ($err:expr, $($arg:tt)*) => {
        $crate::with_message($err, ::std::format!($($arg)*))
    };
}
