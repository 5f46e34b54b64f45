//! Logging macros using Code types with Display context values
//!
//! Context pairs are written `"key" => value`; any `Display` value works.

/// Log error with Code type
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, ::std::convert::AsRef::<str>::as_ref(&$message), ::std::vec::Vec::new())
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: ::std::vec::Vec<(&str, ::std::string::String)> =
            vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_error_with_context($code, ::std::convert::AsRef::<str>::as_ref(&$message), context)
    }};
}

/// Log warning with Code type
#[macro_export]
macro_rules! log_warning {
    ($code:expr, $message:expr) => {
        $crate::logging::log_warning_with_context($code, ::std::convert::AsRef::<str>::as_ref(&$message), ::std::vec::Vec::new())
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: ::std::vec::Vec<(&str, ::std::string::String)> =
            vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_warning_with_context($code, ::std::convert::AsRef::<str>::as_ref(&$message), context)
    }};
}

/// Log success with Code type
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, ::std::convert::AsRef::<str>::as_ref(&$message), ::std::vec::Vec::new())
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: ::std::vec::Vec<(&str, ::std::string::String)> =
            vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_success_with_context($code, ::std::convert::AsRef::<str>::as_ref(&$message), context)
    }};
}

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context(::std::convert::AsRef::<str>::as_ref(&$message), ::std::vec::Vec::new())
    };

    ($message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: ::std::vec::Vec<(&str, ::std::string::String)> =
            vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_info_with_context(::std::convert::AsRef::<str>::as_ref(&$message), context)
    }};
}

/// Log debug message with Code type
#[macro_export]
macro_rules! log_debug {
    ($code:expr, $message:expr) => {
        $crate::logging::log_debug_with_context($code, ::std::convert::AsRef::<str>::as_ref(&$message), ::std::vec::Vec::new())
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+ $(,)?) => {{
        let context: ::std::vec::Vec<(&str, ::std::string::String)> =
            vec![$(($key, format!("{}", $value))),+];
        $crate::logging::log_debug_with_context($code, ::std::convert::AsRef::<str>::as_ref(&$message), context)
    }};
}
