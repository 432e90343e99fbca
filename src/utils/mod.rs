/// Macro to format an error message for the operator.
///
/// # Examples
/// ```rust
/// # use release_herald::format_error;
/// let msg = format_error!("Invalid value");
/// let msg = format_error!("Invalid value: {}", 42);
/// assert_eq!(msg, "[Error] Invalid value: 42");
/// ```
#[macro_export]
macro_rules! format_error {
    ($($arg:tt)*) => {
        format!("[Error] {}", format!($($arg)*))
    }
}

/// Macro to format an information message for the operator.
///
/// # Examples
/// ```rust
/// # use release_herald::format_msg;
/// let msg = format_msg!("Published {} applications", 2);
/// assert_eq!(msg, "-> Published 2 applications");
/// ```
#[macro_export]
macro_rules! format_msg {
    ($($arg:tt)*) => {
        format!("-> {}", format!($($arg)*))
    }
}

/// Declares a `mod` and uses it
#[macro_export]
macro_rules! using {
    ($($v:vis $p:ident),* $(,)?) => {
        $(
            mod $p;
            $v use self::$p::*;
        )*
    }
}

using! {
    pub html,
}
