//! Logging macros
//!
//! Forwards to `defmt` or `log` depending on the enabled feature. With
//! neither enabled the macros still type-check their arguments and then
//! compile to nothing. Format strings stick to `{}` and `{:?}` so they
//! are valid for both backends.

#![allow(unused_macros, unused_imports)]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        pub(crate) use defmt::{debug, error, info, trace, warn};
    } else if #[cfg(feature = "log")] {
        pub(crate) use log::{debug, error, info, trace, warn};
    } else {
        // Named apart from the built-in `warn` lint attribute
        macro_rules! silent_trace {
            ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
        }
        macro_rules! silent_debug {
            ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
        }
        macro_rules! silent_info {
            ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
        }
        macro_rules! silent_warn {
            ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
        }
        macro_rules! silent_error {
            ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
        }
        pub(crate) use silent_debug as debug;
        pub(crate) use silent_error as error;
        pub(crate) use silent_info as info;
        pub(crate) use silent_trace as trace;
        pub(crate) use silent_warn as warn;
    }
}
