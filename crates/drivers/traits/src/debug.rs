//! Debug macros for driver subsystems
//!
//! These macros compile to nothing when debug features are disabled.

/// Debug print for the network subsystem
#[macro_export]
#[cfg(feature = "debug-network")]
macro_rules! debug_network {
    ($($arg:tt)*) => {
        $crate::_debug_print("[NET] ", format_args!($($arg)*))
    };
}

#[macro_export]
#[cfg(not(feature = "debug-network"))]
macro_rules! debug_network {
    ($($arg:tt)*) => {};
}

/// Debug print for bus probing
#[macro_export]
#[cfg(feature = "debug-bus")]
macro_rules! debug_bus {
    ($($arg:tt)*) => {
        $crate::_debug_print("[BUS] ", format_args!($($arg)*))
    };
}

#[macro_export]
#[cfg(not(feature = "debug-bus"))]
macro_rules! debug_bus {
    ($($arg:tt)*) => {};
}

/// Debug output function - can be replaced with actual serial output
#[doc(hidden)]
#[cfg(any(feature = "debug-network", feature = "debug-bus"))]
pub fn _debug_print(_prefix: &str, _args: core::fmt::Arguments) {
    // Hook for host-side serial output
}
