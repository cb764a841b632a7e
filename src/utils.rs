//! # Utility Functions Module
//!
//! This module provides utility functions that improve code readability
//! and reduce boilerplate across the application.

/// Converts a vector of string-like items to Vec<String>.
///
/// This utility function accepts any iterable of items that can be converted
/// to String, eliminating repetitive `.to_string()` calls when building
/// encoder command lines.
///
/// # Generic Parameters
/// - `T`: Any type that implements `ToString`
/// - `I`: Any type that can be converted to an iterator over `T`
///
/// # Arguments
/// - `items`: An iterable of string-like items to convert
///
/// # Returns
/// - `Vec<String>`: A vector of owned strings
///
/// # Example
/// ```rust
/// use image_optimizer::utils::to_string_vec;
///
/// // Instead of:
/// let args = vec![
///     "-quality".to_string(),
///     "80".to_string(),
///     "-progressive".to_string(),
/// ];
///
/// // You can write:
/// let args = to_string_vec(["-quality", "80", "-progressive"]);
///
/// // Also works with computed values:
/// let quality = 80;
/// let args = to_string_vec(["-quality", &quality.to_string(), "-progressive"]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Macro for even more convenient argument building.
///
/// This macro provides a convenient way to build argument vectors
/// without needing to import the function.
///
/// # Example
/// ```rust
/// use image_optimizer::args;
///
/// let quality = 80;
/// let args = args!["-quality", &quality.to_string(), "-progressive"];
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec([$($item),*])
    };
}
