//! Console output icons.
//!
//! Keeps the status markers consistent across commands.

use console::{style, StyledObject};

/// Success checkmark icon (green ✓).
pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

/// Warning icon (yellow !).
pub fn warn() -> StyledObject<&'static str> {
    style("!").yellow()
}

/// Error icon (red ✗).
pub fn error() -> StyledObject<&'static str> {
    style("✗").red()
}

/// Dim arrow for secondary info.
pub fn dim_arrow() -> StyledObject<&'static str> {
    style("→").dim()
}

/// Marker for documents still waiting on inference.
pub fn pending() -> StyledObject<&'static str> {
    style("…").cyan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icons_render() {
        for icon in [success(), warn(), error(), dim_arrow(), pending()] {
            assert!(!icon.to_string().is_empty());
        }
    }
}
