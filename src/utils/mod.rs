//! Shared utility functions.
//!
//! - `format`: placeholders and date labels for display
//! - `image`: recognizing page image files

mod format;
mod image;

pub use format::{display_title, format_date, format_date_time, format_due, NOT_SET};
pub use image::{image_extension, is_supported_image};
