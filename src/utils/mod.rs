// Utility helpers

pub mod file;
pub mod html;

pub use file::FileUtils;
pub use html::escape_html;
