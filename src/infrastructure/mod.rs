pub mod cassette;
pub mod url_patterns;
