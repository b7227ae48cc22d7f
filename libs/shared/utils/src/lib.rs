pub mod jwt;
pub mod extractor;
pub mod test_utils;
