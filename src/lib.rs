pub mod error;
pub mod meta;
pub mod options;
pub mod statistics;
#[cfg(test)]
pub mod testing;
