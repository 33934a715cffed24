pub mod time_fmt;
pub mod unicode;
