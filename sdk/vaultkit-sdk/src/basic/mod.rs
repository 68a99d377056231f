pub mod actions;
pub mod cache;
pub mod reader;
pub mod wallet;
pub mod watch;
