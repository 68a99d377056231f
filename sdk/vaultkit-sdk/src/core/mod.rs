pub mod connection;
pub mod constants;
pub mod notify;
pub mod rpc;
pub mod signer;
