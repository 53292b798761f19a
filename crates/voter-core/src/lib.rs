pub mod cancel;
pub mod config;
pub mod context;
pub mod encoding;
pub mod extension;
pub mod fetch;
pub mod logging;
pub mod pattern;
pub mod request;
pub mod retry;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;
