pub mod api;
pub mod batch;
pub mod check;
pub mod config;
pub mod listing;
pub mod redirects;

#[cfg(test)]
pub(crate) mod testing;
