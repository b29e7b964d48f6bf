pub mod backend;
pub mod date;
pub mod filter;
pub mod logos;
pub mod prefs;
pub mod session;
pub mod store;

#[cfg(test)]
pub mod testutil;
