pub mod cache;
pub mod filter;
pub mod post;
pub mod remote;
pub mod store;
