pub mod catalog;
pub mod member;
pub mod share;
pub mod types;
