pub mod catalog;
pub mod config;
pub mod inspect;
pub mod records;
