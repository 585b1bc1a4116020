pub mod domain;
pub mod error;
pub mod isbn;
pub mod protocol;
pub mod resource;
