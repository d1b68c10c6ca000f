pub mod ast;
pub mod config;
pub mod data_model;
pub mod error;
pub mod evaluation;

pub use ast::*;
pub use config::Config;
pub use data_model::*;
pub use error::*;
pub use evaluation::*;
