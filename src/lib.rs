pub mod config;
pub mod domain;
pub mod ensembl;
pub mod error;
pub mod output;
pub mod resolver;
