pub mod config;
pub mod dispatcher;
pub mod formatter;
pub mod gateway;
pub mod query_input;
pub mod session;
pub mod statement;
