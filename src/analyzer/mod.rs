pub mod crawler;
pub mod generator;
pub mod parser;
