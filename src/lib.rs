pub mod api;
pub mod config;
pub mod domain;
pub mod editor;
pub mod error;
pub mod features;
pub mod parser;
pub mod repository;
pub mod services;
pub mod session;
pub mod storage;

#[cfg(test)]
mod tests;
