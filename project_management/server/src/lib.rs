pub mod config;
pub mod db;
pub mod entities;
pub mod nullable;
pub mod project;
pub mod task;
pub mod user;
pub mod web;

#[cfg(test)]
mod test_support;
