//! CLI module for hacluster

pub mod error;
pub mod output;

pub mod check;
pub mod init;
pub mod item;
pub mod schedule;
pub mod strategies;
