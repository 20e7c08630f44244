pub mod base;
pub mod command;
pub mod composite;
pub mod data;
pub mod factory;
pub mod grid;
pub mod visual;
