pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod listing;
pub mod models;
pub mod nav;
pub mod pagination;
pub mod recommend;
pub mod search;
pub mod session;
pub mod views;
