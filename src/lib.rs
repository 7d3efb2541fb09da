//! CineCloud API: catalog discovery, favourites, VIP profiles and the admin
//! panel behind an axum HTTP surface.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;
