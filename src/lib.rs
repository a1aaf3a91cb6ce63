pub mod archive;
pub mod config;
pub mod doctor;
pub mod host;
pub mod menu;
pub mod region;
pub mod router;
pub mod tmdb;
