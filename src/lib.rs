pub mod config;
pub mod events;
pub mod fetch;
pub mod grid;
pub mod ics;
pub mod table;
