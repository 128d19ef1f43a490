pub mod client;
pub mod health;
pub mod index;
pub mod script;
pub mod stats;
pub mod track;
