pub mod arena;
pub mod db;
