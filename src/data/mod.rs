pub mod cache;
pub mod highlight;
pub mod catalog;
pub mod repository;
pub mod search;
pub mod tags;
