pub mod ask;
pub mod emails;
pub mod health;
