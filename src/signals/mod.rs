pub mod form;
pub mod fusion;
pub mod odds;
