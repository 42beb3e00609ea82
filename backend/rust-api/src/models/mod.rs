pub mod chat;
pub mod completion;
pub mod quiz;
