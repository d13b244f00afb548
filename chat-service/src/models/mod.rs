//! Domain models for the chat service.

pub mod chat_record;

pub use chat_record::ChatRecord;
