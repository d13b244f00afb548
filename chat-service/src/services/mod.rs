pub mod database;
pub mod providers;

pub use database::{ChatStore, InMemoryChatStore, MongoChatStore};
pub use providers::{ProviderError, TextProvider};
