/// Saved audio responses - Gateway

mod store;

pub use store::{AudioFileInfo, AudioStore, StoredAudio};
