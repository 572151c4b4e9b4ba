pub mod checksum;
pub mod store;

pub use store::{BackupError, BackupKind, BackupRecord, BackupStore, verify_snapshot};
