pub mod filesystem_blob_store;
pub mod hashmap_attachment_store;
pub mod hashmap_user_store;
pub mod postgres_attachment_store;
pub mod postgres_user_store;

pub use filesystem_blob_store::FilesystemBlobStore;
pub use hashmap_attachment_store::HashMapAttachmentRecordStore;
pub use hashmap_user_store::HashMapUserStore;
pub use postgres_attachment_store::PostgresAttachmentRecordStore;
pub use postgres_user_store::PostgresUserStore;
