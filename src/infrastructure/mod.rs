pub mod audio;
pub mod cleanup;
pub mod encoding;
pub mod observability;
pub mod storage;
