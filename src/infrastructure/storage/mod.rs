mod bunny_store;
mod local_store;
mod store_factory;

pub use bunny_store::BunnyMediaStore;
pub use local_store::LocalMediaStore;
pub use store_factory::MediaStoreFactory;
