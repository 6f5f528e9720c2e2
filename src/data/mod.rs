mod import;
mod model_store;
mod storage;

pub use {
    import::read_close_csv,
    model_store::{BincodeModelStore, ModelStore, NullModelStore},
    storage::{SeriesStorage, SqliteStorage},
};
