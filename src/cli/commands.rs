pub mod import;
pub mod initdb;
pub mod migrate_and_serve;
pub mod serve;

pub use import::import_file;
pub use initdb::init_database;
pub use migrate_and_serve::migrate_and_serve;
pub use serve::serve;
