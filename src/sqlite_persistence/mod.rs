mod versioned_schema;

pub use versioned_schema::{
    prepare_database, Column, SqlType, Table, VersionedSchema, BASE_DB_VERSION, DEFAULT_TIMESTAMP,
};
