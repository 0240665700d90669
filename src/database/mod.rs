pub mod connection;
pub mod models;
pub mod notifications;
pub mod ratings;
pub mod setup;
pub mod subjects;

pub use connection::{create_pool, database_path, get_connection, DbConn, DbPool};
pub use models::*;
