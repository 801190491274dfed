pub mod connection;
pub mod entity;
pub mod repository;

pub use connection::establish_connection;

#[cfg(test)]
pub(crate) async fn memory_db() -> sea_orm::DatabaseConnection {
    establish_connection("sqlite::memory:", 1)
        .await
        .expect("in-memory sqlite")
}
