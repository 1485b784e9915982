//! Infrastructure layer: storage backends, token verification and the
//! payment gateway

pub mod crypto;
pub mod database;
pub mod payment;
pub mod storage;

pub use database::{
    init_database, open_repositories, DatabaseConfig, SeaOrmRepositoryProvider,
};
pub use payment::SimulatedGateway;
pub use storage::InMemoryRepositoryProvider;
