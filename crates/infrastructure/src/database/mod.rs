mod rows;
pub mod schema;
mod sqlite_gateway;

pub use sqlite_gateway::SqliteSessionGateway;
