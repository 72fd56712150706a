//! Infrastructure layer: persistence gateway adapters and the domain
//! services that orchestrate policy, rules and storage.

pub mod services;
pub mod store;

pub use services::{ProductService, ServiceError, UserService};
pub use store::{EntityStore, InMemoryStore, RecordingStore, StoreCall, StoreError};
