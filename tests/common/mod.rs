//! Shared test support

pub mod fixtures;
pub mod mock_transport;
pub mod mock_uploader;

pub use fixtures::*;
pub use mock_transport::MockStoreService;
pub use mock_uploader::MockUploader;
