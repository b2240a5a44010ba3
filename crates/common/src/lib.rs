//! Common utilities and shared types for yatube.
//!
//! This crate provides foundational components used across all yatube crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Pagination**: Limit/offset windows via [`LimitOffset`] and [`Page`]
//! - **Storage**: Media storage for post images
//!
//! # Example
//!
//! ```no_run
//! use yatube_common::{AppResult, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Listening on port {}", config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod pagination;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use pagination::{LimitOffset, Page, PageRequest};
pub use storage::{
    DecodedImage, LocalStorage, StorageBackend, StoredFile, decode_image_data_uri,
    post_image_key,
};
