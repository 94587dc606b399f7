//! Confluence integration for Metro.
//!
//! - [`ConfluenceClient`]: REST API client with basic authentication
//! - [`Publisher`]: applies a [`Manifest`](metro_manifest::Manifest) to any [`Wiki`]
//!
//! ```ignore
//! use std::time::Duration;
//! use metro_confluence::{ConfluenceClient, Wiki};
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     "user",
//!     "secret",
//!     Duration::from_secs(30),
//! );
//!
//! let page = client.info(123)?;
//! println!("Page title: {}", page.title);
//! ```

// API client
mod client;
pub use client::ConfluenceClient;

// Remote page store seam
mod wiki;
pub use wiki::Wiki;

#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCalls, MockPage, MockWiki};

// Manifest publisher
pub mod publisher;
pub use publisher::{Outcome, PublishOptions, PublishReport, Publisher};

pub mod types;

// Errors
pub mod error;
pub use error::{ConfluenceError, PublishError};
