//! codebox: Rust client for the CodeBox remote code execution sandbox
//!
//! A [`SessionClient`] owns one remote session. Each method maps to one REST
//! call against the service; all sandboxing, package installation and
//! plotting happen server-side.
//!
//! # Example
//!
//! ```ignore
//! use codebox::{ClientConfig, SessionClient};
//!
//! #[tokio::main]
//! async fn main() -> codebox::Result<()> {
//!     let mut codebox = SessionClient::new(ClientConfig::from_env()?)?;
//!     codebox.start().await?;
//!
//!     codebox.upload("data.csv", "a,b\n1,2\n").await?;
//!     let files = codebox.list_files().await?;
//!     assert_eq!(files.files, vec!["data.csv"]);
//!
//!     let output = codebox.run("print(open('data.csv').read())").await?;
//!     println!("{}: {}", output.kind, output.content);
//!
//!     codebox.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every failure propagates as [`Error`]. Calling a session-scoped method
//! before [`SessionClient::start`] returns [`Error::NotStarted`] without any
//! network traffic; non-success responses return [`Error::Http`] carrying the
//! status and body.

pub mod client;
pub mod config;
pub mod error;
pub mod observer;

pub use client::SessionClient;
pub use codebox_protocol as protocol;
pub use codebox_protocol::{InstallResult, ListFilesResult, RestartResult, RunResult, StatusResponse, UploadResult};
pub use config::{ClientConfig, DEFAULT_BASE_URL, InstallShape, RequestShape, UploadShape};
pub use error::{Error, Result};
pub use observer::{NoopObserver, Operation, SessionObserver, TracingObserver};
