//! A high-performance PostgreSQL client library.
//!
//! # Features
//!
//! - **Zero-copy parsing**: Message payloads are parsed directly from the read buffer
//! - **Sans-I/O state machines**: Protocol logic is separated from I/O
//! - **Tokio-based async API**: a single connection drives one operation at a time
//! - **Full protocol support**: simple query, extended query, COPY IN/OUT, cancellation
//!
//! # Example
//!
//! ```no_run
//! use zero_postgres::tokio::Conn;
//! use zero_postgres::Opts;
//!
//! # #[tokio::main]
//! # async fn main() -> zero_postgres::Result<()> {
//!     let opts = Opts {
//!         host: "localhost".into(),
//!         user: "postgres".into(),
//!         database: Some("mydb".into()),
//!         password: Some("secret".into()),
//!         ..Default::default()
//!     };
//!
//!     let mut conn = Conn::new(opts).await?;
//!
//!     let rows: Vec<(i32,)> = conn.query_collect("SELECT 1 AS num").await?;
//!     println!("Rows: {:?}", rows);
//!
//!     conn.close().await?;
//!     Ok(())
//! # }
//! ```

// private
mod buffer_pool;
mod buffer_set;
mod error;
mod opts;
mod settings;
mod statement;

// pub
pub mod conversion;
pub mod handler;
pub mod protocol;
pub mod state;

#[cfg(feature = "tokio")]
pub mod tokio;

pub use buffer_pool::BufferPool;
pub use buffer_set::BufferSet;
pub use error::{Error, Result, ServerError};
pub use handler::AsyncMessageHandler;
pub use opts::{Opts, SslMode};
pub use settings::{Encoding, SettingsRegistry};
pub use state::action::AsyncMessage;
pub use state::extended::PreparedStatement;
pub use statement::IntoStatement;
