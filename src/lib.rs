//! # bawire
//!
//! Inter-process protocol between an installer engine and its bootstrapper
//! application (BA).
//!
//! Two pipes connect the processes. On the first the BA calls engine
//! operations through an [`EngineProxy`]; on the second the engine sends
//! notifications that a [`Dispatcher`] hands to the BA's callbacks. Every
//! request carries a versioned args struct and a results skeleton, and every
//! request gets exactly one reply.
//!
//! ## Layers
//!
//! - [`codec`]: little-endian primitives, UTF-16 strings, versioned structs
//! - [`protocol`]: frame header, frame reassembly, request/reply payloads
//! - [`transport`] and [`channel`]: pipe endpoints and the framed channel
//! - [`messages`]: the engine operation and notification catalogues
//! - [`proxy`], [`dispatch`]: the BA side
//! - [`engine`]: the engine side
//! - [`retry`]: retry decisions for transient install failures
//!
//! ## Example
//!
//! ```no_run
//! use bawire::config::BawireConfig;
//! use bawire::dispatch::{BootstrapperApplication, Dispatcher};
//! use bawire::messages::application::{ApplicationCallbacks, PlanBeginArgs, PlanBeginResults};
//!
//! struct Ba;
//!
//! impl ApplicationCallbacks for Ba {
//!     fn on_plan_begin(
//!         &mut self,
//!         args: &PlanBeginArgs,
//!         results: &mut PlanBeginResults,
//!     ) -> bawire::Result<()> {
//!         results.cancel = args.package_count == 0;
//!         Ok(())
//!     }
//! }
//!
//! impl BootstrapperApplication for Ba {}
//!
//! #[tokio::main]
//! async fn main() -> bawire::Result<()> {
//!     let config = BawireConfig::from_json(r#"{ "pipe_path": "/tmp/engine.sock" }"#)?;
//!     let channel = config.connect().await?;
//!     Dispatcher::new(channel, Ba).run().await
//! }
//! ```

pub mod channel;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod host;
pub mod messages;
pub mod protocol;
pub mod proxy;
pub mod retry;
pub mod status;
pub mod transport;

#[doc(hidden)]
pub use bytes;

pub use channel::{ChannelConfig, PipeChannel};
pub use config::BawireConfig;
pub use dispatch::{BootstrapperApplication, Dispatcher};
pub use engine::{ApplicationProxy, EngineServer};
pub use error::{BawireError, Result};
pub use proxy::{BootstrapperEngine, EngineProxy};
pub use retry::RetryPolicy;
pub use status::Status;
