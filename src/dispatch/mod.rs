//! BA-side message dispatch.
//!
//! - [`SchemaRegistry`]: decode functions by message type
//! - [`ResolverChain`]: which handler answers a notification
//! - [`Dispatcher`]: the receive loop that ties them to a channel

mod application;
mod pump;
mod registry;
mod resolver;

pub use application::BootstrapperApplication;
pub use pump::Dispatcher;
pub use registry::SchemaRegistry;
pub use resolver::{
    ApplicationOverride, DefaultTier, GenericTier, OverrideHook, Outcome, Resolution, Resolver,
    ResolverChain,
};

pub(crate) use pump::serve;
