//! Ordered resolution of a notification to an outcome.
//!
//! The default chain is:
//!
//! 1. [`GenericTier`]: [`BootstrapperApplication::on_message`]
//! 2. any resolvers added with [`ResolverChain::insert`]
//! 3. [`DefaultTier`]: the per-message [`ApplicationCallbacks`] method
//!
//! followed by the override hook, which always runs.
//!
//! [`ApplicationCallbacks`]: crate::messages::application::ApplicationCallbacks

use super::application::BootstrapperApplication;
use crate::error::{BawireError, Result};
use crate::messages::application::Notification;

/// Result of handling one notification.
pub type Outcome = Result<()>;

/// What a resolver did with a notification.
#[derive(Debug)]
pub enum Resolution {
    Handled(Outcome),
    NotHandled,
}

impl Resolution {
    /// `Handled(Err(NotImplemented))` counts as not handled.
    fn into_outcome(self) -> Option<Outcome> {
        match self {
            Resolution::Handled(Err(e)) if e.is_not_implemented() => None,
            Resolution::Handled(outcome) => Some(outcome),
            Resolution::NotHandled => None,
        }
    }
}

/// One tier of the chain.
pub trait Resolver<A: ?Sized>: Send {
    fn resolve(&mut self, app: &mut A, notification: &mut Notification) -> Resolution;
}

impl<A: ?Sized, F> Resolver<A> for F
where
    F: FnMut(&mut A, &mut Notification) -> Resolution + Send,
{
    fn resolve(&mut self, app: &mut A, notification: &mut Notification) -> Resolution {
        self(app, notification)
    }
}

/// Runs after the chain; may replace the outcome or edit the results.
pub trait OverrideHook<A: ?Sized>: Send {
    fn apply(&mut self, app: &mut A, notification: &mut Notification, outcome: Outcome)
        -> Outcome;
}

impl<A: ?Sized, F> OverrideHook<A> for F
where
    F: FnMut(&mut A, &mut Notification, Outcome) -> Outcome + Send,
{
    fn apply(
        &mut self,
        app: &mut A,
        notification: &mut Notification,
        outcome: Outcome,
    ) -> Outcome {
        self(app, notification, outcome)
    }
}

/// Tier 1: the application's generic entry point.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericTier;

impl<A: BootstrapperApplication + ?Sized> Resolver<A> for GenericTier {
    fn resolve(&mut self, app: &mut A, notification: &mut Notification) -> Resolution {
        app.on_message(notification)
    }
}

/// Last tier: the per-message callback. Always handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTier;

impl<A: BootstrapperApplication + ?Sized> Resolver<A> for DefaultTier {
    fn resolve(&mut self, app: &mut A, notification: &mut Notification) -> Resolution {
        Resolution::Handled(notification.deliver(app))
    }
}

/// Default hook: [`BootstrapperApplication::override_outcome`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ApplicationOverride;

impl<A: BootstrapperApplication + ?Sized> OverrideHook<A> for ApplicationOverride {
    fn apply(
        &mut self,
        app: &mut A,
        notification: &mut Notification,
        outcome: Outcome,
    ) -> Outcome {
        app.override_outcome(notification, outcome)
    }
}

/// Ordered resolvers plus the override hook.
pub struct ResolverChain<A: ?Sized> {
    resolvers: Vec<Box<dyn Resolver<A>>>,
    hook: Box<dyn OverrideHook<A>>,
}

impl<A: BootstrapperApplication + ?Sized> ResolverChain<A> {
    /// Generic tier, then default tier, then the application's override.
    pub fn new() -> Self {
        Self {
            resolvers: vec![Box::new(GenericTier), Box::new(DefaultTier)],
            hook: Box::new(ApplicationOverride),
        }
    }
}

impl<A: BootstrapperApplication + ?Sized> Default for ResolverChain<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> ResolverChain<A> {
    /// Add a resolver just ahead of the last tier.
    pub fn insert<R: Resolver<A> + 'static>(&mut self, resolver: R) {
        let at = self.resolvers.len().saturating_sub(1);
        self.resolvers.insert(at, Box::new(resolver));
    }

    /// Replace the override hook.
    pub fn set_override<H: OverrideHook<A> + 'static>(&mut self, hook: H) {
        self.hook = Box::new(hook);
    }

    /// Number of resolver tiers, hook excluded.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Walk the tiers until one handles the notification, then run the hook.
    ///
    /// If no tier handles it the outcome is [`BawireError::NotImplemented`].
    pub fn resolve(&mut self, app: &mut A, notification: &mut Notification) -> Outcome {
        let mut outcome = Err(BawireError::NotImplemented);

        for resolver in &mut self.resolvers {
            if let Some(handled) = resolver.resolve(app, notification).into_outcome() {
                outcome = handled;
                break;
            }
        }

        self.hook.apply(app, notification, outcome)
    }
}
