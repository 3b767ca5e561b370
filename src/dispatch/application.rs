//! The bootstrapper application as seen by the dispatcher.

use super::resolver::{Outcome, Resolution};
use crate::messages::application::{ApplicationCallbacks, Notification};

/// A bootstrapper application.
///
/// Implement the [`ApplicationCallbacks`] methods for the notifications you
/// care about. [`on_message`](Self::on_message) sees every notification
/// first and may take it over; [`override_outcome`](Self::override_outcome)
/// runs last, after whichever tier handled it.
pub trait BootstrapperApplication: ApplicationCallbacks + Send {
    /// Generic entry point, tried before the per-message callbacks.
    fn on_message(&mut self, notification: &mut Notification) -> Resolution {
        let _ = notification;
        Resolution::NotHandled
    }

    /// Inspect or replace the final outcome.
    fn override_outcome(&mut self, notification: &mut Notification, outcome: Outcome) -> Outcome {
        let _ = notification;
        outcome
    }
}

impl<T: BootstrapperApplication + ?Sized> BootstrapperApplication for Box<T> {
    fn on_message(&mut self, notification: &mut Notification) -> Resolution {
        (**self).on_message(notification)
    }

    fn override_outcome(&mut self, notification: &mut Notification, outcome: Outcome) -> Outcome {
        (**self).override_outcome(notification, outcome)
    }
}
