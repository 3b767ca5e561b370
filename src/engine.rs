//! Engine-side ends of the two pipes.
//!
//! [`EngineServer`] answers the requests an [`EngineProxy`] sends, handing each
//! one to an [`EngineCallbacks`] implementation. [`ApplicationProxy`] sends
//! notifications to the BA and reads back the results it filled in.
//!
//! [`EngineProxy`]: crate::proxy::EngineProxy

use tokio::io::{AsyncRead, AsyncWrite};

use crate::channel::PipeChannel;
use crate::codec::WireStruct;
use crate::dispatch::{serve, SchemaRegistry};
use crate::error::{BawireError, Result};
use crate::messages::engine::{EngineCallbacks, EngineRequest};
use crate::messages::Exchange;
use crate::protocol::{decode_reply, encode_request};

/// Store `value` into a string result slot.
///
/// On entry `cch` holds the caller's capacity in UTF-16 units, terminator
/// included. If the value fits, `cch` becomes its length; otherwise `cch`
/// becomes the required size and the call fails with more-data.
///
/// ```
/// use bawire::engine::fill_string;
/// use bawire::error::BawireError;
///
/// let (mut cch, mut slot) = (3, None);
/// let err = fill_string(&mut cch, &mut slot, "abc").unwrap_err();
/// assert!(matches!(err, BawireError::MoreData { required: 4 }));
/// assert_eq!(cch, 4);
///
/// let (mut cch, mut slot) = (4, None);
/// fill_string(&mut cch, &mut slot, "abc").unwrap();
/// assert_eq!((cch, slot.as_deref()), (3, Some("abc")));
/// ```
pub fn fill_string(cch: &mut u32, slot: &mut Option<String>, value: &str) -> Result<()> {
    let len = value.encode_utf16().count() as u32;

    if len == 0 {
        *cch = 0;
        *slot = Some(String::new());
        return Ok(());
    }

    let required = len + 1;
    if *cch < required {
        *cch = required;
        return Err(BawireError::MoreData { required });
    }

    *cch = len;
    *slot = Some(value.to_string());
    Ok(())
}

/// Serves engine operations for one BA connection.
pub struct EngineServer<S, E> {
    channel: PipeChannel<S>,
    callbacks: E,
    registry: SchemaRegistry<EngineRequest>,
}

impl<S, E> EngineServer<S, E>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    E: EngineCallbacks + Send,
{
    pub fn new(channel: PipeChannel<S>, callbacks: E) -> Self {
        Self {
            channel,
            callbacks,
            registry: SchemaRegistry::new(),
        }
    }

    pub fn callbacks(&self) -> &E {
        &self.callbacks
    }

    pub fn callbacks_mut(&mut self) -> &mut E {
        &mut self.callbacks
    }

    /// Answer requests until the BA closes its end.
    pub async fn run(&mut self) -> Result<()> {
        let Self {
            channel,
            callbacks,
            registry,
        } = self;

        tracing::debug!("engine server started");
        serve(channel, registry, |request: &mut EngineRequest| {
            request.deliver(callbacks)
        })
        .await
    }

    pub fn into_parts(self) -> (PipeChannel<S>, E) {
        (self.channel, self.callbacks)
    }
}

/// Sends notifications to the BA.
pub struct ApplicationProxy<S> {
    channel: PipeChannel<S>,
}

impl<S> ApplicationProxy<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(channel: PipeChannel<S>) -> Self {
        Self { channel }
    }

    /// Send one notification and return the BA's results.
    ///
    /// `results` is the skeleton: the values the BA sees before its handler
    /// runs, and gets back unchanged when it does not handle the message.
    pub async fn notify<M: Exchange>(
        &mut self,
        args: M::Args,
        results: M::Results,
    ) -> Result<M::Results> {
        let payload = encode_request(&args.encode(), &results.encode());
        let reply = self.channel.call(M::MESSAGE_TYPE, &payload).await?;

        let (status, results) = decode_reply(&reply)?;
        if status.is_failure() {
            tracing::debug!(notification = M::NAME, %status, "application returned failure");
            return Err(BawireError::from_status(status, 0));
        }

        if results.is_empty() {
            Ok(M::Results::default())
        } else {
            M::Results::decode(results)
        }
    }

    /// Close the notification pipe; the BA's pump exits cleanly.
    pub async fn close(&mut self) {
        self.channel.close().await;
    }

    pub fn into_channel(self) -> PipeChannel<S> {
        self.channel
    }
}
