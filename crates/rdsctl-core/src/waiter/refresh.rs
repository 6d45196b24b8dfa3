//! Status probes for the waiter
//!
//! A probe is one read-only status check against the control plane. The
//! waiter only sees the [`Refresh`] trait, so the source of observations can
//! be a describe call, a closure in a test, or a push-fed channel.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use tokio::sync::watch;

/// Boxed error returned by a probe and surfaced untouched by the waiter
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Marker for types usable as a remote status
///
/// Implemented for every type with the required bounds, so `String`,
/// `&'static str` and the typed status enums in [`crate::status`] all work.
pub trait ResourceStatus:
    Clone + PartialEq + fmt::Display + fmt::Debug + Send + Sync + 'static
{
}

impl<S> ResourceStatus for S where
    S: Clone + PartialEq + fmt::Display + fmt::Debug + Send + Sync + 'static
{
}

/// A single observation of a remote object
#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T, S> {
    /// The object exists and reported `status`
    Found { object: T, status: S },
    /// The control plane does not know the object (yet, or anymore)
    NotFound,
}

impl<T, S> Probe<T, S> {
    pub fn found(object: T, status: S) -> Self {
        Probe::Found { object, status }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Probe::NotFound)
    }
}

/// Result of a single probe
pub type ProbeResult<T, S> = std::result::Result<Probe<T, S>, BoxError>;

/// Source of status observations consumed by [`super::StateChangeConf`]
///
/// Any `FnMut() -> impl Future<Output = ProbeResult<T, S>>` is a `Refresh`:
///
/// ```rust,ignore
/// let conf = StateChangeConf::new(
///     move || {
///         let client = client.clone();
///         async move { probe_cluster(&client, "db-1").await }
///     },
///     Duration::from_secs(600),
/// );
/// ```
#[async_trait]
pub trait Refresh: Send {
    /// Object returned once the wait succeeds
    type Object: Send;
    /// Status compared against the pending and target sets
    type Status: ResourceStatus;

    async fn refresh(&mut self) -> ProbeResult<Self::Object, Self::Status>;
}

#[async_trait]
impl<F, Fut, T, S> Refresh for F
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = ProbeResult<T, S>> + Send + 'static,
    T: Send + 'static,
    S: ResourceStatus,
{
    type Object = T;
    type Status = S;

    async fn refresh(&mut self) -> ProbeResult<T, S> {
        (self)().await
    }
}

/// Refresh fed by a `watch` channel instead of describe calls
///
/// The producer publishes observations as it learns about them (for example
/// from an event stream); each refresh reads the latest one. A closed channel
/// is reported as a probe error.
pub struct WatchRefresh<T, S> {
    rx: watch::Receiver<Probe<T, S>>,
}

impl<T, S> WatchRefresh<T, S> {
    pub fn new(rx: watch::Receiver<Probe<T, S>>) -> Self {
        Self { rx }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("status channel closed")]
pub struct ChannelClosed;

#[async_trait]
impl<T, S> Refresh for WatchRefresh<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: ResourceStatus,
{
    type Object = T;
    type Status = S;

    async fn refresh(&mut self) -> ProbeResult<T, S> {
        if self.rx.has_changed().is_err() {
            return Err(Box::new(ChannelClosed));
        }
        Ok(self.rx.borrow_and_update().clone())
    }
}
