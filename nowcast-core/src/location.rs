//! Location permission gate.
//!
//! A [`LocationGate`] turns one user action into one location request against
//! a [`LocationService`] and records how that request ended. Outcomes arrive
//! asynchronously over a channel owned by the gate and are applied with
//! `&mut self`, so readers see the state either before or after an outcome.
//!
//! When a new request is issued while an older one is still in flight, the
//! older request's outcome is dropped once it arrives.

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::model::Coordinates;

pub mod ip;

pub use ip::IpLocation;

/// Identifies one `activate` call. Ids increase monotonically per gate.
pub type RequestId = u64;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionError {
    #[error("Location access was denied")]
    Denied,

    #[error("Location is unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PermissionState {
    Unrequested,
    Requested,
    Granted(Coordinates),
    Denied(PermissionError),
}

impl PermissionState {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            PermissionState::Granted(c) => Some(*c),
            _ => None,
        }
    }
}

#[async_trait]
pub trait LocationService: Send + Sync + Debug {
    /// Ask the device (or whatever stands in for it) where we are.
    async fn request_location(&self) -> Result<Coordinates, PermissionError>;
}

/// Service that always answers with the same coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationService for FixedLocation {
    async fn request_location(&self) -> Result<Coordinates, PermissionError> {
        Ok(self.0)
    }
}

#[derive(Debug)]
pub struct LocationOutcome {
    pub request: RequestId,
    pub result: Result<Coordinates, PermissionError>,
}

#[derive(Debug)]
pub struct LocationGate {
    state: PermissionState,
    latest: RequestId,
    tx: mpsc::UnboundedSender<LocationOutcome>,
    rx: mpsc::UnboundedReceiver<LocationOutcome>,
}

impl Default for LocationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationGate {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { state: PermissionState::Unrequested, latest: 0, tx, rx }
    }

    pub fn state(&self) -> &PermissionState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == PermissionState::Requested
    }

    /// Issue a fresh location request and move to `Requested`.
    ///
    /// Must be called from within a tokio runtime; the lookup runs as a
    /// spawned task.
    pub fn activate(&mut self, service: Arc<dyn LocationService>) -> RequestId {
        self.latest += 1;
        let request = self.latest;
        self.state = PermissionState::Requested;
        tracing::debug!(request, ?service, "location requested");

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let lookup = tokio::spawn(async move { service.request_location().await });
            let result = match lookup.await {
                Ok(result) => result,
                Err(e) => Err(PermissionError::Unavailable(format!("location lookup aborted: {e}"))),
            };
            // The gate owns the receiver; a send error only means it was dropped.
            let _ = tx.send(LocationOutcome { request, result });
        });

        request
    }

    /// Apply an outcome. Returns `false` when it was ignored, either because
    /// a newer request superseded it or because the request already resolved.
    pub fn apply(&mut self, outcome: LocationOutcome) -> bool {
        if outcome.request != self.latest {
            tracing::debug!(
                request = outcome.request,
                latest = self.latest,
                "dropping outcome of superseded location request"
            );
            return false;
        }
        if !self.is_pending() {
            tracing::debug!(request = outcome.request, "location request already resolved");
            return false;
        }

        self.state = match outcome.result {
            Ok(coordinates) => {
                tracing::info!(%coordinates, "location granted");
                PermissionState::Granted(coordinates)
            }
            Err(e) => {
                tracing::warn!(error = %e, "location request failed");
                PermissionState::Denied(e)
            }
        };
        true
    }

    /// Wait until the latest request resolves and return the resulting state.
    /// Returns immediately when nothing is pending.
    pub async fn settle(&mut self) -> &PermissionState {
        while self.is_pending() {
            match self.rx.recv().await {
                Some(outcome) => {
                    self.apply(outcome);
                }
                // Unreachable while `self.tx` is alive.
                None => break,
            }
        }
        &self.state
    }
}
