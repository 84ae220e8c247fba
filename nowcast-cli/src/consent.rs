use async_trait::async_trait;
use inquire::{Confirm, InquireError};

use nowcast_core::{Coordinates, LocationService, PermissionError};

const PERMISSION_PROMPT: &str =
    "Allow nowcast to use your approximate location (looked up from your IP address)?";

/// Asks the user for permission before delegating to the wrapped service,
/// the terminal stand-in for the OS location permission dialog.
#[derive(Debug)]
pub struct ConsentingLocation<S> {
    inner: S,
    pre_approved: bool,
}

impl<S: LocationService> ConsentingLocation<S> {
    pub fn new(inner: S, pre_approved: bool) -> Self {
        Self { inner, pre_approved }
    }
}

#[async_trait]
impl<S: LocationService> LocationService for ConsentingLocation<S> {
    async fn request_location(&self) -> Result<Coordinates, PermissionError> {
        if !self.pre_approved {
            let allowed = tokio::task::spawn_blocking(ask_permission)
                .await
                .map_err(|e| PermissionError::Unavailable(format!("permission prompt failed: {e}")))??;
            if !allowed {
                return Err(PermissionError::Denied);
            }
        }

        self.inner.request_location().await
    }
}

fn ask_permission() -> Result<bool, PermissionError> {
    match Confirm::new(PERMISSION_PROMPT).with_default(false).prompt() {
        Ok(allowed) => Ok(allowed),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
        Err(e) => Err(PermissionError::Unavailable(format!(
            "could not ask for location permission: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nowcast_core::FixedLocation;

    #[tokio::test]
    async fn pre_approved_skips_the_prompt() {
        let here = Coordinates::new(35.76, -5.83);
        let service = ConsentingLocation::new(FixedLocation(here), true);

        assert_eq!(service.request_location().await, Ok(here));
    }
}
