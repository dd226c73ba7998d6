//! Move injection into the host's input surface.

use tracing::{debug, warn};

use movesync_protocols::{HostDocument, HostError};

use crate::error::InjectError;

/// Writes a recommended move into the move input and confirms it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveInjector;

impl MoveInjector {
    pub fn new() -> Self {
        Self
    }

    /// Locate the input, set its value and dispatch the confirm trigger.
    ///
    /// An absent input is [`InjectError::InputNotFound`]; retrying cannot
    /// make it appear.
    pub async fn inject(&self, host: &dyn HostDocument, mv: &str) -> Result<(), InjectError> {
        let input = host
            .find_move_input()
            .await?
            .ok_or(InjectError::InputNotFound)?;

        let injected = async {
            host.set_input_value(&input, mv).await?;
            host.dispatch_confirm(&input).await
        }
        .await;

        if let Err(e) = host.release_element(&input).await {
            warn!("Failed to release move input: {}", e);
        }
        injected.map_err(not_found_as_missing)?;

        debug!("Injected move {}", mv);
        Ok(())
    }
}

/// The input can vanish between lookup and use.
fn not_found_as_missing(e: HostError) -> InjectError {
    if e.is_not_found() {
        InjectError::InputNotFound
    } else {
        InjectError::Host(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeHost;
    use movesync_protocols::ElementHandle;

    #[tokio::test]
    async fn test_inject_sets_value_and_confirms() {
        let host = FakeHost::new(vec![]);
        MoveInjector::new().inject(&host, "e2e4").await.unwrap();

        assert_eq!(host.injected(), vec!["e2e4".to_string()]);
        assert_eq!(host.confirms(), 1);
        assert_eq!(host.released(), vec![ElementHandle::new("input-1")]);
    }

    #[tokio::test]
    async fn test_input_released_after_failed_set() {
        let host = FakeHost::new(vec![]);
        host.fail_input(true);

        let err = MoveInjector::new().inject(&host, "e2e4").await.unwrap_err();
        assert!(matches!(err, InjectError::Host(_)));
        assert_eq!(host.confirms(), 0);
        assert_eq!(host.released(), vec![ElementHandle::new("input-1")]);
    }

    #[tokio::test]
    async fn test_inject_missing_input() {
        let host = FakeHost::new(vec![]);
        host.set_input_present(false);

        let err = MoveInjector::new().inject(&host, "e2e4").await.unwrap_err();
        assert!(matches!(err, InjectError::InputNotFound));
        assert!(host.injected().is_empty());
        assert_eq!(host.confirms(), 0);
        assert!(host.released().is_empty());
    }

    #[test]
    fn test_vanished_input_maps_to_not_found() {
        let err = not_found_as_missing(HostError::ElementNotFound("input".to_string()));
        assert!(matches!(err, InjectError::InputNotFound));

        let err = not_found_as_missing(HostError::Script("boom".to_string()));
        assert!(matches!(err, InjectError::Host(_)));
    }
}
