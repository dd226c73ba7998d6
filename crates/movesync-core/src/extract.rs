//! Move list extraction.

use tracing::{debug, warn};

use movesync_config::ExtractMode;
use movesync_protocols::{HostDocument, MoveNotation, MoveSequence, PlyNode};

use crate::error::ExtractError;

/// Reads the played moves from the host document.
///
/// Every call re-reads the whole list; nothing is cached between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveExtractor {
    mode: ExtractMode,
}

impl MoveExtractor {
    pub fn new(mode: ExtractMode) -> Self {
        Self { mode }
    }

    /// Extract the current move sequence.
    pub async fn extract(&self, host: &dyn HostDocument) -> Result<MoveSequence, ExtractError> {
        let nodes = host.ply_nodes().await?;
        let moves = self.collect(&nodes)?;
        debug!("Extracted {} moves from {} ply elements", moves.len(), nodes.len());
        Ok(moves)
    }

    /// Build a sequence from already-read ply nodes.
    pub fn collect(&self, nodes: &[PlyNode]) -> Result<MoveSequence, ExtractError> {
        let mut moves = MoveSequence::new();
        for (index, node) in nodes.iter().enumerate() {
            match notation_for(index, node) {
                Ok(notation) => moves.push(notation),
                Err(e) => match self.mode {
                    ExtractMode::Lenient => warn!("Skipping ply element: {}", e),
                    ExtractMode::Strict => return Err(e),
                },
            }
        }
        Ok(moves)
    }
}

/// Notation of a single ply: figurine marker (if any) followed by the trimmed
/// move text. An empty marker counts as absent.
fn notation_for(index: usize, node: &PlyNode) -> Result<MoveNotation, ExtractError> {
    let text = node
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ExtractError::MalformedPly {
            index,
            reason: "element has no move text".to_string(),
        })?;

    match node.figurine.as_deref().filter(|f| !f.is_empty()) {
        Some(figurine) => Ok(format!("{}{}", figurine, text)),
        None => Ok(text.to_string()),
    }
}
