//! Dependency domain types

use serde::{Deserialize, Serialize};

use crate::domain::layer::LayerId;

/// Dependency type as named on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependType {
    /// Waits for the whole target layer
    #[default]
    LayerOnLayer,
    /// Each frame waits for the same frame of the target layer
    FrameByFrame,
    /// Each frame waits for the previous frame of the target layer
    PreviousFrame,
    /// Waits for a single frame of the target layer (its first frame)
    LayerOnSimFrame,
}

impl DependType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependType::LayerOnLayer => "LAYER_ON_LAYER",
            DependType::FrameByFrame => "FRAME_BY_FRAME",
            DependType::PreviousFrame => "PREVIOUS_FRAME",
            DependType::LayerOnSimFrame => "LAYER_ON_SIM_FRAME",
        }
    }
}

impl std::fmt::Display for DependType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a dependency points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependKind {
    /// Depends on the target layer as a whole
    OnLayer {
        target: LayerId,
        depend_type: DependType,
    },
    /// Depends on one frame of the target layer, resolved at encode time
    OnSimFrame { target: LayerId },
}

/// An ordering edge from the owning layer to another layer of the same job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    kind: DependKind,
    any_frame: bool,
}

impl Dependency {
    /// Creates a dependency on `target`
    ///
    /// `DependType::LayerOnSimFrame` produces the frame-precise variant, every
    /// other type a whole-layer dependency.
    pub fn new(target: LayerId, depend_type: DependType) -> Self {
        let kind = match depend_type {
            DependType::LayerOnSimFrame => DependKind::OnSimFrame { target },
            depend_type => DependKind::OnLayer {
                target,
                depend_type,
            },
        };
        Self {
            kind,
            any_frame: false,
        }
    }

    pub fn on_layer(target: LayerId) -> Self {
        Self::new(target, DependType::LayerOnLayer)
    }

    pub fn on_sim_frame(target: LayerId) -> Self {
        Self::new(target, DependType::LayerOnSimFrame)
    }

    pub fn with_any_frame(mut self, any_frame: bool) -> Self {
        self.any_frame = any_frame;
        self
    }

    pub fn kind(&self) -> DependKind {
        self.kind
    }

    pub fn any_frame(&self) -> bool {
        self.any_frame
    }

    pub fn target(&self) -> LayerId {
        match self.kind {
            DependKind::OnLayer { target, .. } | DependKind::OnSimFrame { target } => target,
        }
    }

    pub fn depend_type(&self) -> DependType {
        match self.kind {
            DependKind::OnLayer { depend_type, .. } => depend_type,
            DependKind::OnSimFrame { .. } => DependType::LayerOnSimFrame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_frame_type_selects_frame_variant() {
        let dep = Dependency::new(LayerId(3), DependType::LayerOnSimFrame);
        assert_eq!(dep.kind(), DependKind::OnSimFrame { target: LayerId(3) });
        assert_eq!(dep.depend_type(), DependType::LayerOnSimFrame);
        assert_eq!(dep.target(), LayerId(3));
    }

    #[test]
    fn test_layer_types_keep_their_tag() {
        let dep = Dependency::new(LayerId(1), DependType::FrameByFrame).with_any_frame(true);
        assert_eq!(dep.depend_type().as_str(), "FRAME_BY_FRAME");
        assert!(dep.any_frame());
        assert!(matches!(dep.kind(), DependKind::OnLayer { .. }));
    }

    #[test]
    fn test_depend_type_serde_names() {
        let parsed: DependType = serde_json::from_str("\"LAYER_ON_SIM_FRAME\"").unwrap();
        assert_eq!(parsed, DependType::LayerOnSimFrame);
        assert_eq!(
            serde_json::to_string(&DependType::PreviousFrame).unwrap(),
            "\"PREVIOUS_FRAME\""
        );
    }
}
