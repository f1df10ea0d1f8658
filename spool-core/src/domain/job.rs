//! Job domain types

use std::collections::BTreeMap;

use crate::domain::layer::{Layer, LayerId};
use crate::frames::{FrameRangeError, FrameSet};

/// An environment variable attached to a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub value: String,
    /// Pre-setup variables are handed to the scheduler; post-setup ones are
    /// applied on the worker after its setup phase
    pub pre_setup: bool,
}

/// The root unit of submission
///
/// Owns its layers in declaration order. Layers are addressed by
/// [`LayerId`], which stays valid for the lifetime of the job.
#[derive(Debug, Clone)]
pub struct Job {
    pub name: String,
    /// Manifest path the remote entry point reloads the job from
    pub path: String,
    /// Directory holding per-layer session data
    pub session_dir: String,
    /// Job-wide frame range every layer is clipped to
    pub frame_range: Option<String>,
    pub env: BTreeMap<String, EnvVar>,
    /// Attributes of the optional `<localbook/>` hint
    pub localbook: Option<BTreeMap<String, String>>,
    layers: Vec<Layer>,
}

impl Job {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            session_dir: String::new(),
            frame_range: None,
            env: BTreeMap::new(),
            localbook: None,
            layers: Vec::new(),
        }
    }

    pub fn with_frame_range(mut self, range: impl Into<String>) -> Self {
        self.frame_range = Some(range.into());
        self
    }

    pub fn with_session_dir(mut self, dir: impl Into<String>) -> Self {
        self.session_dir = dir.into();
        self
    }

    /// Sets an environment variable
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>, pre_setup: bool) {
        self.env.insert(
            key.into(),
            EnvVar {
                value: value.into(),
                pre_setup,
            },
        );
    }

    /// Appends a layer and returns its handle
    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        self.layers.push(layer);
        LayerId(self.layers.len() - 1)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id.0)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<(LayerId, &Layer)> {
        self.layers().find(|(_, layer)| layer.name == name)
    }

    /// Iterates layers in declaration order
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .map(|(idx, layer)| (LayerId(idx), layer))
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Directory for a layer's session files
    pub fn layer_path(&self, layer: &Layer) -> String {
        format!("{}/{}", self.session_dir.trim_end_matches('/'), layer.name)
    }

    /// Resolves the frames a layer will run
    ///
    /// Uses the layer's own range, or the job range when the layer has none,
    /// clipped to the job range. The result may be empty when the two do not
    /// overlap; a layer with no range at all resolves to an empty set.
    pub fn resolve_frames(&self, layer: &Layer) -> Result<FrameSet, FrameRangeError> {
        let job_frames = self
            .frame_range
            .as_deref()
            .map(FrameSet::parse)
            .transpose()?;

        let layer_frames = match layer.range.as_deref() {
            Some(range) => FrameSet::parse(range)?,
            None => match &job_frames {
                Some(frames) => frames.clone(),
                None => return Ok(FrameSet::default()),
            },
        };

        Ok(match job_frames {
            Some(job_frames) => layer_frames.intersection(&job_frames),
            None => layer_frames,
        })
    }
}
