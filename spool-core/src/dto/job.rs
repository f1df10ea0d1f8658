//! Job description DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::domain::depend::{DependType, Dependency};
use crate::domain::job::Job;
use crate::domain::layer::{Layer, LayerId, Tags};

/// Errors raised while turning a description into a job graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobBuildError {
    #[error("job '{job}' declares layer '{layer}' more than once")]
    DuplicateLayer { job: String, layer: String },

    #[error("layer '{layer}' names unknown parent '{parent}'")]
    UnknownParent { layer: String, parent: String },

    #[error("layer '{layer}' cannot be its own parent")]
    SelfParent { layer: String },

    #[error("layer '{layer}' depends on unknown layer '{target}'")]
    UnknownDependTarget { layer: String, target: String },
}

/// An environment entry; a bare string is a pre-setup variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvDescription {
    Value(String),
    Flagged {
        value: String,
        #[serde(default = "default_true")]
        pre_setup: bool,
    },
}

/// A job as written in a description file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescription {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub session_dir: Option<String>,
    #[serde(default)]
    pub frame_range: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, EnvDescription>,
    #[serde(default)]
    pub localbook: Option<BTreeMap<String, String>>,
    pub layers: Vec<LayerDescription>,
}

/// A layer as written in a description file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDescription {
    pub name: String,
    #[serde(rename = "type", default = "default_layer_type")]
    pub layer_type: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default = "default_chunk")]
    pub chunk: u32,
    #[serde(default)]
    pub threads: Option<f64>,
    #[serde(default)]
    pub memory: Option<String>,
    #[serde(default)]
    pub tags: Option<Tags>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub args: HashMap<String, Value>,
    #[serde(default)]
    pub depends: Vec<DependDescription>,
}

/// A dependency as written in a description file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependDescription {
    /// Name of the layer depended upon
    pub on: String,
    #[serde(rename = "type", default)]
    pub depend_type: DependType,
    #[serde(default)]
    pub any_frame: bool,
}

fn default_true() -> bool {
    true
}

fn default_layer_type() -> String {
    "Render".to_string()
}

fn default_chunk() -> u32 {
    1
}

impl JobDescription {
    /// Resolves layer names and builds the job graph
    pub fn into_job(self) -> Result<Job, JobBuildError> {
        let mut ids: HashMap<String, LayerId> = HashMap::new();
        for (idx, layer) in self.layers.iter().enumerate() {
            if ids.insert(layer.name.clone(), LayerId(idx)).is_some() {
                return Err(JobBuildError::DuplicateLayer {
                    job: self.name.clone(),
                    layer: layer.name.clone(),
                });
            }
        }

        let mut job = Job::new(self.name, self.path);
        job.session_dir = self.session_dir.unwrap_or_default();
        job.frame_range = self.frame_range;
        job.localbook = self.localbook;

        for (key, entry) in self.env {
            match entry {
                EnvDescription::Value(value) => job.set_env(key, value, true),
                EnvDescription::Flagged { value, pre_setup } => job.set_env(key, value, pre_setup),
            }
        }

        for desc in self.layers {
            let parent = match desc.parent {
                Some(parent) if parent == desc.name => {
                    return Err(JobBuildError::SelfParent { layer: desc.name });
                }
                Some(parent) => Some(*ids.get(&parent).ok_or_else(|| {
                    JobBuildError::UnknownParent {
                        layer: desc.name.clone(),
                        parent: parent.clone(),
                    }
                })?),
                None => None,
            };

            let mut depends = Vec::with_capacity(desc.depends.len());
            for dep in desc.depends {
                let target = *ids.get(&dep.on).ok_or_else(|| {
                    JobBuildError::UnknownDependTarget {
                        layer: desc.name.clone(),
                        target: dep.on.clone(),
                    }
                })?;
                depends.push(
                    Dependency::new(target, dep.depend_type).with_any_frame(dep.any_frame),
                );
            }

            let mut layer = Layer::new(desc.name, desc.layer_type).with_chunk(desc.chunk);
            layer.parent = parent;
            layer.range = desc.range;
            layer.threads = desc.threads;
            layer.memory = desc.memory;
            layer.tags = desc.tags;
            layer.service = desc.service;
            layer.args = desc.args;
            layer.depends = depends;

            job.add_layer(layer);
        }

        Ok(job)
    }
}

impl TryFrom<JobDescription> for Job {
    type Error = JobBuildError;

    fn try_from(desc: JobDescription) -> Result<Self, Self::Error> {
        desc.into_job()
    }
}
