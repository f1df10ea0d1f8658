//! Dependency records
//!
//! Every dependency of a layer becomes one `<depend>` record in the spec.
//! Whole-layer dependencies name the target layer; frame-precise ones name
//! the first frame of the target layer as `<frame>-<layer>`.

use spool_core::domain::depend::{DependKind, DependType};
use spool_core::domain::job::Job;
use spool_core::domain::layer::Layer;

use crate::error::{LaunchError, Result};

/// What a dependency record waits on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependOn {
    /// `<onlayer>`: the whole target layer
    Layer(String),
    /// `<onframe>`: one frame of the target layer, already formatted
    Frame(String),
}

/// A normalized dependency ready to be written to the spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependRecord {
    pub depend_type: DependType,
    pub any_frame: bool,
    pub depend_job: String,
    pub depend_layer: String,
    pub on_job: String,
    pub on: DependOn,
}

/// Formats a frame reference as `0005-render`
pub fn frame_reference(frame: i32, layer: &str) -> String {
    format!("{:04}-{}", frame, layer)
}

/// Appends a record to `sink` for every dependency of `layer`
pub fn encode_dependencies(job: &Job, layer: &Layer, sink: &mut Vec<DependRecord>) -> Result<()> {
    for dep in &layer.depends {
        let target = job
            .layer(dep.target())
            .ok_or_else(|| LaunchError::DependencyResolution {
                job: job.name.clone(),
                layer: layer.name.clone(),
                target: format!("#{}", dep.target().0),
                reason: "no such layer in job".to_string(),
            })?;

        let on = match dep.kind() {
            DependKind::OnSimFrame { .. } => {
                let resolution_error = |reason: String| LaunchError::DependencyResolution {
                    job: job.name.clone(),
                    layer: layer.name.clone(),
                    target: target.name.clone(),
                    reason,
                };

                let first_frame = job
                    .resolve_frames(target)
                    .map_err(|e| resolution_error(e.to_string()))?
                    .first()
                    .ok_or_else(|| resolution_error("target layer has no frames".to_string()))?;

                DependOn::Frame(frame_reference(first_frame, &target.name))
            }
            DependKind::OnLayer { .. } => DependOn::Layer(target.name.clone()),
        };

        sink.push(DependRecord {
            depend_type: dep.depend_type(),
            any_frame: dep.any_frame(),
            depend_job: job.name.clone(),
            depend_layer: layer.name.clone(),
            on_job: job.name.clone(),
            on,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use spool_core::domain::depend::Dependency;
    use spool_core::domain::layer::LayerId;

    fn encode(job: &Job, name: &str) -> Result<Vec<DependRecord>> {
        let (_, layer) = job.layer_by_name(name).unwrap();
        let mut sink = Vec::new();
        encode_dependencies(job, layer, &mut sink)?;
        Ok(sink)
    }

    #[test]
    fn test_layer_dependency_record() {
        let mut job = Job::new("shotA_comp", "/p");
        let render = job.add_layer(Layer::new("render", "Render").with_range("1-10"));
        job.add_layer(
            Layer::new("comp", "Comp").with_depend(Dependency::on_layer(render).with_any_frame(true)),
        );

        let records = encode(&job, "comp").unwrap();
        assert_eq!(
            records,
            vec![DependRecord {
                depend_type: DependType::LayerOnLayer,
                any_frame: true,
                depend_job: "shotA_comp".to_string(),
                depend_layer: "comp".to_string(),
                on_job: "shotA_comp".to_string(),
                on: DependOn::Layer("render".to_string()),
            }]
        );
    }

    #[test]
    fn test_sim_frame_dependency_uses_first_frame() {
        let mut job = Job::new("shotA_comp", "/p");
        let render = job.add_layer(Layer::new("render", "Render").with_range("5-20"));
        job.add_layer(Layer::new("comp", "Comp").with_depend(Dependency::on_sim_frame(render)));

        let records = encode(&job, "comp").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].depend_type, DependType::LayerOnSimFrame);
        assert_eq!(records[0].on, DependOn::Frame("0005-render".to_string()));
    }

    #[test]
    fn test_sim_frame_dependency_respects_job_range() {
        let mut job = Job::new("shotA_comp", "/p").with_frame_range("12-40");
        let render = job.add_layer(Layer::new("render", "Render").with_range("5-20"));
        job.add_layer(Layer::new("comp", "Comp").with_depend(Dependency::on_sim_frame(render)));

        let records = encode(&job, "comp").unwrap();
        assert_eq!(records[0].on, DependOn::Frame("0012-render".to_string()));
    }

    #[test]
    fn test_sim_frame_dependency_without_frames_fails() {
        let mut job = Job::new("shotA_comp", "/p");
        let render = job.add_layer(Layer::new("render", "Render"));
        job.add_layer(Layer::new("comp", "Comp").with_depend(Dependency::on_sim_frame(render)));

        let err = encode(&job, "comp").unwrap_err();
        assert!(matches!(err, LaunchError::DependencyResolution { .. }));
        let message = err.to_string();
        assert!(message.contains("comp"));
        assert!(message.contains("render"));
    }

    #[test]
    fn test_sim_frame_dependency_with_bad_range_fails() {
        let mut job = Job::new("shotA_comp", "/p");
        let render = job.add_layer(Layer::new("render", "Render").with_range("garbage"));
        job.add_layer(Layer::new("comp", "Comp").with_depend(Dependency::on_sim_frame(render)));

        assert!(matches!(
            encode(&job, "comp"),
            Err(LaunchError::DependencyResolution { .. })
        ));
    }

    #[test]
    fn test_unknown_target_fails() {
        let mut job = Job::new("shotA_comp", "/p");
        job.add_layer(Layer::new("comp", "Comp").with_depend(Dependency::on_layer(LayerId(9))));

        assert!(encode(&job, "comp").is_err());
    }

    #[test]
    fn test_layer_without_depends_emits_nothing() {
        let mut job = Job::new("shotA_comp", "/p");
        job.add_layer(Layer::new("beauty", "Render").with_range("1-10"));
        assert!(encode(&job, "beauty").unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_sim_frame_reference_is_padded_min_frame(start in -50i32..5000, len in 0i32..200, step in 1i32..5) {
            let end = start + len;
            let range = format!("{}-{}x{}", start, end, step);

            let mut job = Job::new("job", "/p");
            let render = job.add_layer(Layer::new("render", "Render").with_range(range));
            job.add_layer(Layer::new("comp", "Comp").with_depend(Dependency::on_sim_frame(render)));

            let records = encode(&job, "comp").unwrap();
            prop_assert_eq!(
                records[0].on.clone(),
                DependOn::Frame(format!("{:04}-render", start))
            );
        }
    }
}
