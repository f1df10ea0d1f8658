//! Job spec compiler
//!
//! Walks a job's layers once and writes the XML spec the scheduler consumes:
//!
//! ```text
//! <spec>
//!   facility show shot user [email] uid
//!   <job name>
//!     paused maxretries autoeat [localbook] [os] <env/> <layers/>
//!   </job>
//!   <depends/>
//! </spec>
//! ```
//!
//! A layer is submitted only when it is registered, has no parent and still
//! has frames after clipping to the job range. Dependency records are
//! collected for every layer in the same pass and written after the job.

mod writer;

use std::fmt;

use spool_core::domain::context::EnvContext;
use spool_core::domain::job::Job;
use spool_core::domain::layer::{Layer, Tags};
use spool_core::domain::options::LaunchOptions;
use tracing::{debug, info};

use crate::command::build_command;
use crate::config::LauncherConfig;
use crate::depend::{DependOn, DependRecord, encode_dependencies};
use crate::error::{LaunchError, Result};
use writer::SpecWriter;

/// Service used when a layer names none
pub const DEFAULT_SERVICE: &str = "default";

/// A serialized job spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSpec {
    document: String,
    layers: Vec<String>,
}

impl CompiledSpec {
    /// The XML document, byte for byte as submitted
    pub fn as_str(&self) -> &str {
        &self.document
    }

    /// Names of the submitted layers, in order
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn into_string(self) -> String {
        self.document
    }
}

impl fmt::Display for CompiledSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.document)
    }
}

/// Compiles jobs into scheduler specs
#[derive(Debug, Clone)]
pub struct SpecCompiler {
    config: LauncherConfig,
    ctx: EnvContext,
}

impl SpecCompiler {
    pub fn new(config: LauncherConfig, ctx: EnvContext) -> Self {
        Self { config, ctx }
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn context(&self) -> &EnvContext {
        &self.ctx
    }

    /// Compiles `job` into a spec document
    ///
    /// Fails with [`LaunchError::NoLaunchableWork`] when no layer is
    /// submitted, and with dependency or frame range errors from any layer.
    pub fn compile(&self, options: &LaunchOptions, job: &Job) -> Result<CompiledSpec> {
        let mut w = SpecWriter::new();
        let mut depends: Vec<DependRecord> = Vec::new();
        let mut submitted: Vec<String> = Vec::new();

        w.preamble(&self.config.dtd_public_id, &self.config.dtd_url)?;
        w.start("spec", &[])?;

        w.element("facility", options.facility.as_deref().unwrap_or_default())?;
        w.element("show", self.ctx.show.as_deref().unwrap_or_default())?;
        w.element("shot", options.shot.as_deref().unwrap_or_default())?;
        w.element("user", non_empty(&options.user).unwrap_or(&self.ctx.user))?;
        if !options.nomail {
            w.element(
                "email",
                &format!("{}@{}", self.ctx.user, self.config.email_domain),
            )?;
        }
        w.element("uid", &options.uid.unwrap_or(self.ctx.uid).to_string())?;

        w.start("job", &[("name", job.name.as_str())])?;
        w.element("paused", bool_str(options.pause))?;
        w.element("maxretries", &options.maxretries.to_string())?;
        w.element("autoeat", bool_str(options.autoeat))?;

        if let Some(localbook) = &job.localbook {
            let attrs: Vec<(&str, &str)> = localbook
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            w.empty("localbook", &attrs)?;
        }

        if let Some(os) = non_empty(&options.os).or(non_empty(&self.ctx.os_override)) {
            w.element("os", os)?;
        }

        self.write_env(&mut w, job)?;

        w.start("layers", &[])?;
        for (_, layer) in job.layers() {
            if self.write_layer(&mut w, options, job, layer)? {
                submitted.push(layer.name.clone());
            }
            encode_dependencies(job, layer, &mut depends)?;
        }
        w.end("layers")?;
        w.end("job")?;

        if submitted.is_empty() {
            return Err(LaunchError::NoLaunchableWork {
                job: job.name.clone(),
                range: job.frame_range.clone().unwrap_or_else(|| "none".to_string()),
            });
        }

        write_depends(&mut w, &depends)?;
        w.end("spec")?;

        let document = w.into_string()?;
        debug!("Compiled spec for job {}:\n{}", job.name, document);

        Ok(CompiledSpec {
            document,
            layers: submitted,
        })
    }

    /// Pre-setup variables only; post-setup ones are applied on the worker
    fn write_env(&self, w: &mut SpecWriter, job: &Job) -> Result<()> {
        let mut pre_setup = job.env.iter().filter(|(_, var)| var.pre_setup).peekable();

        if pre_setup.peek().is_none() {
            return w.empty("env", &[]);
        }

        w.start("env", &[])?;
        for (key, var) in pre_setup {
            if var.value.is_empty() {
                w.empty("key", &[("name", key.as_str())])?;
            } else {
                w.start("key", &[("name", key.as_str())])?;
                w.text(&var.value)?;
                w.end("key")?;
            }
        }
        w.end("env")
    }

    /// Writes the layer if it passes the inclusion rules
    ///
    /// Returns whether the layer was written.
    fn write_layer(
        &self,
        w: &mut SpecWriter,
        options: &LaunchOptions,
        job: &Job,
        layer: &Layer,
    ) -> Result<bool> {
        if !layer.is_registered() {
            debug!("Skipping unregistered layer {}", layer.name);
            return Ok(false);
        }

        if layer.parent.is_some() {
            debug!("Skipping child layer {}", layer.name);
            return Ok(false);
        }

        let frames = job
            .resolve_frames(layer)
            .map_err(|source| LaunchError::InvalidFrameRange {
                job: job.name.clone(),
                layer: layer.name.clone(),
                source,
            })?;

        if frames.is_empty() {
            info!(
                "Skipping layer {}, its range ({}) does not intersect with job range {}",
                layer.name,
                layer.range.as_deref().unwrap_or("none"),
                job.frame_range.as_deref().unwrap_or("none")
            );
            return Ok(false);
        }

        w.start(
            "layer",
            &[
                ("name", layer.name.as_str()),
                ("type", layer.layer_type.as_str()),
            ],
        )?;
        w.element(
            "cmd",
            &build_command(&self.config, options, job, layer).join(" "),
        )?;
        w.element("range", &frames.to_string())?;
        w.element("chunk", &layer.chunk.to_string())?;

        if let Some(threads) = layer.threads.filter(|t| *t != 0.0) {
            w.element("cores", &format!("{:.1}", threads))?;
        }

        if layer.is_arg_set("threadable") {
            w.element("threadable", bool_str(layer.arg_truthy("threadable")))?;
        }

        if let Some(memory) = layer.memory.as_deref().filter(|m| !m.is_empty()) {
            w.element("memory", memory)?;
        }

        if let Some(tags) = self.ctx.tag_override.as_deref() {
            w.element("tags", &scrub_tag_string(tags))?;
        } else if let Some(tags) = &layer.tags {
            w.element("tags", &scrub_tags(tags))?;
        }

        w.start("services", &[])?;
        w.element("service", service_name(layer.service.as_deref()))?;
        w.end("services")?;

        w.end("layer")?;
        Ok(true)
    }
}

fn write_depends(w: &mut SpecWriter, depends: &[DependRecord]) -> Result<()> {
    if depends.is_empty() {
        return w.empty("depends", &[]);
    }

    w.start("depends", &[])?;
    for record in depends {
        w.start(
            "depend",
            &[
                ("type", record.depend_type.as_str()),
                ("anyframe", bool_str(record.any_frame)),
            ],
        )?;
        w.element("depjob", &record.depend_job)?;
        w.element("deplayer", &record.depend_layer)?;
        w.element("onjob", &record.on_job)?;
        match &record.on {
            DependOn::Layer(layer) => w.element("onlayer", layer)?,
            DependOn::Frame(frame) => w.element("onframe", frame)?,
        }
        w.end("depend")?;
    }
    w.end("depends")
}

/// An empty override counts as unset
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Booleans are spelled `True`/`False` in the spec
pub fn bool_str(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Normalizes a `|`-delimited tag string
///
/// Tokens are trimmed, anything not purely alphanumeric is dropped and the
/// rest is joined with `" | "`.
pub fn scrub_tag_string(tags: &str) -> String {
    scrub_tokens(tags.split('|'))
}

/// Normalizes layer tags of either shape
pub fn scrub_tags(tags: &Tags) -> String {
    match tags {
        Tags::Delimited(tags) => scrub_tag_string(tags),
        Tags::List(tags) => scrub_tokens(tags.iter().map(String::as_str)),
    }
}

fn scrub_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.chars().all(char::is_alphanumeric))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// First comma-separated entry of the layer's service, or `"default"`
///
/// An absent service, and one whose first entry is blank (e.g. `" ,gpu"`),
/// both fall back to the default service.
pub fn service_name(service: Option<&str>) -> &str {
    service
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SERVICE)
}
