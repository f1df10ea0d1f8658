//! Worker command lines
//!
//! Each submitted layer carries the command a worker runs for one frame
//! chunk: an optional strace prefix, a frame wrapper, and the remote entry
//! point re-executing the layer from the job manifest. The scheduler
//! substitutes `#IFRAME#` with the frame number.

use spool_core::domain::job::Job;
use spool_core::domain::layer::Layer;
use spool_core::domain::options::LaunchOptions;

use crate::config::LauncherConfig;

/// Frame wrapper that sets up the shot environment
pub const SETSHOT_WRAPPER: &str = "cue_wrap_frame";

/// Frame wrapper that skips shot setup
pub const NO_SETSHOT_WRAPPER: &str = "cue_wrap_frame_no_ss";

/// Remote entry point executed by the wrapper
pub const ENTRY_POINT: &str = "spoolrun";

/// Builds the command tokens for a layer
pub fn build_command(
    config: &LauncherConfig,
    options: &LaunchOptions,
    job: &Job,
    layer: &Layer,
) -> Vec<String> {
    let mut command = Vec::new();

    if layer.arg_truthy("strace") {
        command.extend(
            ["strace", "-ttt", "-T", "-e", "open,stat", "-f", "-o"]
                .into_iter()
                .map(String::from),
        );
        command.push(format!("{}/strace.log", job.layer_path(layer)));
    }

    let explicit = layer
        .arg_truthy("wrapper")
        .then(|| layer.arg_str("wrapper"))
        .flatten();

    let wrapper = match explicit {
        Some(wrapper) => wrapper,
        None if layer.arg_or("setshot", true) => format!("{}/{}", config.wrapper_dir, SETSHOT_WRAPPER),
        None => format!("{}/{}", config.wrapper_dir, NO_SETSHOT_WRAPPER),
    };

    command.push(wrapper);
    command.push(config.user_dir.clone());
    command.push(format!("{}/{}", config.bin_dir, ENTRY_POINT));
    command.push(format!("{} -e #IFRAME#-{}", job.path, layer.name));
    command.push(format!("--version {}", config.version));
    command.push(format!("--repos {}", config.repos));
    command.push("--debug".to_string());

    if options.dev {
        command.push("--dev".to_string());
    }

    if let Some(devuser) = options.devuser.as_deref().filter(|u| !u.is_empty()) {
        command.push(format!("--dev-user {}", devuser));
    }

    command
}
