// src/transform/command.rs

//! Runs an external tool (bundler, sass, svg-sprite...) for a task.

use std::process::Stdio;
use std::sync::{Arc, OnceLock};

use anyhow::{bail, Context, Result};
use regex::{Captures, Regex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::transform::{TransformJob, TransformOutput, Transformer};
use crate::types::BoxFuture;

/// Param holding the command line to run.
pub const COMMAND_PARAM: &str = "command";

/// Runs the job's `command` param through the platform shell.
///
/// Placeholders in the command are expanded before spawning:
/// - `{inputs}`: space-separated input files
/// - `{dest}`: destination directory
/// - `{minify}`: `true` / `false`
/// - `{name}`: any scalar param of the job
///
/// `NODE_ENV`, `BUILD_VERSION`, `HASH` and `BROWSERSLIST` are exported to the
/// child from the job's `BuildEnv`. Jobs without a `command` are handed to
/// `fallback`.
pub struct CommandTransformer {
    fallback: Arc<dyn Transformer>,
}

impl CommandTransformer {
    pub fn new(fallback: Arc<dyn Transformer>) -> Self {
        Self { fallback }
    }
}

impl Transformer for CommandTransformer {
    fn transform<'a>(&'a self, job: &'a TransformJob) -> BoxFuture<'a, Result<TransformOutput>> {
        Box::pin(async move {
            match job.param_str(COMMAND_PARAM) {
                Some(template) => run_command(job, template).await,
                None => {
                    debug!(task = %job.task, "no command configured; using fallback transformer");
                    self.fallback.transform(job).await
                }
            }
        })
    }
}

async fn run_command(job: &TransformJob, template: &str) -> Result<TransformOutput> {
    let line = expand_placeholders(template, job);
    info!(task = %job.task, cmd = %line, "starting transform process");

    // Build a shell command appropriate for the platform.
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&line);
        c
    };

    cmd.current_dir(job.env.root())
        .envs(job.env.exported_vars())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{}'", job.task))?;

    // Always consume output so buffers don't fill; log at debug.
    if let Some(stdout) = child.stdout.take() {
        let task_name = job.task.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stdout: {}", line);
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        let task_name = job.task.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{}'", job.task))?;

    let code = status.code().unwrap_or(-1);
    info!(
        task = %job.task,
        exit_code = code,
        success = status.success(),
        "transform process exited"
    );

    if !status.success() {
        bail!("command `{line}` exited with status {code}");
    }

    Ok(TransformOutput {
        written: vec![job.dest.clone()],
    })
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex is valid"))
}

/// Expand `{placeholder}`s; unknown names are left untouched.
pub fn expand_placeholders(template: &str, job: &TransformJob) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            match key {
                "inputs" => job
                    .inputs
                    .iter()
                    .map(|f| f.path.to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join(" "),
                "dest" => job.dest.to_string_lossy().into_owned(),
                "minify" => job.env.minify().to_string(),
                "hash" => job.env.build_version().hash().to_string(),
                other => match job.params.get(other) {
                    Some(toml::Value::String(s)) => s.clone(),
                    Some(toml::Value::Boolean(b)) => b.to_string(),
                    Some(toml::Value::Integer(i)) => i.to_string(),
                    _ => caps[0].to_string(),
                },
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::env::{BuildEnv, BuildVersion};
    use crate::watch::MatchedFile;

    fn job(params: toml::Table) -> TransformJob {
        TransformJob {
            task: "css".to_string(),
            inputs: vec![MatchedFile {
                path: PathBuf::from("/p/source/css/index.css"),
                base: PathBuf::from("/p/source/css"),
            }],
            dest: PathBuf::from("/p/dist/assets/css"),
            params,
            env: Arc::new(BuildEnv::new("/p", true, BuildVersion::fixed("deadbeefcafe"))),
        }
    }

    #[test]
    fn expands_builtin_and_param_placeholders() {
        let mut params = toml::Table::new();
        params.insert("style".into(), toml::Value::String("compressed".into()));
        let j = job(params);

        let line = expand_placeholders("sass {inputs} {dest}/app.{hash}.css --style={style} {unknown}", &j);
        assert_eq!(
            line,
            "sass /p/source/css/index.css /p/dist/assets/css/app.deadbeef.css --style=compressed {unknown}"
        );
    }

    #[tokio::test]
    async fn failing_command_is_an_error() {
        if cfg!(windows) {
            return;
        }
        let mut params = toml::Table::new();
        params.insert(COMMAND_PARAM.into(), toml::Value::String("exit 3".into()));
        let mut j = job(params);
        j.env = Arc::new(BuildEnv::new(std::env::temp_dir(), false, BuildVersion::fixed("v")));

        let fallback = Arc::new(crate::transform::CopyTransformer::new(Arc::new(
            crate::fs::mock::MockFileSystem::new(),
        )));
        let err = CommandTransformer::new(fallback).transform(&j).await.unwrap_err();
        assert!(err.to_string().contains("status 3"));
    }
}
