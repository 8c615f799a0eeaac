use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser, Subcommand};
use phonescan_core::{Route, TaskId};
use phonescan_engine::ClientSettings;

#[derive(Debug, Parser)]
#[command(
    name = "phonescan",
    version,
    about = "Upload videos to the phone number extraction backend and follow their progress"
)]
pub struct Cli {
    /// Base URL of the HTTP API.
    #[arg(long, value_name = "URL", env = "PHONESCAN_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Base URL of the task progress stream.
    #[arg(long, value_name = "URL", env = "PHONESCAN_WS_URL", global = true)]
    pub ws_url: Option<String>,

    /// Timeout of the upload request in seconds.
    #[arg(
        long,
        value_name = "SECS",
        env = "PHONESCAN_UPLOAD_TIMEOUT_SECS",
        global = true
    )]
    pub upload_timeout: Option<u64>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write logs to ./phonescan.log.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Navigate to a screen by path.
    Open {
        #[arg(default_value = "/")]
        path: String,
        /// Video to submit on the upload screen.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Task whose results the results screen shows.
        #[arg(long)]
        task: Option<TaskId>,
        /// Save fetched results as JSON.
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Upload a video and follow its processing.
    Upload {
        file: PathBuf,
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Show the results screen.
    Results {
        #[arg(long)]
        task: Option<TaskId>,
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the status of one task.
    Status { task_id: TaskId },
    /// List recent tasks.
    Tasks {
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Delete a task and its uploaded video.
    Delete { task_id: TaskId },
}

/// What the binary was asked to do, with routes already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Upload {
        file: Option<PathBuf>,
        output: Option<PathBuf>,
    },
    Results {
        task: Option<TaskId>,
        output: Option<PathBuf>,
    },
    Status(TaskId),
    Tasks {
        status: Option<String>,
        limit: u32,
    },
    Delete(TaskId),
}

impl Cli {
    /// Settings from the environment, overridden by explicit flags.
    pub fn settings(&self) -> ClientSettings {
        let mut settings = ClientSettings::from_env();
        if let Some(url) = &self.api_url {
            settings.api_base_url = url.clone();
        }
        if let Some(url) = &self.ws_url {
            settings.ws_base_url = url.clone();
        }
        if let Some(secs) = self.upload_timeout {
            settings.upload_timeout = Duration::from_secs(secs);
        }
        settings
    }

    pub fn invocation(&self) -> Result<Invocation> {
        let Some(command) = &self.command else {
            return screen(Route::Upload.path(), None, None, None);
        };
        match command {
            Command::Open {
                path,
                file,
                task,
                output,
            } => screen(path, file.clone(), task.clone(), output.clone()),
            Command::Upload { file, output } => Ok(Invocation::Upload {
                file: Some(file.clone()),
                output: output.clone(),
            }),
            Command::Results { task, output } => Ok(Invocation::Results {
                task: task.clone(),
                output: output.clone(),
            }),
            Command::Status { task_id } => Ok(Invocation::Status(task_id.clone())),
            Command::Tasks { status, limit } => Ok(Invocation::Tasks {
                status: status.clone(),
                limit: *limit,
            }),
            Command::Delete { task_id } => Ok(Invocation::Delete(task_id.clone())),
        }
    }
}

fn screen(
    path: &str,
    file: Option<PathBuf>,
    task: Option<TaskId>,
    output: Option<PathBuf>,
) -> Result<Invocation> {
    match Route::resolve(path) {
        Some(Route::Upload) => Ok(Invocation::Upload { file, output }),
        Some(Route::Results) => Ok(Invocation::Results { task, output }),
        None => Err(anyhow!("no such screen: {path}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("phonescan").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_command_opens_upload_screen() {
        assert_eq!(
            parse(&[]).invocation().unwrap(),
            Invocation::Upload {
                file: None,
                output: None
            }
        );
    }

    #[test]
    fn root_path_redirects_to_upload() {
        let cli = parse(&["open", "/", "--file", "clip.mp4"]);
        assert_eq!(
            cli.invocation().unwrap(),
            Invocation::Upload {
                file: Some(PathBuf::from("clip.mp4")),
                output: None
            }
        );
    }

    #[test]
    fn results_path_carries_task() {
        let cli = parse(&["open", "/results/", "--task", "abc123", "--output", "out.json"]);
        assert_eq!(
            cli.invocation().unwrap(),
            Invocation::Results {
                task: Some("abc123".to_string()),
                output: Some(PathBuf::from("out.json"))
            }
        );
    }

    #[test]
    fn unknown_path_is_an_error() {
        let err = parse(&["open", "/settings"]).invocation().unwrap_err();
        assert_eq!(err.to_string(), "no such screen: /settings");
    }

    #[test]
    fn flags_override_settings() {
        let cli = parse(&[
            "--api-url",
            "http://backend:9000/api",
            "--upload-timeout",
            "120",
            "-vv",
            "tasks",
            "--status",
            "completed",
        ]);
        let settings = cli.settings();

        assert_eq!(settings.api_base_url, "http://backend:9000/api");
        assert_eq!(settings.upload_timeout, Duration::from_secs(120));
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.invocation().unwrap(),
            Invocation::Tasks {
                status: Some("completed".to_string()),
                limit: 10
            }
        );
    }
}
