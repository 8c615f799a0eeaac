use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use phonescan_core::{update, AppState, Msg, Phase, TaskId};
use phonescan_engine::{
    export_results, ApiError, ClientSettings, EngineEvent, EngineHandle, ReqwestApiClient, TaskApi,
    TaskResults,
};
use phonescan_logging::{scan_debug, scan_info, scan_warn};

use super::effects::{results_view, EffectRunner};
use super::render;
use crate::cli::Invocation;

/// Poll interval of the dispatch loop; a timeout becomes a `Msg::Tick`.
const TICK: Duration = Duration::from_millis(75);

pub fn run(settings: ClientSettings, invocation: Invocation) -> Result<ExitCode> {
    match invocation {
        Invocation::Upload { file, output } => {
            let engine = EngineHandle::new(settings).context("cannot create HTTP client")?;
            UploadScreen::new(EffectRunner::new(engine)).run(file, output.as_deref())
        }
        Invocation::Results { task, output } => {
            let engine = EngineHandle::new(settings).context("cannot create HTTP client")?;
            results_screen(EffectRunner::new(engine), task, output.as_deref())
        }
        Invocation::Status(task_id) => query(settings, |api| async move {
            let report = api.fetch_status(&task_id).await?;
            Ok::<_, ApiError>(render::render_status(&report))
        }),
        Invocation::Tasks { status, limit } => query(settings, |api| async move {
            let list = api.list_tasks(status.as_deref(), limit).await?;
            Ok::<_, ApiError>(render::render_task_list(&list))
        }),
        Invocation::Delete(task_id) => query(settings, |api| async move {
            Ok::<_, ApiError>(vec![api.delete_task(&task_id).await?])
        }),
    }
}

struct UploadScreen {
    state: AppState,
    runner: EffectRunner,
    pending: VecDeque<Msg>,
    shown: Vec<String>,
}

impl UploadScreen {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            pending: VecDeque::new(),
            shown: Vec::new(),
        }
    }

    fn run(mut self, file: Option<PathBuf>, output: Option<&Path>) -> Result<ExitCode> {
        println!("{}", render::TITLE);
        let Some(file) = file else {
            println!("{}", render::SELECT_HINT);
            return Ok(ExitCode::SUCCESS);
        };

        self.dispatch(Msg::FileChosen(file));
        if self.state.phase() == Phase::Idle {
            self.dispatch(Msg::SubmitClicked);
        }

        while self.waiting() {
            let msg = match self.runner.next_event(TICK) {
                Some(event) => self.runner.translate(event),
                None => Msg::Tick,
            };
            self.dispatch(msg);
        }

        let phase = self.state.phase();
        if phase == Phase::Streaming {
            scan_warn!("Task stream ended before the task finished");
            println!("Error: connection to the task stream was lost before processing finished");
        }
        if phase == Phase::Completed {
            if let (Some(target), Some(results)) = (output, self.runner.last_results()) {
                write_export(target, results)?;
            }
        }
        self.dispatch(Msg::ViewClosed);

        Ok(exit_code(phase))
    }

    /// Keeps the loop alive while a task attempt or its result fetch is outstanding.
    fn waiting(&self) -> bool {
        match self.state.phase() {
            Phase::Uploading => true,
            Phase::Streaming => !self.runner.stream_ended(),
            Phase::Completed => self.state.view().results.is_none(),
            Phase::Idle | Phase::Validating | Phase::Failed => false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        self.pending.push_back(msg);
        while let Some(msg) = self.pending.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            if self.state.consume_dirty() {
                self.render();
            }
            let immediate = self.runner.run(effects);
            self.pending.extend(immediate);
        }
    }

    fn render(&mut self) {
        let lines = render::render(&self.state.view());
        for line in render::changed_lines(&self.shown, &lines) {
            println!("{line}");
        }
        self.shown = lines;
    }
}

fn results_screen(
    runner: EffectRunner,
    task: Option<TaskId>,
    output: Option<&Path>,
) -> Result<ExitCode> {
    println!("{}", render::RESULTS_TITLE);
    let Some(task_id) = task else {
        println!("{}", render::RESULTS_PLACEHOLDER);
        return Ok(ExitCode::SUCCESS);
    };

    runner.fetch_results(&task_id);
    let results = loop {
        match runner.next_event(TICK) {
            Some(EngineEvent::ResultsFetched { task_id: id, result }) if id == task_id => {
                break result;
            }
            Some(other) => scan_debug!("Ignoring engine event {:?}", other),
            None => {}
        }
    };

    match results {
        Ok(results) => {
            for line in render::render_results(&results_view(&results)) {
                println!("{line}");
            }
            if let Some(target) = output {
                write_export(target, &results)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!("Error: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn query<F, Fut>(settings: ClientSettings, request: F) -> Result<ExitCode>
where
    F: FnOnce(ReqwestApiClient) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<String>, ApiError>>,
{
    let api = ReqwestApiClient::new(settings).context("cannot create HTTP client")?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;

    match runtime.block_on(request(api)) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            scan_warn!("Request failed ({}): {}", err.kind, err.message);
            println!("Error: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn write_export(target: &Path, results: &TaskResults) -> Result<()> {
    let exported_at = Utc::now().to_rfc3339();
    let written = export_results(target, results, &exported_at)
        .with_context(|| format!("cannot export results to {}", target.display()))?;
    scan_info!("Exported results to {}", written.display());
    println!("Saved results to {}", written.display());
    Ok(())
}

fn exit_code(phase: Phase) -> ExitCode {
    match phase {
        Phase::Completed => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
