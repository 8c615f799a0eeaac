use crate::{validate_file, AppState, Effect, Msg, Phase, TaskUpdate};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileChosen(path) => {
            // The file input is disabled while a task attempt runs.
            if state.phase().is_in_flight() {
                return (state, Vec::new());
            }
            state.begin_validation();
            vec![Effect::InspectFile { path }]
        }
        Msg::FileInspected(result) => {
            if state.phase() != Phase::Validating {
                return (state, Vec::new());
            }
            match result {
                Ok(file) => match validate_file(Some(&file)) {
                    Ok(_) => state.select_file(file),
                    Err(err) => state.reject_file(err.to_string()),
                },
                Err(message) => state.reject_file(message),
            }
            Vec::new()
        }
        Msg::SubmitClicked => {
            if state.phase().is_in_flight() || state.phase() == Phase::Validating {
                return (state, Vec::new());
            }
            match validate_file(state.selected()) {
                Ok(file) => {
                    let file = file.clone();
                    state.begin_upload();
                    vec![Effect::Upload { file }]
                }
                Err(err) => {
                    state.fail(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::UploadFinished(result) => {
            if state.phase() != Phase::Uploading {
                return (state, Vec::new());
            }
            match result {
                Ok(task_id) => {
                    state.start_streaming(task_id.clone());
                    vec![Effect::Subscribe { task_id }]
                }
                Err(message) => {
                    state.fail(message);
                    Vec::new()
                }
            }
        }
        Msg::StreamStatus { task_id, status } => {
            if state.task_id() == Some(task_id.as_str()) {
                state.set_stream_status(status);
            }
            Vec::new()
        }
        Msg::StreamEvent(event) => apply_task_update(&mut state, event),
        Msg::ResultsFetched { task_id, result } => {
            if state.phase() != Phase::Completed || state.task_id() != Some(task_id.as_str()) {
                return (state, Vec::new());
            }
            match result {
                Ok(results) => state.store_results(results),
                Err(message) => state.fail(message),
            }
            Vec::new()
        }
        Msg::ViewClosed => {
            if state.task_id().is_some() {
                vec![Effect::Unsubscribe]
            } else {
                Vec::new()
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_task_update(state: &mut AppState, event: TaskUpdate) -> Vec<Effect> {
    if state.phase() != Phase::Streaming {
        return Vec::new();
    }
    let Some(active) = state.task_id().map(ToOwned::to_owned) else {
        return Vec::new();
    };
    // Events without an id cannot be attributed; events for another task are stale.
    if event.task_id().is_some_and(|id| !id.is_empty() && id != active) {
        return Vec::new();
    }

    match event {
        TaskUpdate::Progress {
            progress,
            current_frame,
            total_frames,
            message,
            ..
        } => {
            state.apply_progress(progress, current_frame, total_frames, message);
            Vec::new()
        }
        TaskUpdate::Snapshot {
            status,
            progress,
            current_frame,
            total_frames,
            message,
            ..
        } => match status.as_deref() {
            Some("completed") => {
                state.complete(message);
                vec![Effect::FetchResults { task_id: active }]
            }
            Some("failed") => {
                state.fail("Processing failed".to_string());
                Vec::new()
            }
            _ => {
                state.apply_progress(progress, current_frame, total_frames, message);
                Vec::new()
            }
        },
        TaskUpdate::Completed { message, .. } => {
            state.complete(message);
            vec![Effect::FetchResults { task_id: active }]
        }
        TaskUpdate::Failed { error_message, .. } => {
            state.fail(error_message.unwrap_or_else(|| "Processing failed".to_string()));
            Vec::new()
        }
        TaskUpdate::Unknown => Vec::new(),
    }
}
