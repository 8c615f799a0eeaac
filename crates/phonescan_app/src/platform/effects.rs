use std::time::Duration;

use phonescan_core::{
    Effect, Msg, PhoneNumberRow, SelectedFile, StreamStatus, TaskResultsView, TaskUpdate,
};
use phonescan_engine::{
    inspect_file, EngineEvent, EngineHandle, StreamUpdate, TaskEvent, TaskResults, UploadFile,
};
use phonescan_logging::{scan_info, scan_warn};

/// Carries core effects out on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    last_results: Option<TaskResults>,
    stream_ended: bool,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            last_results: None,
            stream_ended: false,
        }
    }

    /// Runs `effects`; returns messages that are available right away.
    pub fn run(&mut self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut immediate = Vec::new();
        for effect in effects {
            match effect {
                Effect::InspectFile { path } => {
                    let result = inspect_file(&path)
                        .map(selected_from_upload)
                        .map_err(|err| err.to_string());
                    immediate.push(Msg::FileInspected(result));
                }
                Effect::Upload { file } => {
                    scan_info!("Upload {} ({} bytes)", file.name, file.size);
                    self.engine.upload(upload_from_selected(&file));
                }
                Effect::Subscribe { task_id } => {
                    self.stream_ended = false;
                    self.engine.subscribe(task_id);
                }
                Effect::Unsubscribe => self.engine.unsubscribe(),
                Effect::FetchResults { task_id } => self.engine.fetch_results(task_id),
            }
        }
        immediate
    }

    pub fn fetch_results(&self, task_id: &str) {
        self.engine.fetch_results(task_id);
    }

    pub fn next_event(&self, timeout: Duration) -> Option<EngineEvent> {
        self.engine.recv_timeout(timeout)
    }

    /// Maps an engine event to a core message, keeping fetched results for export.
    pub fn translate(&mut self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::UploadCompleted(result) => Msg::UploadFinished(
                result
                    .map(|response| response.task_id)
                    .map_err(|err| {
                        scan_warn!("Upload failed ({}): {}", err.kind, err.message);
                        err.message
                    }),
            ),
            EngineEvent::Stream(update) => {
                if matches!(
                    update,
                    StreamUpdate::Closed { .. } | StreamUpdate::Failed { .. }
                ) {
                    self.stream_ended = true;
                }
                msg_from_stream(update)
            }
            EngineEvent::ResultsFetched { task_id, result } => {
                let result = match result {
                    Ok(results) => {
                        let view = results_view(&results);
                        self.last_results = Some(results);
                        Ok(view)
                    }
                    Err(err) => {
                        scan_warn!("Fetching results of {} failed: {}", task_id, err);
                        Err(err.message)
                    }
                };
                Msg::ResultsFetched { task_id, result }
            }
        }
    }

    /// True once the stream closed or failed since the last subscription.
    pub fn stream_ended(&self) -> bool {
        self.stream_ended
    }

    pub fn last_results(&self) -> Option<&TaskResults> {
        self.last_results.as_ref()
    }
}

fn msg_from_stream(update: StreamUpdate) -> Msg {
    match update {
        StreamUpdate::Opened { task_id } => Msg::StreamStatus {
            task_id,
            status: StreamStatus::Open,
        },
        StreamUpdate::Closed { task_id } => Msg::StreamStatus {
            task_id,
            status: StreamStatus::Closed,
        },
        StreamUpdate::Failed { task_id, .. } => Msg::StreamStatus {
            task_id,
            status: StreamStatus::Error,
        },
        StreamUpdate::Event { event, .. } => Msg::StreamEvent(task_update(event)),
    }
}

pub(crate) fn task_update(event: TaskEvent) -> TaskUpdate {
    match event {
        TaskEvent::TaskStatus(p) => TaskUpdate::Snapshot {
            task_id: p.task_id,
            status: p.status,
            progress: p.progress,
            current_frame: p.current_frame,
            total_frames: p.total_frames,
            message: p.message,
        },
        TaskEvent::ProgressUpdate(p) => TaskUpdate::Progress {
            task_id: p.task_id,
            progress: p.progress,
            current_frame: p.current_frame,
            total_frames: p.total_frames,
            message: p.message,
        },
        TaskEvent::TaskCompleted(p) => TaskUpdate::Completed {
            task_id: p.task_id,
            message: p.message,
            phone_numbers_count: p.phone_numbers_count,
        },
        TaskEvent::TaskFailed(p) => TaskUpdate::Failed {
            task_id: p.task_id,
            error_message: p.error_message,
        },
        TaskEvent::Unknown => TaskUpdate::Unknown,
    }
}

pub(crate) fn results_view(results: &TaskResults) -> TaskResultsView {
    TaskResultsView {
        status: results.status.clone(),
        total_phone_numbers: results.total_phone_numbers,
        phone_numbers: results
            .phone_numbers
            .iter()
            .map(|record| PhoneNumberRow {
                e164_number: record.e164_number.clone(),
                national_number: record.national_number.clone(),
                first_seen_seconds: record.first_seen_seconds,
                frame_count: record.frame_count,
                raw_text_examples: record.raw_text_examples.clone(),
            })
            .collect(),
    }
}

fn selected_from_upload(file: UploadFile) -> SelectedFile {
    SelectedFile {
        path: file.path,
        name: file.file_name,
        media_type: file.media_type,
        size: file.size,
    }
}

fn upload_from_selected(file: &SelectedFile) -> UploadFile {
    UploadFile {
        path: file.path.clone(),
        file_name: file.name.clone(),
        media_type: file.media_type.clone(),
        size: file.size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phonescan_engine::{decode_event, PhoneNumberRecord};
    use pretty_assertions::assert_eq;

    #[test]
    fn progress_event_keeps_absent_fields_absent() {
        let event =
            decode_event(r#"{"type":"progress_update","task_id":"abc123","progress":55}"#).unwrap();
        assert_eq!(
            task_update(event),
            TaskUpdate::Progress {
                task_id: "abc123".to_string(),
                progress: Some(55.0),
                current_frame: None,
                total_frames: None,
                message: None,
            }
        );
    }

    #[test]
    fn snapshot_and_failure_map_to_core_updates() {
        let snapshot = decode_event(
            r#"{"type":"task_status","task_id":"abc123","status":"completed","progress":100}"#,
        )
        .unwrap();
        assert!(matches!(
            task_update(snapshot),
            TaskUpdate::Snapshot { status: Some(ref s), .. } if s == "completed"
        ));

        let failed = decode_event(
            r#"{"type":"task_failed","task_id":"abc123","error_message":"decode error"}"#,
        )
        .unwrap();
        assert_eq!(
            task_update(failed),
            TaskUpdate::Failed {
                task_id: "abc123".to_string(),
                error_message: Some("decode error".to_string()),
            }
        );
    }

    #[test]
    fn results_are_copied_in_order() {
        let results = TaskResults {
            task_id: Some("abc123".to_string()),
            status: "completed".to_string(),
            total_phone_numbers: 2,
            phone_numbers: vec![
                PhoneNumberRecord {
                    e164_number: "+14155550123".to_string(),
                    national_number: "(415) 555-0123".to_string(),
                    first_seen_seconds: 1.5,
                    frame_count: 4,
                    raw_text_examples: "415 555 0123".to_string(),
                },
                PhoneNumberRecord {
                    e164_number: "+442079460958".to_string(),
                    national_number: "020 7946 0958".to_string(),
                    first_seen_seconds: 9.0,
                    frame_count: 1,
                    raw_text_examples: String::new(),
                },
            ],
        };

        let view = results_view(&results);
        assert_eq!(view.total_phone_numbers, 2);
        let numbers: Vec<_> = view
            .phone_numbers
            .iter()
            .map(|row| row.e164_number.as_str())
            .collect();
        assert_eq!(numbers, ["+14155550123", "+442079460958"]);
    }
}
