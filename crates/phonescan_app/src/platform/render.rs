//! Text rendering of the view model and of the query commands.

use phonescan_core::{AppViewModel, Phase, TaskResultsView};
use phonescan_engine::{TaskList, TaskStatusReport};

pub const TITLE: &str = "Video Phone Number Extractor";
pub const RESULTS_TITLE: &str = "Results Page";
pub const RESULTS_PLACEHOLDER: &str = "This page will show detailed results and progress tracking.";
pub const SELECT_HINT: &str = "Select a video file with --file <PATH> to start.";

pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(file) = &view.selected_file {
        lines.push(format!("Selected: {} ({:.2} MB)", file.name, file.size_mb));
    }
    if matches!(view.phase, Phase::Uploading | Phase::Streaming) {
        lines.push(view.submit_label().to_string());
    }

    if let Some(stream) = &view.stream {
        let status = if stream.connected {
            "Connected"
        } else {
            "Disconnected"
        };
        lines.push(format!("WebSocket Status: {status}"));
        if let Some(error) = &stream.error {
            lines.push(format!("WebSocket Error: {error}"));
        }
    }

    if view.shows_progress() {
        lines.push(format!("Progress: {}%", view.progress));
        if let Some(percent) = view.frame_percent() {
            lines.push(format!(
                "Frames: {} / {} ({:.1}%)",
                view.current_frame, view.total_frames, percent
            ));
        }
        if !view.message.is_empty() {
            lines.push(format!("Status: {}", view.message));
        }
    }

    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }
    if let Some(results) = &view.results {
        lines.extend(render_results(results));
    }
    lines
}

pub fn render_results(results: &TaskResultsView) -> Vec<String> {
    let mut lines = vec![
        "Processing Complete!".to_string(),
        format!("Task status: {}", results.status),
        format!("Total Phone Numbers Found: {}", results.total_phone_numbers),
    ];
    if !results.phone_numbers.is_empty() {
        lines.push("Found Phone Numbers:".to_string());
    }
    for row in &results.phone_numbers {
        lines.push(format!("  {}  {}", row.e164_number, row.national_number));
        lines.push(format!(
            "    first seen {:.1}s, frames: {}",
            row.first_seen_seconds, row.frame_count
        ));
        if !row.raw_text_examples.is_empty() {
            lines.push(format!("    examples: {}", row.raw_text_examples));
        }
    }
    lines
}

pub fn render_status(report: &TaskStatusReport) -> Vec<String> {
    let mut lines = vec![
        format!("Task: {}", report.task_id),
        format!("Status: {}", report.status),
        format!("Progress: {}%", report.progress),
    ];
    if report.total_frames > 0 {
        lines.push(format!(
            "Frames: {} / {}",
            report.current_frame, report.total_frames
        ));
    }
    let optional = [
        ("Message", &report.current_message),
        ("Video", &report.video_file),
        ("Created", &report.created_at),
        ("Started", &report.started_at),
        ("Completed", &report.completed_at),
        ("Error", &report.error_message),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines
}

pub fn render_task_list(list: &TaskList) -> Vec<String> {
    if list.tasks.is_empty() {
        return vec!["No tasks.".to_string()];
    }
    let mut lines: Vec<String> = list
        .tasks
        .iter()
        .map(|task| {
            format!(
                "{:<38} {:<11} {:<26} {}",
                task.task_id,
                task.status,
                task.created_at.as_deref().unwrap_or("-"),
                task.video_file.as_deref().unwrap_or("-")
            )
        })
        .collect();
    lines.push(format!("{} task(s)", list.total));
    lines
}

/// Lines of `next` that were not already shown in `prev`.
pub fn changed_lines<'a>(prev: &[String], next: &'a [String]) -> Vec<&'a str> {
    next.iter()
        .filter(|line| !prev.contains(line))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use phonescan_core::{PhoneNumberRow, SelectedFileView, StreamIndicator};
    use phonescan_engine::TaskSummary;
    use pretty_assertions::assert_eq;

    fn streaming_view() -> AppViewModel {
        AppViewModel {
            phase: Phase::Streaming,
            selected_file: Some(SelectedFileView {
                name: "clip.mp4".to_string(),
                size_mb: 12.5,
            }),
            task_id: Some("abc123".to_string()),
            in_flight: true,
            stream: Some(StreamIndicator {
                connected: true,
                error: None,
            }),
            progress: 55.0,
            current_frame: 110,
            total_frames: 200,
            message: "Processing frame 110/200".to_string(),
            ..AppViewModel::default()
        }
    }

    #[test]
    fn streaming_view_shows_progress_panel() {
        assert_eq!(
            render(&streaming_view()),
            vec![
                "Selected: clip.mp4 (12.50 MB)",
                "Processing Video...",
                "WebSocket Status: Connected",
                "Progress: 55%",
                "Frames: 110 / 200 (55.0%)",
                "Status: Processing frame 110/200",
            ]
        );
    }

    #[test]
    fn frames_line_needs_a_total() {
        let view = AppViewModel {
            total_frames: 0,
            current_frame: 3,
            ..streaming_view()
        };
        assert!(render(&view).iter().all(|line| !line.starts_with("Frames")));
    }

    #[test]
    fn failed_view_shows_error_without_progress() {
        let view = AppViewModel {
            phase: Phase::Failed,
            in_flight: false,
            stream: Some(StreamIndicator {
                connected: false,
                error: None,
            }),
            error: Some("decode error".to_string()),
            ..streaming_view()
        };
        let lines = render(&view);

        assert!(lines.contains(&"Error: decode error".to_string()));
        assert!(lines.contains(&"WebSocket Status: Disconnected".to_string()));
        assert!(lines.iter().all(|line| !line.starts_with("Progress")));
    }

    #[test]
    fn results_list_every_number() {
        let results = TaskResultsView {
            status: "completed".to_string(),
            total_phone_numbers: 1,
            phone_numbers: vec![PhoneNumberRow {
                e164_number: "+14155550123".to_string(),
                national_number: "(415) 555-0123".to_string(),
                first_seen_seconds: 3.5,
                frame_count: 12,
                raw_text_examples: "call 415 555 0123".to_string(),
            }],
        };
        assert_eq!(
            render_results(&results),
            vec![
                "Processing Complete!",
                "Task status: completed",
                "Total Phone Numbers Found: 1",
                "Found Phone Numbers:",
                "  +14155550123  (415) 555-0123",
                "    first seen 3.5s, frames: 12",
                "    examples: call 415 555 0123",
            ]
        );
    }

    #[test]
    fn empty_task_list() {
        let list = TaskList {
            tasks: Vec::new(),
            total: 0,
        };
        assert_eq!(render_task_list(&list), vec!["No tasks."]);

        let list = TaskList {
            tasks: vec![TaskSummary {
                task_id: "t1".to_string(),
                status: "completed".to_string(),
                created_at: None,
                completed_at: None,
                video_file: None,
            }],
            total: 1,
        };
        let lines = render_task_list(&list);
        assert!(lines[0].starts_with("t1 "));
        assert_eq!(lines[1], "1 task(s)");
    }

    #[test]
    fn only_new_lines_are_reported() {
        let prev = vec!["WebSocket Status: Connected".to_string(), "Progress: 10%".to_string()];
        let next = vec!["WebSocket Status: Connected".to_string(), "Progress: 55%".to_string()];
        assert_eq!(changed_lines(&prev, &next), vec!["Progress: 55%"]);
    }
}
