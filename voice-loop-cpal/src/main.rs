//! voice-loop - terminal shell around the record-then-play session.
//!
//! Enter toggles listening; `q` quits. The label printed after every state
//! change is what a button in a graphical shell would show.

mod cli;

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use voice_loop_core::{
    event_channel, AudioSessionPlatform, CaptureSession, CaptureSummary, SessionController, SessionDelegate,
    SessionError, SessionState,
};
use voice_loop_cpal::{CpalAudioSession, CpalPlayer, CpalRecorder};

/// SessionDelegate that prints notifications to the terminal.
struct TerminalDelegate;

impl SessionDelegate for TerminalDelegate {
    fn on_state_changed(&self, state: SessionState) {
        println!("[{}] {}", state.button_label(), state);
    }

    fn on_error(&self, error: &SessionError) {
        eprintln!("error ({:?}): {}", error.kind(), error);
    }

    fn on_capture_finished(&self, summary: &CaptureSummary) {
        println!(
            "captured {:.2}s from {} -> {} (sha256 {})",
            summary.duration_secs,
            summary
                .input_route
                .as_ref()
                .map(|r| r.name.as_str())
                .unwrap_or("default input"),
            summary.file_path.display(),
            summary.checksum
        );
    }
}

fn main() -> ExitCode {
    let args = cli::Args::parse();
    cli::init_logging(&args);

    let config = match args.configuration() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let platform = Arc::new(CpalAudioSession::new());

    if args.list_inputs {
        for route in platform.available_inputs() {
            println!(
                "{}{} [{:?}]",
                if route.is_default { "* " } else { "  " },
                route.name,
                route.kind
            );
        }
        return ExitCode::SUCCESS;
    }

    let (sink, events) = event_channel();
    let mut session = CaptureSession::new(
        Arc::clone(&platform) as Arc<dyn AudioSessionPlatform>,
        Box::new(CpalRecorder::new(Arc::clone(&platform))),
        Box::new(CpalPlayer::new()),
        config,
        sink,
    );
    session.set_delegate(Arc::new(TerminalDelegate));

    let handle = match SessionController::spawn(session, events) {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("Failed to start session thread: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!(
        "[{}] press Enter to toggle, q + Enter to quit",
        SessionState::Idle.button_label()
    );
    for line in io::stdin().lock().lines() {
        match line {
            Ok(line) if matches!(line.trim(), "q" | "quit") => break,
            Ok(_) => handle.toggle(),
            Err(e) => {
                log::error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    handle.shutdown();
    ExitCode::SUCCESS
}
