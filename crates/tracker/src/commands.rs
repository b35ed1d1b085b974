//! The command interpreter.
//!
//! A small alphabet of single-character commands, each mapped one-to-one
//! onto an engine mutation:
//!
//! | input | action |
//! |-------|--------|
//! | `c`   | calibrate at the last known face position |
//! | `s`   | prompt for a new sensitivity value |
//! | `m`   | toggle system audio / eqMac |
//! | `f`   | toggle the cosmetic cartoon filter |
//! | `q`   | stop the tracker |
//!
//! Commands arrive from two places (stdin lines and preview-window key
//! presses) and both feed the same state machine, so there is exactly one
//! copy of the mutation logic. Unrecognized input is ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::engine::SharedEngine;

/// A recognized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKey {
    Calibrate,
    Sensitivity,
    ToggleMode,
    ToggleFilter,
    Quit,
}

/// Map a key press to a command. Case-sensitive.
pub fn parse_key(key: char) -> Option<CommandKey> {
    match key {
        'c' => Some(CommandKey::Calibrate),
        's' => Some(CommandKey::Sensitivity),
        'm' => Some(CommandKey::ToggleMode),
        'f' => Some(CommandKey::ToggleFilter),
        'q' => Some(CommandKey::Quit),
        _ => None,
    }
}

/// Map a text-channel line to a command: one command character per line,
/// surrounding whitespace tolerated.
pub fn parse_line(line: &str) -> Option<CommandKey> {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => parse_key(c),
        _ => None,
    }
}

/// Interprets commands from stdin lines and preview key presses.
pub struct CommandInterpreter {
    engine: SharedEngine,
    stop_flag: Arc<AtomicBool>,
    awaiting_sensitivity: bool,
}

impl CommandInterpreter {
    pub fn new(engine: SharedEngine, stop_flag: Arc<AtomicBool>) -> Self {
        Self {
            engine,
            stop_flag,
            awaiting_sensitivity: false,
        }
    }

    /// Whether the interpreter is waiting for a sensitivity value.
    pub fn awaiting_sensitivity(&self) -> bool {
        self.awaiting_sensitivity
    }

    /// Consume commands until the tracker stops.
    ///
    /// Stdin closing does not stop anything; the tracker keeps running and
    /// key presses keep working. The loop ends when the key channel closes
    /// (the session is gone) or after a quit command.
    pub async fn run(mut self, mut keys: mpsc::UnboundedReceiver<char>) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        loop {
            tokio::select! {
                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => self.handle_line(&line),
                    Ok(None) => {
                        tracing::info!("Command input stream closed");
                        stdin_open = false;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Error reading command input");
                        stdin_open = false;
                    }
                },
                key = keys.recv() => match key {
                    Some(key) => self.handle_key(key),
                    None => break,
                },
            }

            if self.stop_flag.load(Ordering::SeqCst) {
                break;
            }
        }
    }

    /// Handle one line from the text channel.
    pub fn handle_line(&mut self, line: &str) {
        if self.awaiting_sensitivity {
            self.handle_sensitivity_input(line);
            return;
        }
        if let Some(command) = parse_line(line) {
            self.dispatch(command);
        }
    }

    /// Handle one key press from the preview window.
    pub fn handle_key(&mut self, key: char) {
        if let Some(command) = parse_key(key) {
            self.dispatch(command);
        }
    }

    fn dispatch(&mut self, command: CommandKey) {
        match command {
            CommandKey::Calibrate => match self.engine.calibrate_at_last_face() {
                Some(face_x) => println!("Calibrated: sweet spot set at position {face_x:.0}"),
                None => println!("Cannot calibrate: no face detected yet"),
            },
            CommandKey::Sensitivity => {
                self.awaiting_sensitivity = true;
                println!(
                    "Current sensitivity is {:.2}. Enter a new value > 0:",
                    self.engine.snapshot().sensitivity
                );
            }
            CommandKey::ToggleMode => {
                let mode = self.engine.toggle_mode();
                println!("Audio balance mode switched to: {}", mode.label());
            }
            CommandKey::ToggleFilter => {
                let enabled = self.engine.toggle_filter();
                println!("Cartoon filter: {}", if enabled { "on" } else { "off" });
            }
            CommandKey::Quit => {
                println!("Quitting...");
                self.stop_flag.store(true, Ordering::SeqCst);
            }
        }
    }

    fn handle_sensitivity_input(&mut self, line: &str) {
        match line.trim().parse::<f64>() {
            Ok(value) => match self.engine.set_sensitivity(value) {
                Ok(()) => {
                    self.awaiting_sensitivity = false;
                    println!("Sensitivity set to {value:.2}");
                }
                Err(e) => println!("{e}. Enter a value > 0:"),
            },
            Err(_) => println!("Not a number. Enter a value > 0:"),
        }
    }
}
