//! Debug console for runtime commands.
//!
//! This module provides:
//! - Command parsing and dispatch
//! - Command history and a bounded output log
//! - Built-in commands (help, clear, history, echo)
//! - Particle commands (`particles [bool]`, `particle_stats`)

use std::collections::VecDeque;

use ember_particles::{AnimationService, ParticleSystem};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default maximum history entries.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Default maximum output lines.
pub const DEFAULT_OUTPUT_SIZE: usize = 1000;

/// Usage text of the `particles` command.
pub const PARTICLES_USAGE: &str = "Turns particle system on/off. If nothing passed, then toggles it.";

/// Output message level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputLevel {
    /// Normal output
    #[default]
    Info,
    /// Success/confirmation message
    Success,
    /// Warning message
    Warning,
    /// Error message
    Error,
    /// System message
    System,
    /// User command echo
    Command,
}

impl OutputLevel {
    /// Short tag used when the console is mirrored to a text log.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            OutputLevel::Info => "info",
            OutputLevel::Success => "ok",
            OutputLevel::Warning => "warn",
            OutputLevel::Error => "error",
            OutputLevel::System => "system",
            OutputLevel::Command => "cmd",
        }
    }
}

/// A line of output in the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    /// The text content
    pub text: String,
    /// Output level
    pub level: OutputLevel,
}

impl OutputLine {
    /// Creates a new output line.
    #[must_use]
    pub fn new(text: impl Into<String>, level: OutputLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }

    /// Creates an info line.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, OutputLevel::Info)
    }

    /// Creates a success line.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, OutputLevel::Success)
    }

    /// Creates a warning line.
    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, OutputLevel::Warning)
    }

    /// Creates an error line.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, OutputLevel::Error)
    }

    /// Creates a system line.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(text, OutputLevel::System)
    }

    /// Creates a command echo line.
    #[must_use]
    pub fn command(text: impl Into<String>) -> Self {
        Self::new(text, OutputLevel::Command)
    }
}

/// Command definition for registration.
#[derive(Debug, Clone)]
pub struct CommandDef {
    /// Command name (what user types)
    pub name: String,
    /// Brief description
    pub description: String,
    /// Usage syntax
    pub usage: String,
    /// Category for grouping
    pub category: String,
}

impl CommandDef {
    /// Creates a new command definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        usage: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            usage: usage.into(),
            category: "General".to_string(),
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Output lines to display
    pub output: Vec<OutputLine>,
    /// Whether the command was successful
    pub success: bool,
}

impl CommandResult {
    /// Creates a successful result with output.
    #[must_use]
    pub fn ok(output: Vec<OutputLine>) -> Self {
        Self {
            output,
            success: true,
        }
    }

    /// Creates a successful result with a single message.
    #[must_use]
    pub fn ok_msg(msg: impl Into<String>) -> Self {
        Self {
            output: vec![OutputLine::success(msg)],
            success: true,
        }
    }

    /// Creates an error result.
    #[must_use]
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            output: vec![OutputLine::error(msg)],
            success: false,
        }
    }

    /// Creates a result with multiple output lines.
    #[must_use]
    pub fn with_lines(lines: Vec<OutputLine>) -> Self {
        let success = !lines.iter().any(|l| l.level == OutputLevel::Error);
        Self {
            output: lines,
            success,
        }
    }
}

/// Configuration for the debug console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Maximum command history entries
    pub max_history: usize,
    /// Maximum output lines
    pub max_output: usize,
    /// Mirror every output line to the tracing log
    pub echo_to_log: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_HISTORY_SIZE,
            max_output: DEFAULT_OUTPUT_SIZE,
            echo_to_log: true,
        }
    }
}

/// Parses a console boolean argument.
#[must_use]
pub fn parse_bool(arg: &str) -> Option<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Headless debug console.
#[derive(Debug)]
pub struct DebugConsole {
    /// Configuration
    pub config: ConsoleConfig,
    /// Command history, most recent first
    history: VecDeque<String>,
    /// Output lines
    output: VecDeque<OutputLine>,
    /// Registered commands
    commands: Vec<CommandDef>,
}

impl Default for DebugConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugConsole {
    /// Creates a new debug console.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ConsoleConfig::default())
    }

    /// Creates with custom configuration.
    #[must_use]
    pub fn with_config(config: ConsoleConfig) -> Self {
        let mut console = Self {
            config,
            history: VecDeque::new(),
            output: VecDeque::new(),
            commands: Vec::new(),
        };

        console.register_builtin_commands();
        console.print_system("Debug console initialized. Type 'help' for commands.");

        console
    }

    fn register_builtin_commands(&mut self) {
        self.register_command(CommandDef::new(
            "help",
            "Show available commands",
            "help [command]",
        ));
        self.register_command(CommandDef::new(
            "clear",
            "Clear the console output",
            "clear",
        ));
        self.register_command(CommandDef::new(
            "history",
            "Show command history",
            "history",
        ));
        self.register_command(
            CommandDef::new("echo", "Print a message", "echo <message>").with_category("Utility"),
        );
        self.register_command(
            CommandDef::new("particles", PARTICLES_USAGE, "particles [bool]")
                .with_category("Particles"),
        );
        self.register_command(
            CommandDef::new("particle_stats", "Show particle system monitors", "particle_stats")
                .with_category("Particles"),
        );
    }

    fn register_command(&mut self, cmd: CommandDef) {
        if !self.commands.iter().any(|c| c.name == cmd.name) {
            self.commands.push(cmd);
        }
    }

    /// Parses and runs one command line against the particle system.
    ///
    /// The command is echoed, recorded in history and its output appended
    /// to the log. The result is also returned to the caller.
    pub fn execute<A: AnimationService>(
        &mut self,
        input: &str,
        particles: &mut ParticleSystem<A>,
    ) -> CommandResult {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return CommandResult::ok(vec![]);
        }

        debug!("Console command: {}", trimmed);
        self.print_command(trimmed);
        self.add_to_history(trimmed.to_string());

        let result = self.dispatch(trimmed, particles);
        self.print_result(result.clone());
        result
    }

    fn dispatch<A: AnimationService>(
        &mut self,
        cmd: &str,
        particles: &mut ParticleSystem<A>,
    ) -> CommandResult {
        let parts: Vec<&str> = cmd.split_whitespace().collect();
        let Some(command) = parts.first() else {
            return CommandResult::ok(vec![]);
        };
        let args = &parts[1..];

        match *command {
            "help" => self.cmd_help(args),
            "clear" => {
                self.clear();
                CommandResult::ok(vec![])
            },
            "history" => self.cmd_history(),
            "echo" => CommandResult::ok_msg(args.join(" ")),
            "particles" => Self::cmd_particles(args, particles),
            "particle_stats" => Self::cmd_particle_stats(particles),
            other => CommandResult::err(format!("Unknown command: {other}")),
        }
    }

    /// Help command implementation.
    fn cmd_help(&self, args: &[&str]) -> CommandResult {
        if let Some(cmd_name) = args.first() {
            if let Some(cmd) = self.commands.iter().find(|c| c.name == *cmd_name) {
                CommandResult::ok(vec![
                    OutputLine::info(format!("{}: {}", cmd.name, cmd.description)),
                    OutputLine::info(format!("Usage: {}", cmd.usage)),
                    OutputLine::info(format!("Category: {}", cmd.category)),
                ])
            } else {
                CommandResult::err(format!("Unknown command: {cmd_name}"))
            }
        } else {
            let mut lines = vec![OutputLine::info("Available commands:")];
            for cmd in &self.commands {
                lines.push(OutputLine::info(format!(
                    "  {} - {}",
                    cmd.name, cmd.description
                )));
            }
            lines.push(OutputLine::info(""));
            lines.push(OutputLine::info("Type 'help <command>' for more info."));
            CommandResult::ok(lines)
        }
    }

    /// History command implementation.
    fn cmd_history(&self) -> CommandResult {
        if self.history.is_empty() {
            return CommandResult::ok_msg("No command history.");
        }

        let mut lines = vec![OutputLine::info("Command history:")];
        for (i, cmd) in self.history.iter().enumerate() {
            lines.push(OutputLine::info(format!("  {}: {}", i + 1, cmd)));
        }
        CommandResult::ok(lines)
    }

    /// `particles [bool]`: toggles or sets the global flag.
    fn cmd_particles<A: AnimationService>(
        args: &[&str],
        particles: &mut ParticleSystem<A>,
    ) -> CommandResult {
        let enabled = match args {
            [] => particles.toggle_enabled(),
            [arg] => match parse_bool(arg) {
                Some(value) => {
                    particles.set_enabled(value);
                    value
                },
                None => {
                    return CommandResult::with_lines(vec![
                        OutputLine::error(format!("Not a boolean: {arg}")),
                        OutputLine::info(PARTICLES_USAGE),
                    ])
                },
            },
            _ => {
                return CommandResult::with_lines(vec![
                    OutputLine::error("Too many arguments"),
                    OutputLine::info(PARTICLES_USAGE),
                ])
            },
        };

        CommandResult::ok_msg(format!(
            "Particles are {}",
            if enabled { "on" } else { "off" }
        ))
    }

    fn cmd_particle_stats<A: AnimationService>(particles: &ParticleSystem<A>) -> CommandResult {
        let mut lines = vec![OutputLine::info(format!(
            "particles: {} (detail {})",
            if particles.is_enabled() { "on" } else { "off" },
            particles.detail_level()
        ))];
        lines.extend(
            particles
                .stats()
                .summary_lines()
                .into_iter()
                .map(|line| OutputLine::info(format!("  {line}"))),
        );
        CommandResult::ok(lines)
    }

    /// Adds a command to history.
    fn add_to_history(&mut self, cmd: String) {
        // Don't add duplicates of last command
        if self.history.front() == Some(&cmd) {
            return;
        }

        self.history.push_front(cmd);

        while self.history.len() > self.config.max_history {
            self.history.pop_back();
        }
    }

    fn push_line(&mut self, line: OutputLine) {
        if self.config.echo_to_log && !line.text.is_empty() {
            match line.level {
                OutputLevel::Warning | OutputLevel::Error => {
                    warn!(target: "ember::console", "[{}] {}", line.level.tag(), line.text);
                },
                _ => info!(target: "ember::console", "[{}] {}", line.level.tag(), line.text),
            }
        }
        self.output.push_back(line);
        while self.output.len() > self.config.max_output {
            self.output.pop_front();
        }
    }

    /// Prints an info message.
    pub fn print_info(&mut self, msg: impl Into<String>) {
        self.push_line(OutputLine::info(msg));
    }

    /// Prints a warning message.
    pub fn print_warning(&mut self, msg: impl Into<String>) {
        self.push_line(OutputLine::warning(msg));
    }

    /// Prints a system message.
    pub fn print_system(&mut self, msg: impl Into<String>) {
        self.push_line(OutputLine::system(msg));
    }

    fn print_command(&mut self, cmd: &str) {
        self.push_line(OutputLine::command(format!("> {cmd}")));
    }

    /// Prints command result output.
    pub fn print_result(&mut self, result: CommandResult) {
        for line in result.output {
            self.push_line(line);
        }
    }

    /// Clears the output.
    pub fn clear(&mut self) {
        self.output.clear();
    }

    /// Returns the command history.
    #[must_use]
    pub fn get_history(&self) -> &VecDeque<String> {
        &self.history
    }

    /// Returns the output lines.
    #[must_use]
    pub fn get_output(&self) -> &VecDeque<OutputLine> {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_particles::{AnimationLibrary, ParticleConfig, ParticleInfo, ParticleType};
    use glam::Vec3;

    fn particles() -> ParticleSystem<AnimationLibrary> {
        ParticleSystem::new(ParticleConfig::default(), AnimationLibrary::new())
    }

    fn quiet_console() -> DebugConsole {
        DebugConsole::with_config(ConsoleConfig {
            echo_to_log: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_parse_bool() {
        for arg in ["1", "on", "TRUE", "yes"] {
            assert_eq!(parse_bool(arg), Some(true), "{arg}");
        }
        for arg in ["0", "Off", "false", "no"] {
            assert_eq!(parse_bool(arg), Some(false), "{arg}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_particles_without_argument_toggles() {
        let mut console = quiet_console();
        let mut system = particles();
        assert!(system.is_enabled());

        assert!(console.execute("particles", &mut system).success);
        assert!(!system.is_enabled());
        assert!(console.execute("particles", &mut system).success);
        assert!(system.is_enabled());
    }

    #[test]
    fn test_particles_with_argument_sets() {
        let mut console = quiet_console();
        let mut system = particles();

        console.execute("particles off", &mut system);
        assert!(!system.is_enabled());
        console.execute("particles off", &mut system);
        assert!(!system.is_enabled());
        let result = console.execute("particles 1", &mut system);
        assert!(system.is_enabled());
        assert_eq!(result.output[0].text, "Particles are on");
    }

    #[test]
    fn test_particles_bad_argument_shows_usage() {
        let mut console = quiet_console();
        let mut system = particles();

        let result = console.execute("particles sometimes", &mut system);
        assert!(!result.success);
        assert!(result.output.iter().any(|line| line.text == PARTICLES_USAGE));
        assert!(system.is_enabled());
    }

    #[test]
    fn test_particle_stats_reports_live_count() {
        let mut console = quiet_console();
        let mut system = particles();
        for _ in 0..3 {
            system.create(&ParticleInfo::new(
                Vec3::ZERO,
                Vec3::ZERO,
                1.0,
                1.0,
                ParticleType::Debug,
            ));
        }

        let result = console.execute("particle_stats", &mut system);
        assert!(result.success);
        assert!(result
            .output
            .iter()
            .any(|line| line.text.contains("live particles: 3")));
    }

    #[test]
    fn test_unknown_command() {
        let mut console = quiet_console();
        let mut system = particles();
        let result = console.execute("warp 9", &mut system);
        assert!(!result.success);
        assert_eq!(result.output[0].text, "Unknown command: warp");
    }

    #[test]
    fn test_help_lists_particle_commands() {
        let console = quiet_console();
        let result = console.cmd_help(&[]);
        assert!(result.success);
        assert!(result.output.iter().any(|l| l.text.starts_with("  particles ")));

        let result = console.cmd_help(&["particles"]);
        assert_eq!(result.output[1].text, "Usage: particles [bool]");

        assert!(!console.cmd_help(&["nonexistent"]).success);
    }

    #[test]
    fn test_history_skips_repeats() {
        let mut console = quiet_console();
        let mut system = particles();
        console.execute("echo one", &mut system);
        console.execute("echo two", &mut system);
        console.execute("echo two", &mut system);

        assert_eq!(console.get_history().len(), 2);
        assert_eq!(console.get_history()[0], "echo two");
    }

    #[test]
    fn test_clear_and_output_trim() {
        let mut console = quiet_console();
        console.config.max_output = 5;
        for i in 0..10 {
            console.print_info(format!("Message {i}"));
        }
        assert_eq!(console.get_output().len(), 5);

        let mut system = particles();
        console.execute("clear", &mut system);
        assert!(console.get_output().is_empty());
    }

    #[test]
    fn test_clear_command_empties_output() {
        let mut console = quiet_console();
        let mut system = particles();
        console.print_warning("careful");
        assert_eq!(
            console.get_output().back().map(|line| line.level),
            Some(OutputLevel::Warning)
        );

        let result = console.execute("clear", &mut system);
        assert!(result.success);
        assert!(console.get_output().is_empty());
        assert_eq!(console.get_history()[0], "clear");
    }

    #[test]
    fn test_empty_input_is_ignored() {
        let mut console = quiet_console();
        let mut system = particles();
        let before = console.get_output().len();
        assert!(console.execute("   ", &mut system).success);
        assert_eq!(console.get_output().len(), before);
        assert!(console.get_history().is_empty());
    }

    #[test]
    fn test_console_config_from_toml() {
        let config: ConsoleConfig = toml::from_str("max_history = 3").expect("parse");
        assert_eq!(config.max_history, 3);
        assert_eq!(config.max_output, DEFAULT_OUTPUT_SIZE);
    }

    #[test]
    fn test_command_result_with_lines() {
        let result = CommandResult::with_lines(vec![OutputLine::info("a"), OutputLine::success("b")]);
        assert!(result.success);
        assert!(!CommandResult::with_lines(vec![OutputLine::error("x")]).success);
    }
}
