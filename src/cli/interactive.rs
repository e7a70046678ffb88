//! Interactive prompt used when no host is given on the command line

use super::CheckRequest;
use crate::error::{AppError, Result};
use crate::models::check::validate_host;
use crate::nodes::NodeDirectory;
use crate::types::{CheckType, OutputFormat};
use colored::*;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Question-and-answer session over any line reader and writer
pub struct InteractivePrompt<R, W> {
    input: R,
    output: W,
    directory: NodeDirectory,
    use_color: bool,
}

impl<R: BufRead, W: Write> InteractivePrompt<R, W> {
    pub fn new(input: R, output: W, directory: NodeDirectory, use_color: bool) -> Self {
        Self {
            input,
            output,
            directory,
            use_color,
        }
    }

    /// Ask every question and build the request.
    ///
    /// Closed input aborts with `AppError::Cancelled`.
    pub fn run(&mut self) -> Result<CheckRequest> {
        let title = "=== Check-Host Ping & HTTP Tester - Interactive Mode ===";
        let title = self.paint(title, Color::Cyan);
        self.say(&format!("{}\n", title))?;

        let host = self.ask_host()?;
        let check_type = self.ask_check_type()?;
        self.show_node_options()?;

        let selector = self.ask("\nSelect nodes by region [default: ALL]: ")?;
        let selection = self.directory.select(&selector);
        let summary = format!("\nSelected {} nodes from {}", selection.nodes.len(), selection.label);
        let summary = self.paint(&summary, Color::Cyan);
        self.say(&summary)?;

        let save_answer = self.ask("Save results to file? (y/n) [default: n]: ")?.to_lowercase();
        let save = matches!(save_answer.as_str(), "y" | "yes");

        let (format, output) = if save {
            let format = self.ask_format()?;
            let filename = self.ask("Filename [leave empty for auto-generated]: ")?;
            let output = if filename.is_empty() { None } else { Some(PathBuf::from(filename)) };
            (format, output)
        } else {
            (OutputFormat::Json, None)
        };

        Ok(CheckRequest {
            host,
            check_type,
            selection,
            save,
            format,
            output,
        })
    }

    fn ask_host(&mut self) -> Result<String> {
        loop {
            let answer = self.ask("Enter host to check (domain or IP): ")?;
            match validate_host(&answer) {
                Ok(host) => return Ok(host),
                Err(e) => {
                    let message = format!("{}. Please try again.", e);
                    let message = self.paint(&message, Color::Red);
                    self.say(&message)?;
                }
            }
        }
    }

    fn ask_check_type(&mut self) -> Result<CheckType> {
        loop {
            let answer = self.ask("Enter check type (ping/http) [default: ping]: ")?;
            if answer.is_empty() {
                return Ok(CheckType::Ping);
            }
            match answer.parse::<CheckType>() {
                Ok(check_type) => return Ok(check_type),
                Err(_) => {
                    let message = self.paint("Invalid check type. Please enter 'ping' or 'http'.", Color::Red);
                    self.say(&message)?;
                }
            }
        }
    }

    fn ask_format(&mut self) -> Result<OutputFormat> {
        let answer = self.ask("Save format (json/txt) [default: json]: ")?;
        if answer.is_empty() {
            return Ok(OutputFormat::Json);
        }
        match answer.parse::<OutputFormat>() {
            Ok(format) => Ok(format),
            Err(_) => {
                let message = self.paint("Invalid format. Using json instead.", Color::Yellow);
                self.say(&message)?;
                Ok(OutputFormat::Json)
            }
        }
    }

    fn show_node_options(&mut self) -> Result<()> {
        let heading = self.paint("\nAvailable node selections:", Color::Cyan);
        self.say(&heading)?;
        for (selector, description) in self.directory.selector_options() {
            self.say(&format!("  {:<8} - {}", selector, description))?;
        }
        Ok(())
    }

    /// Print a prompt and read one trimmed line
    fn ask(&mut self, prompt: &str) -> Result<String> {
        let prompt = self.paint(prompt, Color::Yellow);
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(AppError::cancelled("Input closed before all questions were answered"));
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }
}
