//! Main application orchestration and execution

use crate::{
    cli::{render_node_list, CheckRequest, Cli, InteractivePrompt},
    client::{CheckHostClient, CheckTransport},
    config::{display_config_summary, load_config, EnvManager},
    error::{AppError, Result},
    executor::{CancelSignal, CheckExecutor, ExecutionConfig},
    logging::LoggerFactory,
    models::{CheckJob, Config, Report},
    nodes::NodeDirectory,
    output::{OutputFormatterFactory, ReportWriter},
    log_debug,
};
use std::io::{self, Write};
use std::sync::Arc;

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
    config: Config,
    directory: NodeDirectory,
    use_color: bool,
    loggers: LoggerFactory,
}

impl App {
    /// Validate the command line and load the layered configuration
    pub fn new(cli: Cli) -> Result<Self> {
        cli.validate().map_err(AppError::config)?;
        let config = load_config(cli.clone())?;
        Ok(Self::with_config(cli, config))
    }

    /// Build an application around an already loaded configuration
    pub fn with_config(cli: Cli, config: Config) -> Self {
        let use_color = cli.use_colors(config.enable_color);
        let loggers = LoggerFactory::new(config.clone());
        Self {
            cli,
            config,
            directory: NodeDirectory::new(),
            use_color,
            loggers,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Work out what to check, asking on stdin when no host was given.
    ///
    /// Returns `None` when the invocation only listed the nodes.
    pub fn resolve_request(&self) -> Result<Option<CheckRequest>> {
        if self.config.debug {
            eprintln!("{}", crate::version_banner());
            eprintln!("{}", display_config_summary(&self.config));
            eprintln!("{}", self.cli.get_config_summary());
            for warning in EnvManager::validate_current_env() {
                eprintln!("{}", warning);
            }
        }

        if self.cli.list_nodes {
            print!("{}", render_node_list(&self.directory));
            return Ok(None);
        }

        if self.cli.is_interactive() {
            let stdin = io::stdin();
            let mut prompt = InteractivePrompt::new(stdin.lock(), io::stdout(), self.directory, self.use_color);
            return prompt.run().map(Some);
        }

        self.cli.to_request(&self.directory).map(Some)
    }

    /// Create an executor over `transport` configured from this app
    pub async fn build_executor(&self, transport: Arc<dyn CheckTransport>) -> CheckExecutor {
        CheckExecutor::new(
            transport,
            ExecutionConfig::from(&self.config),
            self.loggers.create_poll_logger().await,
        )
    }

    /// Run a check against the configured service, printing to stdout
    pub async fn run(&self, request: &CheckRequest, mut cancel: CancelSignal) -> Result<Report> {
        let client = CheckHostClient::from_config(&self.config)?;
        let executor = self.build_executor(Arc::new(client)).await;

        let mut stdout = io::stdout();
        let result = self.execute(&executor, request, &mut cancel, &mut stdout).await;

        if let Err(ref e) = result {
            self.loggers.create_error_logger().await.log_error(e, Some("check run")).await;
        }
        result
    }

    /// Submit, poll, render and optionally save one check
    pub async fn execute<W: Write>(
        &self,
        executor: &CheckExecutor,
        request: &CheckRequest,
        cancel: &mut CancelSignal,
        out: &mut W,
    ) -> Result<Report> {
        let formatter = OutputFormatterFactory::create_formatter(self.use_color, self.config.verbose);
        let logger = self.loggers.create_logger("APP").await;

        if let Some(ref warning) = request.selection.warning {
            writeln!(out, "{}", formatter.format_warning(warning)?)?;
        }

        let job = CheckJob::new(request.check_type, &request.host, request.selection.nodes.iter().cloned())?;
        log_debug!(logger, "Resolved node selection {} to {} nodes", request.selection.label, job.node_count());

        let running = format!(
            "Running {} check on {} using {} nodes...",
            job.check_type(),
            job.target_host(),
            job.node_count()
        );
        writeln!(out, "\n{}", formatter.format_info(&running)?)?;

        let handle = executor.submit(&job, cancel).await?;
        writeln!(out, "{}", formatter.format_success(&format!("Check initiated. Request ID: {}", handle.request_id))?)?;
        writeln!(out, "{}", formatter.format_success(&format!("Permanent link: {}", handle.permanent_link))?)?;
        writeln!(out, "{}", formatter.format_info("Fetching results (this may take a few seconds)...")?)?;
        out.flush()?;

        let report = executor.collect(&job, &handle, cancel).await?;
        writeln!(out, "\n{}", formatter.format_report(&report)?)?;

        if !report.complete {
            let warning = format!(
                "Results are incomplete: {} of {} node(s) had not reported when polling stopped",
                report.pending_nodes.len(),
                job.node_count()
            );
            writeln!(out, "\n{}", formatter.format_warning(&warning)?)?;
        }

        if request.save {
            let writer = ReportWriter::new(request.format);
            let path = writer.save(&report, request.output.as_deref())?;
            writeln!(out, "\n{}", formatter.format_success(&format!("Results saved to {}", path.display()))?)?;
        }

        Ok(report)
    }
}
