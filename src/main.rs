use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use sysguard::backup::verify_snapshot;
use sysguard::config::Config;
use sysguard::error_translation::ErrorTranslator;
use sysguard::system::SystemResources;
use sysguard::tools::ToolPlan;
use sysguard::ui::{self, render};
use sysguard::{
    AppError, AppResult, CommandDescriptor, Orchestrator, OrchestratorConfig, ProcessExecutor,
    SystemInfo, ToolRegistry, ToolReport,
};

#[derive(Parser)]
#[command(name = "sysguard")]
#[command(about = "Run host administration commands with risk checks and backups", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/sysguard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install packages
    Install {
        #[arg(required = true)]
        packages: Vec<String>,

        /// Refresh package lists first
        #[arg(long)]
        update_first: bool,
    },

    /// Remove packages
    Remove {
        #[arg(required = true)]
        packages: Vec<String>,

        /// Also remove configuration files (apt only)
        #[arg(long)]
        purge: bool,
    },

    /// Start, stop, restart, enable, disable or inspect a service
    Service { action: String, service: String },

    /// List, inspect or signal processes
    Process {
        #[command(subcommand)]
        command: ProcessCommand,
    },

    /// Find (and optionally delete) files in a directory
    Cleanup {
        target: String,

        #[arg(short, long)]
        recursive: bool,

        /// Delete matches instead of listing them
        #[arg(long)]
        delete: bool,

        /// Only files with this extension (repeatable)
        #[arg(long = "ext")]
        extensions: Vec<String>,

        /// Only files older than this many days
        #[arg(long)]
        older_than: Option<u32>,

        /// Only files larger than this size, e.g. 10MB
        #[arg(long)]
        larger_than: Option<String>,
    },

    /// Refresh package lists and optionally upgrade
    Update {
        /// Skip refreshing package lists
        #[arg(long)]
        no_refresh: bool,

        /// Upgrade installed packages
        #[arg(long)]
        upgrade: bool,

        /// Security updates only (dnf, yum, zypper)
        #[arg(long)]
        security_only: bool,

        /// Actually run the commands instead of previewing them
        #[arg(long)]
        apply: bool,
    },

    /// Run any command under risk classification
    Exec {
        command: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,

        /// Working directory
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show system information and resources
    Info,

    /// Classify a command without running it
    Assess {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        argv: Vec<String>,

        /// Working directory used to resolve relative paths
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Treat the command as needing root
        #[arg(long)]
        root: bool,
    },

    /// Check a snapshot against its recorded checksum
    Verify { snapshot: PathBuf, checksum: String },

    /// Print every tool's parameter schema
    Tools,

    /// Invoke a tool with JSON parameters
    Call {
        tool: String,

        #[arg(default_value = "{}")]
        params: String,
    },
}

#[derive(Subcommand)]
enum ProcessCommand {
    /// List running processes
    List {
        /// Only mention this name in the description
        #[arg(long)]
        name: Option<String>,
    },

    /// Signal a process by pid or name
    Kill {
        target: String,

        #[arg(short, long, default_value = "TERM")]
        signal: String,

        /// Use KILL (same as --signal KILL)
        #[arg(short, long)]
        force: bool,
    },

    /// Show details for a pid
    Info { pid: u32 },
}

struct Context {
    config: Config,
    orchestrator: Orchestrator,
    registry: ToolRegistry,
    yes: bool,
    json: bool,
}

impl Context {
    fn build(cli: &Cli) -> AppResult<Self> {
        let config = Config::load_or_default(cli.config.as_deref())?;
        sysguard::logging::init(&config.logging);

        let executor = ProcessExecutor::new()
            .with_default_timeout(Duration::from_millis(config.execution.default_timeout_ms))
            .with_elevation(config.execution.elevation_command.clone());

        let audit_log = if config.behavior.log_commands {
            Config::history_path().ok()
        } else {
            None
        };

        let orchestrator = Orchestrator::new(
            OrchestratorConfig {
                backup_root: config.backup.root.clone(),
                audit_log,
                base_dir: None,
            },
            Arc::new(executor),
        )?;

        Ok(Self {
            config,
            orchestrator,
            registry: ToolRegistry::with_defaults(SystemInfo::detect()),
            yes: cli.yes,
            json: cli.json,
        })
    }

    fn needs_confirmation(&self, plan: &ToolPlan) -> bool {
        !plan.dry_run
            && !self.yes
            && self.config.behavior.confirm_risky_ops
            && plan.requires_confirmation(&self.orchestrator)
    }

    /// Plan, confirm when risky, execute, print. `Ok(false)` means a command failed.
    async fn run_tool(&self, name: &str, params: Value) -> AppResult<bool> {
        let plan = self.registry.plan(name, params)?;

        if self.needs_confirmation(&plan) {
            let previews = self.registry.preview(&plan, &self.orchestrator);
            eprint!("{}", render::render_previews(&previews));
            if plan.destructive {
                eprintln!("{} deletes data and takes no backup.", plan.tool);
            }
            if !ui::confirm("Proceed?")? {
                return Err(AppError::Cancelled);
            }
        }

        let report = self.registry.execute(plan, &self.orchestrator).await;
        self.print_report(&report)?;
        Ok(report.success)
    }

    fn print_report(&self, report: &ToolReport) -> AppResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
            return Ok(());
        }

        print!("{}", render::render_report(report));
        for result in report.results.iter().filter(|r| !r.outcome.succeeded) {
            let friendly = ErrorTranslator::translate_output(&result.outcome.stderr);
            if let Some(suggestion) = friendly.suggestion {
                eprintln!("{}\n  hint: {}", friendly.simple_message, suggestion);
            }
        }
        Ok(())
    }
}

async fn run(cli: Cli) -> AppResult<bool> {
    let ctx = Context::build(&cli)?;

    match cli.command {
        Commands::Install {
            packages,
            update_first,
        } => {
            ctx.run_tool(
                "install_package",
                json!({"packages": packages, "updateFirst": update_first}),
            )
            .await
        }
        Commands::Remove { packages, purge } => {
            ctx.run_tool("remove_package", json!({"packages": packages, "purge": purge}))
                .await
        }
        Commands::Service { action, service } => {
            ctx.run_tool("manage_service", json!({"service": service, "action": action}))
                .await
        }
        Commands::Process { command } => {
            let params = match command {
                ProcessCommand::List { name } => json!({"action": "list", "name": name}),
                ProcessCommand::Kill {
                    target,
                    signal,
                    force,
                } => {
                    let signal = if force { "KILL".to_string() } else { signal };
                    match target.parse::<u32>() {
                        Ok(pid) => json!({"action": "kill", "pid": pid, "signal": signal}),
                        Err(_) => json!({"action": "kill", "name": target, "signal": signal}),
                    }
                }
                ProcessCommand::Info { pid } => json!({"action": "info", "pid": pid}),
            };
            ctx.run_tool("manage_processes", params).await
        }
        Commands::Cleanup {
            target,
            recursive,
            delete,
            extensions,
            older_than,
            larger_than,
        } => {
            ctx.run_tool(
                "cleanup_files",
                json!({
                    "target": target,
                    "recursive": recursive,
                    "dryRun": !delete,
                    "filters": {
                        "extensions": extensions,
                        "ageInDays": older_than,
                        "sizeLimit": larger_than,
                    }
                }),
            )
            .await
        }
        Commands::Update {
            no_refresh,
            upgrade,
            security_only,
            apply,
        } => {
            ctx.run_tool(
                "update_system",
                json!({
                    "updatePackageList": !no_refresh,
                    "upgradePackages": upgrade,
                    "securityOnly": security_only,
                    "dryRun": !apply,
                }),
            )
            .await
        }
        Commands::Exec {
            command,
            args,
            cwd,
            timeout,
        } => {
            let mut params = json!({"command": command, "args": args});
            if let Some(cwd) = cwd {
                params["workingDir"] = json!(cwd);
            }
            if let Some(timeout) = timeout {
                params["timeout"] = json!(timeout);
            }
            ctx.run_tool("execute_command", params).await
        }
        Commands::Info => {
            if ctx.json {
                return ctx.run_tool("system_info", json!({})).await;
            }
            print!(
                "{}",
                render::render_system(ctx.registry.system(), &SystemResources::collect())
            );
            Ok(true)
        }
        Commands::Assess { argv, cwd, root } => {
            let Some(mut cmd) = CommandDescriptor::from_argv(&argv) else {
                return Ok(false);
            };
            cmd = cmd.with_root(root);
            if let Some(cwd) = cwd {
                cmd = cmd.with_working_dir(cwd);
            }

            let verdict = ctx.orchestrator.assess(&cmd);
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else {
                print!("{}", render::render_verdict(&cmd.command_line(), &verdict));
            }
            Ok(true)
        }
        Commands::Verify { snapshot, checksum } => {
            let intact = verify_snapshot(&snapshot, &checksum)?;
            if ctx.json {
                println!("{}", json!({"snapshot": snapshot, "intact": intact}));
            } else if intact {
                println!("{} matches {}", snapshot.display(), checksum);
            } else {
                println!("{} does NOT match {}", snapshot.display(), checksum);
            }
            Ok(intact)
        }
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&ctx.registry.schemas())?);
            Ok(true)
        }
        Commands::Call { tool, params } => {
            let params: Value = serde_json::from_str(&params)?;
            ctx.run_tool(&tool, params).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(AppError::Cancelled) => {
            eprintln!("Cancelled.");
            ExitCode::FAILURE
        }
        Err(e) => {
            let friendly = ErrorTranslator::translate_app_error(&e);
            eprintln!("Error: {}", friendly.simple_message);
            if let Some(suggestion) = friendly.suggestion {
                eprintln!("  hint: {suggestion}");
            }
            eprintln!("  ({})", friendly.raw_error);
            ExitCode::from(2)
        }
    }
}
