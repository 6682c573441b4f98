//! Command-line front end for the GitLab client.
//!
//! ```text
//! gitlab-cli --base-url https://gitlab.example.com --token $TOKEN pipelines list 42 --status failed
//! ```

use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use gitlab_client::{
    CreateGroup, Gitlab, GitlabConfig, GitlabError, HookFlags, JobScope, ListJobsOptions,
    ListPipelinesOptions,
};

#[derive(Debug, Parser)]
#[command(name = "gitlab-cli", version, about = "Query and drive a GitLab instance")]
struct Cli {
    /// GitLab root URL, e.g. https://gitlab.example.com
    #[arg(long, env = "GITLAB_BASE_URL")]
    base_url: String,

    /// API prefix appended to the base URL
    #[arg(long, env = "GITLAB_API_PATH", default_value = "/api/v4")]
    api_path: String,

    /// Private access token
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: String,

    /// Skip certificate checking for https, exposing the connection to MITM attacks
    #[arg(long = "skip-cert-check", env = "GITLAB_SKIP_CERT_CHECK")]
    skip_cert_check: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log requests and responses
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Groups
    #[command(subcommand)]
    Groups(GroupsCommand),
    /// Project hooks
    #[command(subcommand)]
    Hooks(HooksCommand),
    /// Pipeline jobs
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// Pipelines
    #[command(subcommand)]
    Pipelines(PipelinesCommand),
}

#[derive(Debug, Subcommand)]
enum GroupsCommand {
    /// List groups, or search them by name
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a group
    Create {
        name: String,
        path: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        visibility: Option<String>,
        #[arg(long)]
        parent_id: Option<u64>,
    },
}

#[derive(Debug, Subcommand)]
enum HooksCommand {
    List {
        project: String,
    },
    Get {
        project: String,
        hook_id: u64,
    },
    Add {
        project: String,
        url: String,
        #[command(flatten)]
        flags: HookFlagArgs,
    },
    Edit {
        project: String,
        hook_id: u64,
        url: String,
        #[command(flatten)]
        flags: HookFlagArgs,
    },
    Remove {
        project: String,
        hook_id: u64,
    },
}

/// Event flags; push events and SSL verification are on unless disabled.
#[derive(Debug, Args)]
struct HookFlagArgs {
    #[arg(long)]
    no_push_events: bool,
    #[arg(long)]
    issues_events: bool,
    #[arg(long)]
    merge_requests_events: bool,
    #[arg(long)]
    tag_push_events: bool,
    #[arg(long)]
    note_events: bool,
    #[arg(long)]
    job_events: bool,
    #[arg(long)]
    pipeline_events: bool,
    #[arg(long)]
    wiki_page_events: bool,
    #[arg(long)]
    no_ssl_verification: bool,
}

impl From<&HookFlagArgs> for HookFlags {
    fn from(args: &HookFlagArgs) -> Self {
        HookFlags {
            push_events: !args.no_push_events,
            issues_events: args.issues_events,
            merge_requests_events: args.merge_requests_events,
            tag_push_events: args.tag_push_events,
            note_events: args.note_events,
            job_events: args.job_events,
            pipeline_events: args.pipeline_events,
            wiki_page_events: args.wiki_page_events,
            enable_ssl_verification: !args.no_ssl_verification,
        }
    }
}

#[derive(Debug, Subcommand)]
enum JobsCommand {
    /// List the jobs of a pipeline
    List {
        project: String,
        pipeline_id: u64,
        /// created, pending, running, failed, success, canceled, skipped or manual
        #[arg(long = "scope")]
        scopes: Vec<JobScope>,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Debug, Subcommand)]
enum PipelinesCommand {
    /// Create a pipeline for a ref
    Create { project: String, git_ref: String },
    /// List pipelines
    List {
        project: String,
        #[arg(long)]
        scope: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long = "ref")]
        git_ref: Option<String>,
        #[arg(long)]
        yaml_errors: bool,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        order_by: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one pipeline
    Get { project: String, pipeline_id: u64 },
}

#[derive(Debug, Args)]
struct PageArgs {
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    page: i32,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    per_page: i32,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_not_found() => {
            eprintln!("Error: not found");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), GitlabError> {
    let mut config = GitlabConfig::new(&cli.base_url, &cli.token)
        .api_path(&cli.api_path)
        .skip_cert_verify(cli.skip_cert_check);
    if let Some(secs) = cli.timeout {
        config = config.timeout(Duration::from_secs(secs));
    }
    let gitlab = Gitlab::new(config)?;

    match cli.command {
        Command::Groups(cmd) => match cmd {
            GroupsCommand::List { search: None } => print(&gitlab.groups().list()?),
            GroupsCommand::List {
                search: Some(term),
            } => print(&gitlab.groups().search(&term)?),
            GroupsCommand::Create {
                name,
                path,
                description,
                visibility,
                parent_id,
            } => {
                let mut group = CreateGroup::new(&name, &path);
                group.description = description;
                group.visibility = visibility;
                group.parent_id = parent_id;
                print(&gitlab.groups().create(&group)?)
            }
        },
        Command::Hooks(cmd) => match cmd {
            HooksCommand::List { project } => print(&gitlab.hooks().list(&project)?),
            HooksCommand::Get { project, hook_id } => {
                print(&gitlab.hooks().get(&project, hook_id)?)
            }
            HooksCommand::Add {
                project,
                url,
                flags,
            } => print(&gitlab.hooks().add(&project, &url, &HookFlags::from(&flags))?),
            HooksCommand::Edit {
                project,
                hook_id,
                url,
                flags,
            } => print(
                &gitlab
                    .hooks()
                    .edit(&project, hook_id, &url, &HookFlags::from(&flags))?,
            ),
            HooksCommand::Remove { project, hook_id } => {
                gitlab.hooks().remove(&project, hook_id)?;
                println!("removed hook {hook_id}");
                Ok(())
            }
        },
        Command::Jobs(JobsCommand::List {
            project,
            pipeline_id,
            scopes,
            page,
        }) => {
            let mut opts = ListJobsOptions::new().page(page.page).per_page(page.per_page);
            opts.add_scopes(scopes);
            print(&gitlab.jobs().list(&project, pipeline_id, &opts)?)
        }
        Command::Pipelines(cmd) => match cmd {
            PipelinesCommand::Create { project, git_ref } => {
                print(&gitlab.pipelines().create(&project, &git_ref)?)
            }
            PipelinesCommand::List {
                project,
                scope,
                status,
                git_ref,
                yaml_errors,
                name,
                username,
                order_by,
                sort,
                page,
            } => {
                let opts = ListPipelinesOptions {
                    scope,
                    status,
                    git_ref,
                    yaml_errors,
                    name,
                    username,
                    order_by,
                    sort,
                    ..Default::default()
                }
                .page(page.page)
                .per_page(page.per_page);
                print(&gitlab.pipelines().list(&project, &opts)?)
            }
            PipelinesCommand::Get {
                project,
                pipeline_id,
            } => {
                let pipeline = gitlab.pipelines().get(&project, pipeline_id)?;
                tracing::debug!(finished = pipeline.finished(), "pipeline state");
                print(&pipeline)
            }
        },
    }
}

fn print<T: Serialize>(value: &T) -> Result<(), GitlabError> {
    let out = serde_json::to_string_pretty(value).map_err(GitlabError::Encode)?;
    println!("{out}");
    Ok(())
}
