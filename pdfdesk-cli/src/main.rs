use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use pdfdesk::cv::CvProfile;
use pdfdesk::document::format_size;
use pdfdesk::operations::{
    CompressionLevel, OperationKind, OutputFormat, RotationAngle, SignaturePlacement, SplitMode,
};
use pdfdesk::{DocumentHandle, OperationOptions, ResultArtifact, WorkflowStatus};
use pdfdesk_gateway::{GatewayConfig, GatewayOutcome, HttpGateway, ToolSession};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "pdfdesk",
    about = "PDF tools backed by the pdfdesk processing service",
    version,
    author
)]
struct Cli {
    /// Base URL of the processing service (overrides PDFDESK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token for this invocation (overrides the stored token)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Log requests and workflow transitions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// The document to work on
#[derive(Args)]
struct InputArgs {
    /// Local PDF file
    #[arg(required_unless_present = "stored")]
    input: Option<PathBuf>,

    /// Id of a file in "my files", used instead of a local file
    #[arg(long, conflicts_with = "input")]
    stored: Option<String>,
}

#[derive(Args)]
struct OutputArgs {
    /// Directory the result is written to
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// Also keep the result in "my files"
    #[arg(long)]
    save: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the page count of a PDF
    Pages {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Delete pages from a PDF
    Delete {
        #[command(flatten)]
        input: InputArgs,

        /// Pages to delete (e.g., "1,3-5")
        #[arg(short, long)]
        pages: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Copy pages into a new PDF
    Extract {
        #[command(flatten)]
        input: InputArgs,

        /// Pages to extract (e.g., "2,4-6")
        #[arg(short, long)]
        pages: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Rotate pages in a PDF
    Rotate {
        #[command(flatten)]
        input: InputArgs,

        /// Rotation angle (90, 180, 270)
        #[arg(short, long, default_value = "90")]
        angle: RotationAngle,

        /// Pages to rotate, all pages when omitted
        #[arg(short, long)]
        pages: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Split a PDF into several files
    Split {
        #[command(flatten)]
        input: InputArgs,

        /// Split mode: every-page, at-pages or chunks
        #[arg(short, long, default_value = "every-page")]
        mode: String,

        /// Split points for at-pages
        #[arg(short, long)]
        pages: Option<String>,

        /// Pages per output file for chunks
        #[arg(long)]
        chunk_size: Option<u32>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Reduce the size of a PDF
    Compress {
        #[command(flatten)]
        input: InputArgs,

        /// Compression level: low, medium or high
        #[arg(short, long, default_value = "medium")]
        level: CompressionLevel,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Convert a PDF to another format
    Convert {
        #[command(flatten)]
        input: InputArgs,

        /// Target format: docx, xlsx, pptx, jpg, png, txt or html
        #[arg(short, long, default_value = "docx")]
        format: OutputFormat,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Merge PDFs in the given order
    Merge {
        /// Input PDF files, at least two
        #[arg(required = true, num_args = 2..)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Place a signature image on a page
    Sign {
        #[command(flatten)]
        input: InputArgs,

        /// Signature image (PNG or JPEG)
        #[arg(short, long)]
        signature: PathBuf,

        /// Page the signature goes on
        #[arg(long, default_value = "1")]
        page: u32,

        /// Horizontal position in points
        #[arg(long, default_value = "72")]
        x: f64,

        /// Vertical position in points
        #[arg(long, default_value = "72")]
        y: f64,

        /// Signature width in points
        #[arg(long, default_value = "150")]
        width: f64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate a CV from a JSON profile
    Cv {
        /// Profile JSON file
        profile: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Manage "my files"
    Files {
        #[command(subcommand)]
        command: FilesCommand,
    },

    /// Store a bearer token for later invocations
    Login {
        /// Token issued by the service
        #[arg(value_name = "TOKEN")]
        auth_token: String,
    },

    /// Forget the stored token
    Logout,
}

#[derive(Subcommand)]
enum FilesCommand {
    /// List stored files
    List,

    /// Show storage usage
    Quota,

    /// Upload a local file
    Upload { file: PathBuf },

    /// Download a stored file
    Download {
        id: String,

        /// Directory the file is written to
        #[arg(short = 'o', long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Delete a stored file
    Delete { id: String },
}

/// What a single-document command asks the session to do
struct ToolRun {
    kind: OperationKind,
    range: Option<String>,
    options: Option<OperationOptions>,
    attachment: Option<DocumentHandle>,
    assume_yes: bool,
}

impl ToolRun {
    fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            range: None,
            options: None,
            attachment: None,
            assume_yes: false,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "pdfdesk=debug,pdfdesk_gateway=debug"
    } else {
        "pdfdesk=info,pdfdesk_gateway=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = GatewayConfig::from_env()?.with_token(cli.token);
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url)?;
    }

    match &cli.command {
        Commands::Login { auth_token } => {
            config.token_store().store(auth_token)?;
            println!("Token stored in {}", config.token_file.display());
            return Ok(());
        }
        Commands::Logout => {
            config.token_store().clear()?;
            println!("Signed out");
            return Ok(());
        }
        _ => {}
    }

    let gateway = HttpGateway::new(&config)?;

    match cli.command {
        Commands::Pages { input } => {
            let document = resolve_input(&gateway, &input).await?;
            let name = document.name().to_string();
            let pages = gateway
                .page_count(&document)
                .await
                .with_context(|| format!("Could not read {name}"))?;
            println!("{name}: {pages} pages");
        }

        Commands::Delete {
            input,
            pages,
            yes,
            output,
        } => {
            let run = ToolRun {
                range: Some(pages),
                assume_yes: yes,
                ..ToolRun::new(OperationKind::DeletePages)
            };
            run_tool(gateway, &input, run, &output).await?;
        }

        Commands::Extract {
            input,
            pages,
            output,
        } => {
            let run = ToolRun {
                range: Some(pages),
                ..ToolRun::new(OperationKind::ExtractPages)
            };
            run_tool(gateway, &input, run, &output).await?;
        }

        Commands::Rotate {
            input,
            angle,
            pages,
            output,
        } => {
            let run = ToolRun {
                range: pages,
                options: Some(OperationOptions::Rotate { angle }),
                ..ToolRun::new(OperationKind::Rotate)
            };
            run_tool(gateway, &input, run, &output).await?;
        }

        Commands::Split {
            input,
            mode,
            pages,
            chunk_size,
            output,
        } => {
            let mode = SplitMode::parse(&mode, chunk_size)?;
            if mode.uses_selection() && pages.is_none() {
                bail!("--pages is required with --mode {}", mode.as_str());
            }
            let run = ToolRun {
                range: pages.filter(|_| mode.uses_selection()),
                options: Some(OperationOptions::Split { mode }),
                ..ToolRun::new(OperationKind::Split)
            };
            run_tool(gateway, &input, run, &output).await?;
        }

        Commands::Compress {
            input,
            level,
            output,
        } => {
            let run = ToolRun {
                options: Some(OperationOptions::Compress { level }),
                ..ToolRun::new(OperationKind::Compress)
            };
            run_tool(gateway, &input, run, &output).await?;
        }

        Commands::Convert {
            input,
            format,
            output,
        } => {
            let run = ToolRun {
                options: Some(OperationOptions::Convert { format }),
                ..ToolRun::new(OperationKind::Convert)
            };
            run_tool(gateway, &input, run, &output).await?;
        }

        Commands::Merge { files, output } => {
            let documents = files
                .iter()
                .map(|path| {
                    DocumentHandle::open(path)
                        .with_context(|| format!("Failed to read {}", path.display()))
                })
                .collect::<Result<Vec<_>>>()?;
            let artifact = gateway.merge(&documents).await?;
            deliver(&gateway, &artifact, &output).await?;
        }

        Commands::Sign {
            input,
            signature,
            page,
            x,
            y,
            width,
            output,
        } => {
            let image = DocumentHandle::open(&signature)
                .with_context(|| format!("Failed to read {}", signature.display()))?;
            let run = ToolRun {
                options: Some(OperationOptions::Sign {
                    placement: SignaturePlacement { page, x, y, width },
                }),
                attachment: Some(image),
                ..ToolRun::new(OperationKind::Sign)
            };
            run_tool(gateway, &input, run, &output).await?;
        }

        Commands::Cv { profile, output } => {
            let profile = CvProfile::from_json_file(&profile)
                .with_context(|| format!("Failed to load profile {}", profile.display()))?;
            let outcome = gateway.generate_cv(&profile).await?;
            if let GatewayOutcome::Fallback { reason, .. } = &outcome {
                eprintln!("Warning: {reason}");
                eprintln!("The CV service is unavailable, writing a plain-text CV instead");
            }
            deliver(&gateway, outcome.artifact(), &output).await?;
        }

        Commands::Files { command } => files_command(&gateway, command).await?,

        Commands::Login { .. } | Commands::Logout => {}
    }

    Ok(())
}

/// Load the input from disk, or look it up in "my files"
async fn resolve_input(gateway: &HttpGateway, input: &InputArgs) -> Result<DocumentHandle> {
    if let Some(id) = &input.stored {
        let files = gateway.list_files().await.context("Failed to list my files")?;
        let Some(file) = files.iter().find(|f| &f.id == id) else {
            bail!("No stored file with id {id}");
        };
        return Ok(DocumentHandle::from_stored(file));
    }

    let Some(path) = &input.input else {
        bail!("No input file given");
    };
    DocumentHandle::open(path).with_context(|| format!("Failed to read {}", path.display()))
}

async fn run_tool(
    gateway: HttpGateway,
    input: &InputArgs,
    run: ToolRun,
    output: &OutputArgs,
) -> Result<()> {
    let document = resolve_input(&gateway, input).await?;
    let name = document.name().to_string();
    let mut session = ToolSession::for_operation(gateway, run.kind)?;

    session
        .load(document)
        .await
        .with_context(|| format!("Could not read {name}"))?;

    if let Some(options) = run.options {
        session.set_options(options)?;
    }

    let range = match run.range {
        Some(range) => Some(range),
        None if run.kind == OperationKind::Rotate => session
            .workflow()
            .configuration()
            .map(|c| format!("1-{}", c.page_count)),
        None => None,
    };
    if let Some(range) = range {
        if let Some(validation) = session.edit_range(range)? {
            if !validation.valid {
                bail!(validation.message);
            }
            println!("{}", validation.message);
        }
    }

    if let Some(image) = run.attachment {
        session.attach(image)?;
    }

    if let Some(preview) = session.workflow().preview() {
        println!("{}", preview.summary);
    }

    if session.submit()? == WorkflowStatus::Confirming {
        let question = format!("{} in {name}?", run.kind.label());
        if run.assume_yes || ask(&question)? {
            session.confirm()?;
        } else {
            session.cancel()?;
            println!("Cancelled, nothing was changed");
            return Ok(());
        }
    }

    let size = session.process().await?.len();
    let path = session
        .download(&output.output_dir)
        .with_context(|| format!("Failed to write into {}", output.output_dir.display()))?;
    println!("Wrote {} ({})", path.display(), format_size(size as u64));

    if output.save {
        let stored = session.save().await?;
        println!("Saved to my files as {} (id {})", stored.name, stored.id);
    }
    Ok(())
}

/// Write the result locally, and store it remotely when asked to
async fn deliver(gateway: &HttpGateway, artifact: &ResultArtifact, output: &OutputArgs) -> Result<()> {
    let path = write_artifact(artifact, &output.output_dir)?;
    println!("Wrote {} ({})", path.display(), format_size(artifact.len() as u64));

    if output.save {
        let stored = gateway.save_artifact(artifact).await?;
        println!("Saved to my files as {} (id {})", stored.name, stored.id);
    }
    Ok(())
}

async fn files_command(gateway: &HttpGateway, command: FilesCommand) -> Result<()> {
    match command {
        FilesCommand::List => {
            let files = gateway.list_files().await?;
            if files.is_empty() {
                println!("No stored files");
            }
            for file in files {
                let created = file
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{:<24} {:<40} {:>10} {}", file.id, file.name, format_size(file.size), created);
            }
        }
        FilesCommand::Quota => {
            let quota = gateway.quota().await?;
            println!(
                "{} of {} used ({:.0}%), {} free",
                format_size(quota.used),
                format_size(quota.limit),
                quota.percent_used(),
                format_size(quota.remaining())
            );
        }
        FilesCommand::Upload { file } => {
            let document = DocumentHandle::open(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let quota = gateway.quota().await?;
            if !quota.can_store(document.size()) {
                bail!(
                    "{} ({}) does not fit in the remaining {}",
                    document.name(),
                    format_size(document.size()),
                    format_size(quota.remaining())
                );
            }
            let stored = gateway.upload(&document).await?;
            println!("Uploaded {} (id {})", stored.name, stored.id);
        }
        FilesCommand::Download { id, output_dir } => {
            let artifact = gateway.download_by_id(&id).await?;
            let path = write_artifact(&artifact, &output_dir)?;
            println!("Wrote {}", path.display());
        }
        FilesCommand::Delete { id } => {
            gateway.delete_file(&id).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

fn write_artifact(artifact: &ResultArtifact, dir: &Path) -> Result<PathBuf> {
    artifact
        .write_to(dir)
        .with_context(|| format!("Failed to write into {}", dir.display()))
}

/// Yes/no prompt on the terminal, anything but "y" or "yes" is a no
fn ask(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
