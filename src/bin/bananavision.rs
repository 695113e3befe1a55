//! CLI for BananaVision - prompt-to-image generation.

use bananavision::studio::load_reference_file;
use bananavision::{
    AspectRatio, GeminiBackend, GenerationBackend, GenerationConfig, GenerationMode,
    ImageGenerator, ModelTier, Studio,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bananavision")]
#[command(about = "Generate and edit images with Gemini and Imagen")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    backend: BackendArgs,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Args)]
struct BackendArgs {
    /// API key (defaults to GOOGLE_API_KEY, then API_KEY)
    #[arg(long, global = true, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, global = true, env = "GEMINI_BASE_URL")]
    base_url: Option<String>,

    /// Transport timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image from a text prompt
    Generate(GenerateArgs),

    /// List available model tiers
    Models,

    /// Check that the API key and model are usable
    Check {
        /// Model to probe
        #[arg(short, long, value_enum, default_value = "flash")]
        model: ModelArg,
    },

    /// Start an interactive session with an in-memory gallery
    Session,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the image
    prompt: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Model tier to use
    #[arg(short, long, value_enum, default_value = "flash")]
    model: ModelArg,

    /// Aspect ratio
    #[arg(long, value_enum, default_value = "1:1")]
    aspect_ratio: AspectRatioArg,

    /// Reference image to edit (path to image file)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Flash,
    Pro,
    ImagenFast,
}

impl From<ModelArg> for ModelTier {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => ModelTier::Flash,
            ModelArg::Pro => ModelTier::Pro,
            ModelArg::ImagenFast => ModelTier::ImagenFast,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "1:1")]
    Square,
    #[value(name = "3:4")]
    Portrait,
    #[value(name = "4:3")]
    Landscape,
    #[value(name = "16:9")]
    Wide,
    #[value(name = "9:16")]
    Tall,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Wide => AspectRatio::Wide,
            AspectRatioArg::Tall => AspectRatio::Tall,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            let backend = build_backend(&cli.backend, None)?;
            generate_image(backend, args, cli.json).await?;
        }
        Commands::Models => {
            list_models(cli.json)?;
        }
        Commands::Check { model } => {
            let backend = build_backend(&cli.backend, Some(model.into()))?;
            check_backend(ImageGenerator::new(backend), cli.json).await?;
        }
        Commands::Session => {
            let backend = build_backend(&cli.backend, None)?;
            run_session(backend).await?;
        }
    }

    Ok(())
}

fn build_backend(args: &BackendArgs, health_model: Option<ModelTier>) -> anyhow::Result<GeminiBackend> {
    let mut builder = GeminiBackend::builder();
    if let Some(ref key) = args.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref url) = args.base_url {
        builder = builder.base_url(url);
    }
    if let Some(secs) = args.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(model) = health_model {
        builder = builder.health_model(model);
    }
    Ok(builder.build()?)
}

async fn generate_image(backend: GeminiBackend, args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let mut config = GenerationConfig::new(&args.prompt)
        .with_model(args.model.into())
        .with_aspect_ratio(args.aspect_ratio.into());

    if config.prompt.trim().is_empty() {
        anyhow::bail!("Please enter a prompt description.");
    }

    if let Some(ref input_path) = args.input {
        config = config.with_reference_image(load_reference_file(input_path)?);
    }

    let generator = ImageGenerator::new(backend);
    let url = generator.generate(&config).await?;
    let image = bananavision::GeneratedImage::from_config(&config, url);
    image.save(&args.output)?;

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "success": true,
            "id": image.id,
            "output": args.output.display().to_string(),
            "model": image.model,
            "aspect_ratio": image.aspect_ratio,
            "mode": config.mode(),
            "timestamp": image.timestamp,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated image: {} via {} ({})",
            args.output.display(),
            image.model_label(),
            image.aspect_ratio
        );
    }

    Ok(())
}

fn list_models(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ModelInfo {
        name: &'static str,
        id: &'static str,
        endpoint: &'static str,
        supports_edit: bool,
    }

    let models: Vec<ModelInfo> = ModelTier::ALL
        .into_iter()
        .map(|tier| ModelInfo {
            name: tier.display_name(),
            id: tier.as_str(),
            endpoint: if tier.is_imagen() {
                "predict"
            } else {
                "generateContent"
            },
            supports_edit: !tier.is_imagen(),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        println!("Available models:\n");
        for m in &models {
            let edit = if m.supports_edit { "✓" } else { "✗" };
            println!("  {} ({})", m.name, m.id);
            println!("    endpoint: {}  edit: {}", m.endpoint, edit);
        }
    }

    Ok(())
}

async fn check_backend(generator: ImageGenerator<GeminiBackend>, json_output: bool) -> anyhow::Result<()> {
    let result = generator.health_check().await;
    let backend = generator.backend();
    if json_output {
        let out = serde_json::json!({
            "backend": backend.name(),
            "ready": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        match &result {
            Ok(()) => println!("{}: API ready", backend.name()),
            Err(e) => println!("{}: {}", backend.name(), e),
        }
    }
    result.map_err(Into::into)
}

const SESSION_HELP: &str = "\
commands:
  create | edit          switch mode
  prompt <text>          set the prompt
  model <flash|pro|imagen-fast>
  ratio <1:1|3:4|4:3|16:9|9:16>
  upload <file>          load a reference image (switches to edit)
  clear                  drop the reference image
  generate               run the current form
  list                   show the gallery, newest first
  use <id>               load a gallery image as reference
  delete <id>            remove a gallery image
  save <id> [file]       write a gallery image to disk
  status                 show the current form
  help | quit";

async fn run_session(backend: GeminiBackend) -> anyhow::Result<()> {
    let mut studio = Studio::new(ImageGenerator::new(backend));
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("BananaVision session. Type `help` for commands.");
    loop {
        print!("{}> ", mode_label(studio.mode()));
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{SESSION_HELP}"),
            "create" => studio.set_mode(GenerationMode::Create),
            "edit" => studio.set_mode(GenerationMode::Edit),
            "prompt" => studio.set_prompt(rest),
            "model" => match ModelArg::from_str(rest, true) {
                Ok(model) => studio.set_model(model.into()),
                Err(e) => println!("error: {e}"),
            },
            "ratio" => match rest.parse::<AspectRatio>() {
                Ok(ratio) => studio.set_aspect_ratio(ratio),
                Err(e) => println!("error: {e}"),
            },
            "upload" => match studio.upload_file(rest) {
                Ok(()) => println!("reference loaded"),
                Err(e) => println!("error: {e}"),
            },
            "clear" => studio.clear_upload(),
            "generate" => {
                println!("Processing your request...");
                match studio.submit().await {
                    Ok(image) => println!("{}  {}  \"{}\"", image.id, image.model_label(), image.prompt),
                    Err(e) => println!("error: {}", e.detail()),
                }
            }
            "list" => {
                if studio.gallery().is_empty() {
                    println!("No images generated yet.");
                }
                for image in studio.gallery() {
                    println!(
                        "{}  {}  {}  {}  \"{}\"",
                        image.id,
                        image.created_at().unwrap_or_default(),
                        image.model_label(),
                        image.aspect_ratio,
                        image.prompt
                    );
                }
            }
            "use" => match studio.select_for_edit(rest) {
                Ok(()) => println!("prompt: {}", studio.prompt()),
                Err(e) => println!("error: {e}"),
            },
            "delete" => {
                studio.delete(rest);
            }
            "save" => {
                let (id, path) = rest.split_once(' ').unwrap_or((rest, ""));
                match studio.gallery().select(id) {
                    Some(image) => {
                        let path = if path.trim().is_empty() {
                            PathBuf::from(image.download_name())
                        } else {
                            PathBuf::from(path.trim())
                        };
                        match image.save(&path) {
                            Ok(()) => println!("saved {}", path.display()),
                            Err(e) => println!("error: {e}"),
                        }
                    }
                    None => println!("error: image not found: {id}"),
                }
            }
            "status" => {
                println!("mode:   {}", mode_label(studio.mode()));
                println!("model:  {}", studio.model().display_name());
                println!("ratio:  {}", studio.aspect_ratio());
                println!("prompt: {}", studio.prompt());
                println!(
                    "reference: {}",
                    if studio.uploaded_image().is_some() { "loaded" } else { "none" }
                );
                if let Some(err) = studio.error() {
                    println!("last error: {err}");
                }
            }
            other => println!("unknown command: {other} (try `help`)"),
        }
    }

    Ok(())
}

fn mode_label(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Create => "create",
        GenerationMode::Edit => "edit",
    }
}
