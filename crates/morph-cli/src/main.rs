use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use morph_contracts::SvgComplexity;
use morph_engine::config::{load_default_dotenv, load_dotenv};
use morph_engine::mime::read_image;
use morph_engine::{write_output, MorphConfig, TransformJob, Transformer};

const DEFAULT_OUTPUT: &str = "transformed_output.svg";
const ANALYZE_ACTION: &str = "analyze";

#[derive(Debug, Parser)]
#[command(
    name = "morphcli",
    version,
    about = "MorphLab CLI helper for SVG analysis, generation, and animation",
    long_about = "Analyze complex SVGs, simplify them, animate them, or vectorize raw PNG/JPEG/WebP images into SVG using Gemini models."
)]
struct Cli {
    /// Output file path for the generated SVG
    #[arg(short, long, global = true, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Gemini model to use instead of GEMINI_MODEL
    #[arg(long, global = true)]
    model: Option<String>,
    /// Dotenv file to load instead of ./.env or ../.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze the complexity of an SVG file
    Analyze(AnalyzeArgs),
    /// Simplify a complex SVG using Gemini
    Simplify(SimplifyArgs),
    /// Animate an SVG using a text prompt
    Animate(AnimateArgs),
    /// Convert a PNG/JPEG/WebP image into a clean SVG using Gemini
    Vectorize(VectorizeArgs),
    /// Analyze an SVG, then apply `simplify` or a free-form animation action
    Transform(TransformArgs),
}

#[derive(Debug, Parser)]
struct AnalyzeArgs {
    svg_file: PathBuf,
}

#[derive(Debug, Parser)]
struct SimplifyArgs {
    svg_file: PathBuf,
}

#[derive(Debug, Parser)]
struct AnimateArgs {
    svg_file: PathBuf,
    prompt: String,
}

#[derive(Debug, Parser)]
struct VectorizeArgs {
    image_file: PathBuf,
}

#[derive(Debug, Parser)]
struct TransformArgs {
    svg_file: PathBuf,
    action: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        log::error!("morphcli error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.env_file.as_deref() {
        Some(path) => {
            load_dotenv(path)?;
        }
        None => {
            load_default_dotenv();
        }
    }
    let config = MorphConfig::from_env().with_model(cli.model.as_deref());
    execute(cli, &config)
}

fn execute(cli: Cli, config: &MorphConfig) -> Result<()> {
    let output = cli.output.as_path();
    match cli.command {
        Command::Analyze(args) => {
            let source = read_svg(&args.svg_file)?;
            print_report(&source.complexity);
            Ok(())
        }
        Command::Simplify(args) => {
            let source = read_svg(&args.svg_file)?;
            print_report(&source.complexity);
            run_job(config, &TransformJob::Simplify { svg: source.text }, output)
        }
        Command::Animate(args) => {
            let source = read_svg(&args.svg_file)?;
            let job = TransformJob::Animate {
                svg: source.text,
                action: args.prompt,
            };
            run_job(config, &job, output)
        }
        Command::Vectorize(args) => {
            let image = read_image(&args.image_file)?;
            println!(
                "Analyzing {} ({} bytes)...",
                image.mime_type,
                image.data.len()
            );
            run_job(config, &TransformJob::Vectorize { image }, output)
        }
        Command::Transform(args) => {
            let source = read_svg(&args.svg_file)?;
            print_report(&source.complexity);
            if args.action == ANALYZE_ACTION {
                return Ok(());
            }
            run_job(config, &TransformJob::from_action(&args.action, source.text), output)
        }
    }
}

/// An SVG file as text, with its complexity measured on the raw bytes.
#[derive(Debug)]
struct SvgSource {
    text: String,
    complexity: SvgComplexity,
}

fn read_svg(path: &Path) -> Result<SvgSource> {
    let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    Ok(SvgSource {
        complexity: SvgComplexity::from_bytes(&bytes),
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn print_report(complexity: &SvgComplexity) {
    println!("{}", complexity.render_report());
}

fn run_job(config: &MorphConfig, job: &TransformJob, output: &Path) -> Result<()> {
    let transformer = Transformer::from_config(config)?;
    println!("Invoking Gemini model: {}", transformer.model());
    println!("Action: {}", job.name());
    println!("Waiting for response (large files may take several minutes)...");

    let svg = transform_to_file(&transformer, job, output)?;

    println!("\n✨ Success! Output saved to {}", output.display());
    print_report(&SvgComplexity::from_svg(&svg));
    Ok(())
}

/// The output file is only touched once the model call has succeeded.
fn transform_to_file(transformer: &Transformer, job: &TransformJob, output: &Path) -> Result<String> {
    let svg = transformer.run(job)?;
    write_output(output, &svg)?;
    log::debug!("wrote {} bytes to {}", svg.len(), output.display());
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};
    use morph_engine::mock::MockGemini;
    use morph_engine::{ConfigError, GeminiError, MorphConfig, TransformJob, Transformer};

    use super::{execute, read_svg, run_job, transform_to_file, Cli, Command, DEFAULT_OUTPUT};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn output_flag_defaults_and_is_global() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["morphcli", "analyze", "icon.svg"])?;
        assert_eq!(cli.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(matches!(cli.command, Command::Analyze(_)));

        let cli = Cli::try_parse_from([
            "morphcli",
            "animate",
            "icon.svg",
            "make it jump",
            "--output",
            "out/jump.svg",
            "--model",
            "gemini-3.1-pro-preview",
        ])?;
        assert_eq!(cli.output, PathBuf::from("out/jump.svg"));
        assert_eq!(cli.model.as_deref(), Some("gemini-3.1-pro-preview"));
        match cli.command {
            Command::Animate(args) => {
                assert_eq!(args.svg_file, PathBuf::from("icon.svg"));
                assert_eq!(args.prompt, "make it jump");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["morphcli", "-o", "v.svg", "vectorize", "photo.jpg"])?;
        assert_eq!(cli.output, PathBuf::from("v.svg"));
        assert!(matches!(cli.command, Command::Vectorize(_)));
        Ok(())
    }

    #[test]
    fn animate_requires_prompt_argument() {
        assert!(Cli::try_parse_from(["morphcli", "animate", "icon.svg"]).is_err());
        assert!(Cli::try_parse_from(["morphcli", "simplify"]).is_err());
    }

    #[test]
    fn read_svg_reports_missing_file() {
        let err = read_svg(std::path::Path::new("/nonexistent/morph/icon.svg")).unwrap_err();
        assert!(format!("{err:#}").contains("failed reading /nonexistent/morph/icon.svg"));
    }

    #[test]
    fn complexity_uses_file_bytes_for_non_utf8_input() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("latin1.svg");
        let mut bytes = b"<svg><text>".to_vec();
        bytes.extend(std::iter::repeat(0xE9u8).take(6000));
        bytes.extend_from_slice(b"</text></svg>");
        fs::write(&path, &bytes)?;

        let source = read_svg(&path)?;
        assert_eq!(source.complexity.size_bytes, 6024);
        assert!(!source.complexity.is_complex());
        assert!(source.text.starts_with("<svg><text>\u{FFFD}"));
        Ok(())
    }

    #[test]
    fn transform_analyze_stops_before_the_model() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let input = temp.path().join("icon.svg");
        let output = temp.path().join("out.svg");
        fs::write(&input, "<svg><path d=\"M0 0\"/></svg>")?;

        let cli = Cli::try_parse_from([
            "morphcli".into(),
            "--output".into(),
            output.clone().into_os_string(),
            "transform".into(),
            input.into_os_string(),
            "analyze".into(),
        ])?;
        execute(cli, &MorphConfig::default())?;

        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn transform_action_without_api_key_fails() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let input = temp.path().join("icon.svg");
        let output = temp.path().join("out.svg");
        fs::write(&input, "<svg/>")?;

        let cli = Cli::try_parse_from([
            "morphcli".into(),
            "--output".into(),
            output.clone().into_os_string(),
            "transform".into(),
            input.into_os_string(),
            "simplify".into(),
        ])?;
        let err = execute(cli, &MorphConfig::default()).unwrap_err();

        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingApiKey)
        );
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn run_job_without_api_key_fails_before_writing() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let output = temp.path().join("out.svg");
        let job = TransformJob::Simplify {
            svg: "<svg/>".to_string(),
        };

        let err = run_job(&MorphConfig::default(), &job, &output).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::MissingApiKey)
        );
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn transform_writes_sanitized_svg() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let output = temp.path().join("animated.svg");
        let mock = MockGemini::reply_with_text("```xml\n<svg><animate/></svg>\n```")?;
        let transformer = Transformer::new(mock.client()?, "gemini-test", "test-key");

        let job = TransformJob::from_action("spin", "<svg/>".to_string());
        let svg = transform_to_file(&transformer, &job, &output)?;

        assert_eq!(svg, "<svg><animate/></svg>");
        assert_eq!(fs::read_to_string(&output)?, "<svg><animate/></svg>");
        mock.finish()?;
        Ok(())
    }

    #[test]
    fn empty_model_response_leaves_output_untouched() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let output = temp.path().join("previous.svg");
        fs::write(&output, "<svg id=\"previous\"/>")?;
        let mock = MockGemini::serve(200, r#"{"candidates":[]}"#)?;
        let transformer = Transformer::new(mock.client()?, "gemini-test", "test-key");

        let job = TransformJob::Simplify {
            svg: "<svg/>".to_string(),
        };
        let err = transform_to_file(&transformer, &job, &output).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<GeminiError>(),
            Some(GeminiError::EmptyResponse)
        ));
        assert_eq!(fs::read_to_string(&output)?, "<svg id=\"previous\"/>");
        mock.finish()?;
        Ok(())
    }
}
