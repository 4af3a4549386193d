use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use roundnote::NoteRenderer as _;

#[derive(Parser, Debug)]
#[command(name = "roundnote", version, about = "Video note and link helper chat bot")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the Telegram bot (long polling).
    Serve(ServeArgs),
    /// Turn a video into a square video note (requires `ffmpeg` on PATH).
    Note(NoteArgs),
    /// Render a spinning vinyl note from a cover image and an audio track.
    Vinyl(VinylArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Bot API token.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory for temporary media files.
    #[arg(long, env = "ROUNDNOTE_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Vinyl overlay texture (PNG). A missing file disables the overlay.
    #[arg(long, env = "ROUNDNOTE_VINYL_OVERLAY")]
    overlay: Option<PathBuf>,

    /// Number of background vinyl renderers.
    #[arg(long, env = "ROUNDNOTE_WORKERS", default_value_t = roundnote::DEFAULT_WORKERS)]
    workers: usize,

    /// TinyURL-compatible shortening endpoint.
    #[arg(long, env = "ROUNDNOTE_SHORTENER_URL")]
    shortener_url: Option<String>,
}

#[derive(Parser, Debug)]
struct NoteArgs {
    /// Input video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct VinylArgs {
    /// Cover image.
    #[arg(long)]
    image: PathBuf,

    /// Audio track.
    #[arg(long)]
    audio: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Overlay texture (PNG).
    #[arg(long, env = "ROUNDNOTE_VINYL_OVERLAY", default_value = roundnote::DEFAULT_OVERLAY)]
    overlay: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roundnote=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Note(args) => cmd_note(args),
        Command::Vinyl(args) => cmd_vinyl(args),
    }
}

fn warn_missing_tools() {
    if !roundnote::is_ffmpeg_on_path() {
        warn!("ffmpeg not found on PATH; video notes and vinyl renders will fail");
    }
    if !roundnote::is_ffprobe_on_path() {
        warn!("ffprobe not found on PATH; video notes will fail");
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = roundnote::BotConfig::resolve(
        args.token,
        args.work_dir,
        args.overlay,
        args.workers,
        args.shortener_url,
    )?;
    warn_missing_tools();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime.block_on(roundnote::serve(config))?;
    Ok(())
}

fn print_note(out: &std::path::Path, note: &roundnote::NoteInfo) {
    println!(
        "wrote {} ({}s, {}x{}, {} frames)",
        out.display(),
        note.whole_seconds(),
        note.side,
        note.side,
        note.frames
    );
}

fn cmd_note(args: NoteArgs) -> anyhow::Result<()> {
    warn_missing_tools();
    let renderer = roundnote::FfmpegNoteRenderer::new(None);
    let note = renderer
        .render_video_note(&args.in_path, &args.out)
        .with_context(|| format!("render video note from '{}'", args.in_path.display()))?;
    print_note(&args.out, &note);
    Ok(())
}

fn cmd_vinyl(args: VinylArgs) -> anyhow::Result<()> {
    warn_missing_tools();
    let renderer = roundnote::FfmpegNoteRenderer::new(Some(args.overlay));
    let note = renderer
        .render_vinyl(&args.image, &args.audio, &args.out)
        .with_context(|| format!("render vinyl from '{}'", args.image.display()))?;
    print_note(&args.out, &note);
    Ok(())
}
