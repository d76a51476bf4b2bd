// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use anyhow::{bail, Context, Result};
use application::{BlobStore, NoteRepository, NoteSynchronizer};
use domain::{DomainError, ImageAttachment, Note, NoteDraft};
use infrastructure::renderer::BrowserPreview;
use infrastructure::{Config, GraphQlNoteRepository, HttpBlobStore};
use ports::{HtmlPresenter, TextPresenter};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cli::args::{Args, Command};

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting personal-notes with arguments");

    if let Command::InitConfig { path, force } = &args.command {
        let target = match path.clone().or_else(|| args.config.clone()) {
            Some(path) => path,
            None => Config::default_path()?,
        };
        return init_config(&target, *force);
    }

    // Initialize infrastructure
    let config = load_config(args.config.as_deref())?;
    let repository = GraphQlNoteRepository::new(&config.api)?;
    let blobs = HttpBlobStore::new(
        &config.storage,
        config.api.auth_token.clone(),
        config.api.timeout_secs,
    )?;

    // Initialize application
    let synchronizer = NoteSynchronizer::new(repository, blobs);

    let mut stdout = std::io::stdout().lock();
    execute(&synchronizer, args.command, &mut stdout).await
}

/// Run one user intent against the synchronizer and print the outcome to `out`
pub async fn execute<R, B, W>(
    synchronizer: &NoteSynchronizer<R, B>,
    command: Command,
    out: &mut W,
) -> Result<()>
where
    R: NoteRepository,
    B: BlobStore,
    W: Write,
{
    match command {
        Command::List { json, html } => {
            let notes = synchronizer.refresh().await?;
            info!(count = notes.len(), "Listing notes");
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&notes)?)?;
            } else if html {
                let page = HtmlPresenter::new().render(&notes);
                let mut preview = BrowserPreview::new();
                let path = preview.write_page(&page)?;
                preview.open(&path).await?;
            } else {
                writeln!(out, "{}", TextPresenter::new().render(&notes))?;
            }
        }
        Command::Create {
            name,
            description,
            completion_date,
            image,
        } => {
            // Current list is needed to detect image name collisions
            synchronizer.refresh().await?;

            let mut draft = NoteDraft::new(name, description);
            draft.completion_date = completion_date;
            if let Some(path) = image {
                draft = draft.with_image(read_attachment(&path).await?);
            }

            let created = synchronizer.create_note(&draft).await?;
            writeln!(out, "Created note {} ({})", created.id, created.name)?;
        }
        Command::Delete { note_id } => {
            let note = fetch_note(synchronizer, &note_id).await?;
            synchronizer.delete_note(&note).await?;
            writeln!(out, "Deleted note {} ({})", note.id, note.name)?;
        }
        Command::Toggle { note_id } => {
            let note = fetch_note(synchronizer, &note_id).await?;
            let status = synchronizer.toggle_status(&note).await?;
            writeln!(out, "Note {} is now {}", note.id, status)?;
        }
        Command::InitConfig { .. } => bail!("init-config does not use the notes backend"),
    }
    Ok(())
}

async fn fetch_note<R: NoteRepository, B: BlobStore>(
    synchronizer: &NoteSynchronizer<R, B>,
    note_id: &str,
) -> Result<Note> {
    synchronizer.refresh().await?;
    synchronizer
        .find(note_id)
        .ok_or_else(|| DomainError::NoteNotFound(note_id.to_string()).into())
}

pub async fn read_attachment(path: &Path) -> Result<ImageAttachment> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Image path has no file name: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(ImageAttachment::new(file_name, bytes))
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()?,
    };
    debug!(?path, "Loading config");

    let mut config = Config::load(&path)
        .with_context(|| "Run `personal-notes init-config` to create a config file")?;
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    Config::create_default(path)?;
    info!(?path, "Wrote default config");
    println!("Wrote default config to {}", path.display());
    Ok(())
}
