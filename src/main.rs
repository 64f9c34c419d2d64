use clap::{Parser, Subcommand, ValueEnum};
use gallery_layout::config::{self, Config};
use gallery_layout::editor::Editor;
use gallery_layout::output;
use gallery_layout::proxy::Proxy;
use gallery_layout::proxy::server::Server;
use gallery_layout::source::{ContentSource, DirectorySource};
use gallery_layout::store::{FileStore, LayoutStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gallery-layout")]
#[command(about = "Photo gallery layout editor core and layout proxy")]
#[command(long_about = "\
Photo gallery layout editor core and layout proxy

Galleries come from a content directory. A saved layout (order, sizes, crops,
spacers) is an overlay on top of the gallery's image list: images removed
from the content drop out, new images are appended.

Content structure:

  content/
  ├── portraits.json           # GalleryConfig document
  └── summer/                  # Directory gallery
      ├── subtitle.md          # Optional subtitle (markdown)
      ├── 001-Beach-Day.jpg    # Ordered by numeric prefix
      └── 002-Harbour.jpg

Run 'gallery-layout gen-config' to generate a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "gallery.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Html,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the layout proxy
    Serve,
    /// Show a gallery with its saved layout applied
    Show {
        /// Gallery id
        gallery: String,
    },
    /// Print a clipboard export of a gallery's current layout
    Export {
        /// Gallery id
        gallery: String,
        #[arg(long, value_enum, default_value = "html")]
        format: ExportFormat,
    },
    /// Delete a gallery's saved layout
    Reset {
        /// Gallery id
        gallery: String,
    },
    /// Validate that every gallery in the content directory loads
    Check,
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Serve => {
            let config = config::load_config(&cli.config)?;
            let proxy = Proxy::new(
                content_source(&config),
                layout_store(&config),
                config.proxy.secret(),
                config.proxy.max_body_bytes,
            );
            Server::bind(&config.proxy.bind, proxy)?.run()?;
        }
        Command::Show { gallery } => {
            let config = config::load_config(&cli.config)?;
            let editor = open_editor(&config, &gallery)?;
            output::print_layout(editor.gallery(), editor.layout());
        }
        Command::Export { gallery, format } => {
            let config = config::load_config(&cli.config)?;
            let editor = open_editor(&config, &gallery)?;
            match format {
                ExportFormat::Html => println!("{}", editor.export_markup()),
                ExportFormat::Json => println!("{}", editor.export_json()?),
            }
        }
        Command::Reset { gallery } => {
            let config = config::load_config(&cli.config)?;
            layout_store(&config).delete(&gallery)?;
            println!("Reset layout for {gallery}");
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            let source = content_source(&config);
            println!("==> Checking {}", source.root().display());
            let results: Vec<output::CheckResult> = source
                .gallery_ids()?
                .into_iter()
                .map(|id| {
                    let result = match source.fetch(&id) {
                        Ok(Some(gallery)) => Ok(gallery.image_entries().count()),
                        Ok(None) => Err("not found".to_string()),
                        Err(err) => Err(err.to_string()),
                    };
                    (id, result)
                })
                .collect();
            output::print_check(&results);
            if results.iter().any(|(_, r)| r.is_err()) {
                return Err("some galleries failed to load".into());
            }
            println!("==> Content is valid");
        }
    }

    Ok(())
}

fn content_source(config: &Config) -> DirectorySource {
    DirectorySource::new(&config.proxy.content_dir)
}

fn layout_store(config: &Config) -> FileStore {
    FileStore::new(&config.storage.dir)
}

fn open_editor(config: &Config, gallery: &str) -> Result<Editor<FileStore>, Box<dyn std::error::Error>> {
    let canonical = content_source(config)
        .fetch(gallery)?
        .ok_or_else(|| format!("gallery not found: {gallery}"))?;
    Ok(Editor::open(canonical, layout_store(config), config.clone(), false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn cli(config: PathBuf, args: &[&str]) -> Cli {
        let mut argv = vec!["gallery-layout", "--config"];
        let config = config.to_string_lossy().into_owned();
        argv.push(&config);
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn gen_config_never_reads_the_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gallery.toml");
        fs::write(&path, "[grid\nbroken").unwrap();

        assert!(run(cli(path.clone(), &["gen-config"])).is_ok());
        assert!(run(cli(path, &["reset", "summer"])).is_err());
    }

    #[test]
    fn reset_deletes_stored_layout() {
        let tmp = TempDir::new().unwrap();
        let store = tmp.path().join("layouts");
        let path = tmp.path().join("gallery.toml");
        fs::write(&path, format!("[storage]\ndir = {:?}\n", store.to_string_lossy())).unwrap();
        fs::create_dir_all(&store).unwrap();
        let record = store.join("gallery-layout-summer.json");
        fs::write(&record, "[]").unwrap();

        run(cli(path, &["reset", "summer"])).unwrap();
        assert!(!record.exists());
    }
}
