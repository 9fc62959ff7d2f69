use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fotons::api::ApiClient;
use fotons::config::FotonsConfig;
use fotons::domain::{PageId, RecordMode};
use fotons::editor::resolve_dialect_links;
use fotons::features::library::{can_delete, custom_date_label, fetch_library, LibraryTab, LibraryView};
use fotons::features::{ImageSlot, Studio};
use fotons::repository::{HttpPageRepository, PageRepository};
use fotons::services::autosave::{AutosaveConfig, FieldEdit};
use fotons::services::LoggingNavigator;
use fotons::session::{Session, SessionStore};
use fotons::storage::{HttpImageUploader, ImagePayload, ImageUploader};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fotons", version)]
#[command(about = "Biblioteca de Fótons: browse and edit pages from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session
    Login { email: String, password: String },

    /// Forget the stored session
    Logout,

    /// List pages
    #[command(alias = "ls")]
    List {
        /// Search title, description and content
        #[arg(short, long)]
        search: Option<String>,

        /// collections, library or gallery
        #[arg(short, long, default_value = "library")]
        tab: LibraryTab,
    },

    /// Print a page's content with link titles refreshed
    Show { id: PageId },

    /// Edit a page, reading its content from stdin ("new" creates one)
    Edit {
        /// Page id or "new"
        target: RecordMode,

        #[arg(long)]
        title: Option<String>,

        /// Parent page for new pages
        #[arg(long)]
        parent: Option<PageId>,

        /// Attach an image file as the page image
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Upload an image and print its public URL
    Upload {
        file: PathBuf,

        #[arg(long, default_value = fotons::storage::IMAGES_FOLDER)]
        folder: String,
    },

    /// Delete a page (admins only)
    #[command(alias = "rm")]
    Delete { id: PageId },
}

#[tokio::main]
async fn main() -> Result<()> {
    // determine environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = FotonsConfig::from_env();

    let api = ApiClient::new(&config.api_url, config.request_timeout)
        .with_context(|| format!("Invalid API url {}", config.api_url))?;
    let session = Arc::new(
        Session::init(api, SessionStore::new(&config.session_file))
            .context("Failed to restore session")?,
    );
    let repo: Arc<dyn PageRepository> = Arc::new(HttpPageRepository::new(session.clone()));

    match cli.command {
        Commands::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            println!("Logged in as {} ({})", user.email, user.role());
        }
        Commands::Logout => {
            session.logout().await?;
            println!("Logged out.");
        }
        Commands::List { search, tab } => {
            session.guard().await?;
            let pages = fetch_library(repo.as_ref()).await?;

            let mut view = LibraryView::new(tab);
            if let Some(search) = search {
                view.set_search(search);
            }
            let visible = view.visible(&pages);
            let selected = view.default_selection(&visible, None).map(|p| p.id);

            println!("{} ({} pages)", view.tab().label(), visible.len());
            for page in &visible {
                let marker = if Some(page.id) == selected { '>' } else { ' ' };
                println!("{} {:>6}  {:<16}  {}", marker, page.id, custom_date_label(page), page.title);
            }
        }
        Commands::Show { id } => {
            session.guard().await?;
            let page = repo.get_by_id(id).await?;
            let content = resolve_dialect_links(page.content.as_deref().unwrap_or(""), repo.as_ref()).await;
            println!("# {}\n", page.title);
            println!("{}", content);
        }
        Commands::Edit {
            target,
            title,
            parent,
            image,
        } => {
            session.guard().await?;
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read content from stdin")?;

            let mut studio = Studio::open(
                repo.clone(),
                Arc::new(LoggingNavigator),
                AutosaveConfig::from(&config),
                target,
                parent,
            )
            .await?;

            if let Some(title) = title {
                studio.edit(FieldEdit::Title(title)).await;
            }
            if let Some(path) = image {
                let uploader = HttpImageUploader::from_config(&config);
                let payload = ImagePayload::from_path(&path)?;
                let url = studio.attach_image(&uploader, &payload, ImageSlot::Image).await?;
                info!(%url, "Attached image");
            }
            studio.replace_content(&content).await;

            let state = studio.close().await;
            if let Some(error) = state.last_error {
                bail!("Save failed: {}", error);
            }
            match state.last_saved {
                Some(at) => println!("Saved at {}", at.format("%H:%M:%S")),
                None => println!("Nothing to save."),
            }
        }
        Commands::Upload { file, folder } => {
            let uploader = HttpImageUploader::from_config(&config);
            let payload = ImagePayload::from_path(&file)?;
            let url = uploader.upload(&payload, &folder).await?;
            println!("{}", url);
        }
        Commands::Delete { id } => {
            let user = session.guard().await?;
            if !can_delete(Some(&user)) {
                bail!("Only admins can delete pages");
            }
            let ack = repo.delete(id).await?;
            println!("{}", ack.message);
        }
    }

    Ok(())
}
