//! forum-tags command-line tool
//!
//! Seeds the tag taxonomy and runs tag-filtered post queries against the
//! configured database.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use forum_store::{seed_tags, ForumConfig, SqliteForumStore, TaxonomyService};
use forum_tags::{FacetQuery, NameTree, TagSelector, TagStore, TagTree};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (defaults to ~/.forum-tags/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the nested set from a JSON name tree and upsert it by name
    Seed {
        /// Name tree file (defaults to the configured taxonomy path)
        tree: Option<PathBuf>,
    },
    /// Print every tag with its interval
    List,
    /// Print the taxonomy as a tree
    Tree,
    /// Print the stored taxonomy back as a JSON name tree
    Export,
    /// Show tags matching TEXT in tree context
    Find {
        text: String,
        /// Tags already selected; their subtrees are hidden
        #[arg(long = "selected")]
        selected: Vec<String>,
    },
    /// List posts carrying each tag (or one of its descendants)
    Posts {
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = ForumConfig::load(args.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = Arc::new(SqliteForumStore::open(&config.database_path)?);
    let service = TaxonomyService::new(Arc::clone(&store));

    match args.command {
        Command::Seed { tree } => {
            let path = tree.unwrap_or_else(|| config.taxonomy_path.clone());
            let tree = NameTree::from_json(&std::fs::read_to_string(&path)?)?;
            let report = seed_tags(store.as_ref(), &tree)?;
            println!(
                "{} inserted, {} updated, {} unchanged, {} removed, {} parked",
                report.inserted, report.updated, report.unchanged, report.removed, report.parked
            );
        }
        Command::List => {
            for tag in store.list_all()? {
                println!("{:>5} {:>5}  {}{}", tag.lft, tag.rgt, "  ".repeat(tag.depth as usize), tag.name);
            }
        }
        Command::Tree => {
            print!("{}", TagTree::from_records(service.tags().await?)?.format_tree());
        }
        Command::Export => {
            let tree = TagTree::from_records(service.tags().await?)?;
            println!("{}", tree.to_name_tree().to_json_pretty()?);
        }
        Command::Find { text, selected } => {
            let tags = service.tags().await?;
            let hierarchy = TagTree::from_records(tags.clone())?;
            let mut selector = TagSelector::new(tags)?;
            for tag in hierarchy.resolve_names(&selected)? {
                selector.select(tag.id);
            }
            selector.set_query(text);

            let candidates = selector.candidates();
            for visible in selector.visible() {
                let marker = if candidates.iter().any(|c| c.id == visible.tag.id) {
                    "*"
                } else {
                    " "
                };
                println!("{} {}{}", marker, "  ".repeat(visible.tag.depth as usize), visible.tag.name);
            }
        }
        Command::Posts { tags, limit, offset } => {
            let hierarchy = TagTree::from_records(service.tags().await?)?;
            let selection = forum_tags::reduce(&hierarchy.resolve_names(&tags)?)?;
            let query = FacetQuery::from_tags(&selection)
                .with_limit(limit.or(Some(config.page_size)))
                .with_offset(offset);

            for id in service.find_content(query).await? {
                let names: Vec<String> = store.content_tags(id)?.into_iter().map(|t| t.name).collect();
                println!("{}  [{}]", id, names.join(", "));
            }
        }
    }

    Ok(())
}
