use clap::{Args, Subcommand};

use larder_core::models::EntityId;
use larder_core::{
    Category, CategoryCreate, CategoryQuery, CategorySort, CategoryUpdate, Session, SortOrder,
};

use super::{paging, parse_metadata, print_json, print_page_json, print_pagination};
use super::{CommandError, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub command: CategorySubcommand,
}

#[derive(Subcommand)]
pub enum CategorySubcommand {
    /// List categories
    List {
        /// Filter by name
        #[arg(long)]
        name: Option<String>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Sort key (name, createdAt, updatedAt)
        #[arg(long)]
        sort: Option<CategorySort>,

        /// Sort order (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show a category
    Show {
        id: EntityId,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Create a category
    Create {
        name: String,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Rename a category or replace its metadata
    Update {
        id: EntityId,

        #[arg(long)]
        name: Option<String>,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Delete a category
    Delete { id: EntityId },
}

impl CategoryCommand {
    pub async fn run(&self, session: &Session, config: &Config) -> Result<(), CommandError> {
        let store = session.categories();
        match &self.command {
            CategorySubcommand::List {
                name,
                page,
                sort,
                order,
                format,
            } => {
                store
                    .fetch_list(CategoryQuery {
                        name: name.clone(),
                        paging: paging(*page, config),
                        sort_by: *sort,
                        order: *order,
                    })
                    .await?;

                let items = store.items();
                match format {
                    OutputFormat::Json => print_page_json(&items, &store.pagination())?,
                    OutputFormat::Table => {
                        if items.is_empty() {
                            println!("No categories found.");
                            return Ok(());
                        }
                        println!("{:<6} {:<30} {}", "ID", "NAME", "UPDATED");
                        for category in &items {
                            println!(
                                "{:<6} {:<30} {}",
                                category.id, category.name, category.updated_at
                            );
                        }
                        print_pagination(&store.pagination());
                    }
                }
                Ok(())
            }

            CategorySubcommand::Show { id, format } => {
                let category = store.fetch_one(*id).await?;
                match format {
                    OutputFormat::Json => print_json(&category)?,
                    OutputFormat::Table => print_category(&category),
                }
                Ok(())
            }

            CategorySubcommand::Create { name, metadata } => {
                let category = store
                    .create(CategoryCreate {
                        name: name.clone(),
                        metadata: parse_metadata(metadata.as_deref())?,
                    })
                    .await?;
                println!("Created category: {} ({})", category.name, category.id);
                Ok(())
            }

            CategorySubcommand::Update { id, name, metadata } => {
                if name.is_none() && metadata.is_none() {
                    return Err(CommandError::Input(
                        "Nothing to update: pass --name or --metadata".to_string(),
                    ));
                }
                let category = store
                    .update(
                        *id,
                        CategoryUpdate {
                            name: name.clone(),
                            metadata: parse_metadata(metadata.as_deref())?,
                        },
                    )
                    .await?;
                println!("Updated category: {} ({})", category.name, category.id);
                Ok(())
            }

            CategorySubcommand::Delete { id } => {
                store.delete(*id).await?;
                println!("Deleted category {}", id);
                Ok(())
            }
        }
    }
}

fn print_category(category: &Category) {
    println!("{}", category.name);
    println!("{}", "=".repeat(category.name.len().max(8)));
    println!("id:      {}", category.id);
    println!("created: {}", category.created_at);
    println!("updated: {}", category.updated_at);
    if let Some(metadata) = &category.metadata {
        println!("metadata: {}", metadata);
    }
}
