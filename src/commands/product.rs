use clap::{Args, Subcommand};

use larder_core::models::EntityId;
use larder_core::{Product, ProductInput, ProductQuery, ProductSort, Session, SortOrder};

use super::{paging, parse_metadata, print_json, print_page_json, print_pagination};
use super::{CommandError, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct ProductCommand {
    #[command(subcommand)]
    pub command: ProductSubcommand,
}

#[derive(Subcommand)]
pub enum ProductSubcommand {
    /// List products
    List {
        /// Filter by name
        #[arg(long)]
        name: Option<String>,

        /// Only products in this category
        #[arg(long)]
        category: Option<EntityId>,

        /// Only products stocked in this pantry
        #[arg(long)]
        pantry: Option<EntityId>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Sort key (name, categoryName, createdAt, updatedAt)
        #[arg(long)]
        sort: Option<ProductSort>,

        /// Sort order (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,

        /// Group the page by category
        #[arg(long, short)]
        grouped: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show a product
    Show {
        id: EntityId,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Create a product
    Create {
        name: String,

        /// Category ID
        #[arg(long)]
        category: Option<EntityId>,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Update a product
    Update {
        id: EntityId,

        #[arg(long)]
        name: Option<String>,

        /// Category ID
        #[arg(long)]
        category: Option<EntityId>,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Delete a product
    Delete { id: EntityId },
}

impl ProductCommand {
    pub async fn run(&self, session: &Session, config: &Config) -> Result<(), CommandError> {
        let store = session.products();
        match &self.command {
            ProductSubcommand::List {
                name,
                category,
                pantry,
                page,
                sort,
                order,
                grouped,
                format,
            } => {
                store
                    .fetch_list(ProductQuery {
                        name: name.clone(),
                        category_id: *category,
                        pantry_id: *pantry,
                        paging: paging(*page, config),
                        sort_by: *sort,
                        order: *order,
                    })
                    .await?;

                let items = store.items();
                match format {
                    OutputFormat::Json if *grouped => {
                        let groups: Vec<_> = store
                            .by_category()
                            .into_iter()
                            .map(|g| {
                                serde_json::json!({
                                    "category": g.name(),
                                    "products": g.items,
                                })
                            })
                            .collect();
                        print_json(&groups)?;
                    }
                    OutputFormat::Json => print_page_json(&items, &store.pagination())?,
                    OutputFormat::Table => {
                        if items.is_empty() {
                            println!("No products found.");
                            return Ok(());
                        }
                        if *grouped {
                            for group in store.by_category() {
                                println!("{} ({})", group.name(), group.items.len());
                                for product in &group.items {
                                    println!("  {:<6} {}", product.id, product.name);
                                }
                            }
                        } else {
                            println!("{:<6} {:<30} {}", "ID", "NAME", "CATEGORY");
                            for product in &items {
                                println!(
                                    "{:<6} {:<30} {}",
                                    product.id,
                                    product.name,
                                    product.category_name().unwrap_or("-")
                                );
                            }
                        }
                        print_pagination(&store.pagination());
                    }
                }
                Ok(())
            }

            ProductSubcommand::Show { id, format } => {
                let product = store.fetch_one(*id).await?;
                match format {
                    OutputFormat::Json => print_json(&product)?,
                    OutputFormat::Table => print_product(&product),
                }
                Ok(())
            }

            ProductSubcommand::Create {
                name,
                category,
                metadata,
            } => {
                let mut input = ProductInput::new(name.clone());
                if let Some(category_id) = category {
                    input = input.with_category(*category_id);
                }
                input.metadata = parse_metadata(metadata.as_deref())?;

                let product = store.create(input).await?;
                println!("Created product: {} ({})", product.name, product.id);
                Ok(())
            }

            ProductSubcommand::Update {
                id,
                name,
                category,
                metadata,
            } => {
                // The API takes the whole product, so unchanged fields come
                // from the server's copy.
                let existing = store.fetch_one(*id).await?;
                let mut input = ProductInput::new(name.clone().unwrap_or(existing.name));
                if let Some(category_id) = category.or(existing.category.map(|c| c.id)) {
                    input = input.with_category(category_id);
                }
                input.metadata = parse_metadata(metadata.as_deref())?;

                let product = store.update(*id, input).await?;
                println!("Updated product: {} ({})", product.name, product.id);
                Ok(())
            }

            ProductSubcommand::Delete { id } => {
                store.delete(*id).await?;
                println!("Deleted product {}", id);
                Ok(())
            }
        }
    }
}

fn print_product(product: &Product) {
    println!("{}", product.name);
    println!("{}", "=".repeat(product.name.len().max(8)));
    println!("id:       {}", product.id);
    println!("category: {}", product.category_name().unwrap_or("-"));
    println!("updated:  {}", product.updated_at);
    if let Some(metadata) = &product.metadata {
        println!("metadata: {}", metadata);
    }
}
