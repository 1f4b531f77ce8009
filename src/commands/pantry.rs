//! Pantry CLI commands.
//!
//! Manage pantries, the items stocked in them, and who they are shared with.

use clap::{Args, Subcommand};

use larder_core::models::EntityId;
use larder_core::{
    Pantry, PantryCreate, PantryItem, PantryItemCreate, PantryItemQuery, PantryItemSort,
    PantryItemUpdate, PantryQuery, PantrySort, PantryUpdate, Session, SortOrder, User,
};

use super::{format_quantity, paging, parse_metadata, print_json, print_page_json};
use super::{print_pagination, CommandError, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct PantryCommand {
    #[command(subcommand)]
    pub command: PantrySubcommand,
}

#[derive(Subcommand)]
pub enum PantrySubcommand {
    /// List pantries
    List {
        /// Filter by name
        #[arg(long)]
        name: Option<String>,

        /// Only pantries I own
        #[arg(long, conflicts_with = "others")]
        mine: bool,

        /// Only pantries other users shared with me
        #[arg(long)]
        others: bool,

        /// Only pantries owned by someone else or shared with at least one user
        #[arg(long)]
        shared: bool,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Sort key (name, owner, createdAt, updatedAt)
        #[arg(long)]
        sort: Option<PantrySort>,

        /// Sort order (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show a pantry
    Show {
        id: EntityId,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Create a pantry
    Create {
        name: String,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Rename a pantry or replace its metadata
    Update {
        id: EntityId,

        #[arg(long)]
        name: Option<String>,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Delete a pantry
    Delete { id: EntityId },

    /// Share a pantry with another user
    Share { id: EntityId, email: String },

    /// List the users a pantry is shared with
    SharedUsers {
        id: EntityId,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Stop sharing a pantry with a user
    Revoke { id: EntityId, user_id: EntityId },

    /// Manage the items in a pantry
    Items {
        #[command(subcommand)]
        command: PantryItemSubcommand,
    },
}

#[derive(Subcommand)]
pub enum PantryItemSubcommand {
    /// List the items in a pantry
    List {
        pantry_id: EntityId,

        /// Server-side search
        #[arg(long)]
        search: Option<String>,

        /// Only items whose product is in this category
        #[arg(long)]
        category: Option<EntityId>,

        /// Narrow the fetched page by product name
        #[arg(long)]
        grep: Option<String>,

        /// Group the page by category
        #[arg(long, short)]
        grouped: bool,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Sort key (name, quantity, unit, productName)
        #[arg(long)]
        sort: Option<PantryItemSort>,

        /// Sort order (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Stock a product in a pantry
    Add {
        pantry_id: EntityId,

        /// Product ID
        #[arg(long)]
        product: EntityId,

        #[arg(long, short)]
        qty: f64,

        #[arg(long, short)]
        unit: String,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Change an item's quantity or unit
    Update {
        pantry_id: EntityId,
        item_id: EntityId,

        #[arg(long, short)]
        qty: Option<f64>,

        #[arg(long, short)]
        unit: Option<String>,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Remove an item from a pantry
    Remove { pantry_id: EntityId, item_id: EntityId },
}

impl PantryCommand {
    pub async fn run(&self, session: &Session, config: &Config) -> Result<(), CommandError> {
        let store = session.pantries();
        match &self.command {
            PantrySubcommand::List {
                name,
                mine,
                others,
                shared,
                page,
                sort,
                order,
                format,
            } => {
                let owner = match (*mine, *others) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                store
                    .fetch_list(PantryQuery {
                        name: name.clone(),
                        owner,
                        paging: paging(*page, config),
                        sort_by: *sort,
                        order: *order,
                    })
                    .await?;

                let pantries = if *shared {
                    let me = match session.current_user() {
                        Some(user) => user,
                        None => session.profile().await?,
                    };
                    store.shared(me.id)
                } else {
                    store.items()
                };
                match format {
                    OutputFormat::Json => print_page_json(&pantries, &store.pagination())?,
                    OutputFormat::Table => {
                        if pantries.is_empty() {
                            println!("No pantries found.");
                            return Ok(());
                        }
                        println!("{:<6} {:<25} {:<25} {}", "ID", "NAME", "OWNER", "SHARED");
                        for pantry in &pantries {
                            println!(
                                "{:<6} {:<25} {:<25} {}",
                                pantry.id,
                                pantry.name,
                                pantry.owner.email,
                                pantry.shared_with.as_ref().map_or(0, Vec::len)
                            );
                        }
                        print_pagination(&store.pagination());
                    }
                }
                Ok(())
            }

            PantrySubcommand::Show { id, format } => {
                let pantry = store.fetch_one(*id).await?;
                match format {
                    OutputFormat::Json => print_json(&pantry)?,
                    OutputFormat::Table => print_pantry(&pantry),
                }
                Ok(())
            }

            PantrySubcommand::Create { name, metadata } => {
                let pantry = store
                    .create(PantryCreate {
                        name: name.clone(),
                        metadata: parse_metadata(metadata.as_deref())?,
                    })
                    .await?;
                println!("Created pantry: {} ({})", pantry.name, pantry.id);
                Ok(())
            }

            PantrySubcommand::Update { id, name, metadata } => {
                if name.is_none() && metadata.is_none() {
                    return Err(CommandError::Input(
                        "Nothing to update: pass --name or --metadata".to_string(),
                    ));
                }
                let pantry = store
                    .update(
                        *id,
                        PantryUpdate {
                            name: name.clone(),
                            metadata: parse_metadata(metadata.as_deref())?,
                        },
                    )
                    .await?;
                println!("Updated pantry: {} ({})", pantry.name, pantry.id);
                Ok(())
            }

            PantrySubcommand::Delete { id } => {
                store.delete(*id).await?;
                println!("Deleted pantry {}", id);
                Ok(())
            }

            PantrySubcommand::Share { id, email } => {
                let user = store.share(*id, email).await?;
                println!("Shared pantry {} with {} <{}>", id, user.full_name(), user.email);
                Ok(())
            }

            PantrySubcommand::SharedUsers { id, format } => {
                let users = store.fetch_shared_users(*id).await?;
                print_users(&users, *format)
            }

            PantrySubcommand::Revoke { id, user_id } => {
                store.revoke_share(*id, *user_id).await?;
                println!("Revoked access to pantry {} for user {}", id, user_id);
                Ok(())
            }

            PantrySubcommand::Items { command } => run_items(command, session, config).await,
        }
    }
}

async fn run_items(
    command: &PantryItemSubcommand,
    session: &Session,
    config: &Config,
) -> Result<(), CommandError> {
    match command {
        PantryItemSubcommand::List {
            pantry_id,
            search,
            category,
            grep,
            grouped,
            page,
            sort,
            order,
            format,
        } => {
            let store = session.pantry_items(*pantry_id)?;
            store
                .fetch_list(PantryItemQuery {
                    search: search.clone(),
                    category_id: *category,
                    paging: paging(*page, config),
                    sort_by: *sort,
                    order: *order,
                })
                .await?;

            let items = match grep {
                Some(text) => store.filter(text),
                None => store.items(),
            };
            match format {
                OutputFormat::Json => print_page_json(&items, &store.pagination())?,
                OutputFormat::Table if *grouped => {
                    for group in store.by_category() {
                        println!("{}", group.name());
                        for item in &group.items {
                            print_item_row(item);
                        }
                    }
                    print_pagination(&store.pagination());
                }
                OutputFormat::Table => {
                    if items.is_empty() {
                        println!("Pantry is empty.");
                        return Ok(());
                    }
                    for item in &items {
                        print_item_row(item);
                    }
                    print_pagination(&store.pagination());
                }
            }
            Ok(())
        }

        PantryItemSubcommand::Add {
            pantry_id,
            product,
            qty,
            unit,
            metadata,
        } => {
            let store = session.pantry_items(*pantry_id)?;
            let mut input = PantryItemCreate::new(*product, *qty, unit.clone());
            input.metadata = parse_metadata(metadata.as_deref())?;

            let item = store.create(input).await?;
            println!(
                "Added {} {} {} to pantry {} (item {})",
                format_quantity(item.quantity),
                item.unit,
                item.product.name,
                pantry_id,
                item.id
            );
            Ok(())
        }

        PantryItemSubcommand::Update {
            pantry_id,
            item_id,
            qty,
            unit,
            metadata,
        } => {
            if qty.is_none() && unit.is_none() && metadata.is_none() {
                return Err(CommandError::Input(
                    "Nothing to update: pass --qty, --unit or --metadata".to_string(),
                ));
            }
            let store = session.pantry_items(*pantry_id)?;
            let item = store
                .update(
                    *item_id,
                    PantryItemUpdate {
                        quantity: *qty,
                        unit: unit.clone(),
                        metadata: parse_metadata(metadata.as_deref())?,
                    },
                )
                .await?;
            println!(
                "Updated {}: {} {}",
                item.product.name,
                format_quantity(item.quantity),
                item.unit
            );
            Ok(())
        }

        PantryItemSubcommand::Remove { pantry_id, item_id } => {
            let store = session.pantry_items(*pantry_id)?;
            store.delete(*item_id).await?;
            println!("Removed item {} from pantry {}", item_id, pantry_id);
            Ok(())
        }
    }
}

fn print_item_row(item: &PantryItem) {
    println!(
        "  {:<6} {:<25} {} {}",
        item.id,
        item.product.name,
        format_quantity(item.quantity),
        item.unit
    );
}

fn print_pantry(pantry: &Pantry) {
    println!("{}", pantry.name);
    println!("{}", "=".repeat(pantry.name.len().max(8)));
    println!("id:      {}", pantry.id);
    println!("owner:   {} <{}>", pantry.owner.full_name(), pantry.owner.email);
    println!("updated: {}", pantry.updated_at);
    if let Some(users) = &pantry.shared_with {
        if !users.is_empty() {
            println!("shared with:");
            for user in users {
                println!("  {} <{}>", user.full_name(), user.email);
            }
        }
    }
}

/// Shared-user listing used by both pantries and shopping lists.
pub(super) fn print_users(users: &[User], format: OutputFormat) -> Result<(), CommandError> {
    match format {
        OutputFormat::Json => print_json(users)?,
        OutputFormat::Table => {
            if users.is_empty() {
                println!("Not shared with anyone.");
                return Ok(());
            }
            println!("{:<6} {:<30} {}", "ID", "EMAIL", "NAME");
            for user in users {
                println!("{:<6} {:<30} {}", user.id, user.email, user.full_name());
            }
        }
    }
    Ok(())
}
