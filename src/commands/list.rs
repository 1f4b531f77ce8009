//! Shopping list CLI commands.
//!
//! Manage shopping lists, check items off, and move purchases into a pantry.

use clap::{Args, Subcommand};

use larder_core::models::EntityId;
use larder_core::{
    ItemFilter, ListItem, ListItemCreate, ListItemQuery, ListItemSort, ListItemUpdate, Session,
    SessionEvent, ShoppingList, ShoppingListCreate, ShoppingListQuery, ShoppingListSort,
    ShoppingListUpdate, SortOrder,
};

use super::pantry::print_users;
use super::{format_quantity, paging, parse_metadata, print_json, print_page_json};
use super::{print_pagination, CommandError, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct ListCommand {
    #[command(subcommand)]
    pub command: ListSubcommand,
}

#[derive(Subcommand)]
pub enum ListSubcommand {
    /// List shopping lists
    List {
        /// Filter by name
        #[arg(long)]
        name: Option<String>,

        /// Only lists I own
        #[arg(long, conflicts_with = "others")]
        mine: bool,

        /// Only lists other users shared with me
        #[arg(long)]
        others: bool,

        /// Only recurring lists
        #[arg(long)]
        recurring: bool,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Sort key (name, owner, createdAt, updatedAt, lastPurchasedAt)
        #[arg(long)]
        sort: Option<ShoppingListSort>,

        /// Sort order (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show a shopping list
    Show {
        id: EntityId,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Create a shopping list
    Create {
        name: String,

        #[arg(long, short, default_value = "")]
        description: String,

        /// Make the list recurring
        #[arg(long)]
        recurring: bool,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Update a shopping list
    Update {
        id: EntityId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, short)]
        description: Option<String>,

        /// Set whether the list recurs (true or false)
        #[arg(long)]
        recurring: Option<bool>,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Delete a shopping list
    Delete { id: EntityId },

    /// Mark a list as purchased
    Purchase {
        id: EntityId,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Uncheck every item on a list
    Reset { id: EntityId },

    /// Move the purchased items of a list into the pantry
    MoveToPantry { id: EntityId },

    /// Share a list with another user
    Share { id: EntityId, email: String },

    /// List the users a list is shared with
    SharedUsers {
        id: EntityId,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Stop sharing a list with a user
    Revoke { id: EntityId, user_id: EntityId },

    /// Manage the items on a list
    Items {
        #[command(subcommand)]
        command: ListItemSubcommand,
    },
}

#[derive(Subcommand)]
pub enum ListItemSubcommand {
    /// Show the items on a list
    List {
        list_id: EntityId,

        /// Only purchased items
        #[arg(long, conflicts_with = "pending")]
        purchased: bool,

        /// Only items still to buy
        #[arg(long)]
        pending: bool,

        /// Only items whose product is in this category
        #[arg(long)]
        category: Option<EntityId>,

        /// Only items whose product is stocked in this pantry
        #[arg(long)]
        pantry: Option<EntityId>,

        /// Server-side search
        #[arg(long)]
        search: Option<String>,

        /// Narrow the fetched page by product name
        #[arg(long)]
        grep: Option<String>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Sort key (updatedAt, createdAt, lastPurchasedAt, productName)
        #[arg(long)]
        sort: Option<ListItemSort>,

        /// Sort order (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Add a product to a list
    Add {
        list_id: EntityId,

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
        list_id: EntityId,
        item_id: EntityId,

        #[arg(long, short)]
        qty: Option<f64>,

        #[arg(long, short)]
        unit: Option<String>,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Remove an item from a list
    Remove { list_id: EntityId, item_id: EntityId },

    /// Check an item off (or back on with --undo)
    Toggle {
        list_id: EntityId,
        item_id: EntityId,

        /// Mark the item as not purchased
        #[arg(long)]
        undo: bool,
    },
}

impl ListCommand {
    pub async fn run(&self, session: &Session, config: &Config) -> Result<(), CommandError> {
        let store = session.shopping_lists();
        match &self.command {
            ListSubcommand::List {
                name,
                mine,
                others,
                recurring,
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
                    .fetch_list(ShoppingListQuery {
                        name: name.clone(),
                        owner,
                        recurring: recurring.then_some(true),
                        paging: paging(*page, config),
                        sort_by: *sort,
                        order: *order,
                    })
                    .await?;

                let lists = store.items();
                match format {
                    OutputFormat::Json => print_page_json(&lists, &store.pagination())?,
                    OutputFormat::Table => {
                        if lists.is_empty() {
                            println!("No shopping lists found.");
                            return Ok(());
                        }
                        println!("{:<6} {:<25} {:<25} {}", "ID", "NAME", "OWNER", "STATUS");
                        for list in &lists {
                            println!(
                                "{:<6} {:<25} {:<25} {}",
                                list.id,
                                list.name,
                                list.owner.email,
                                status_label(list)
                            );
                        }
                        print_pagination(&store.pagination());
                    }
                }
                Ok(())
            }

            ListSubcommand::Show { id, format } => {
                let list = store.fetch_one(*id).await?;
                match format {
                    OutputFormat::Json => print_json(&list)?,
                    OutputFormat::Table => print_list(&list),
                }
                Ok(())
            }

            ListSubcommand::Create {
                name,
                description,
                recurring,
                metadata,
            } => {
                let list = store
                    .create(ShoppingListCreate {
                        name: name.clone(),
                        description: description.clone(),
                        recurring: recurring.then_some(true),
                        metadata: parse_metadata(metadata.as_deref())?,
                    })
                    .await?;
                println!("Created shopping list: {} ({})", list.name, list.id);
                Ok(())
            }

            ListSubcommand::Update {
                id,
                name,
                description,
                recurring,
                metadata,
            } => {
                let update = ShoppingListUpdate {
                    name: name.clone(),
                    description: description.clone(),
                    recurring: *recurring,
                    metadata: parse_metadata(metadata.as_deref())?,
                };
                if update == ShoppingListUpdate::default() {
                    return Err(CommandError::Input(
                        "Nothing to update: pass --name, --description, --recurring or --metadata"
                            .to_string(),
                    ));
                }
                let list = store.update(*id, update).await?;
                println!("Updated shopping list: {} ({})", list.name, list.id);
                Ok(())
            }

            ListSubcommand::Delete { id } => {
                store.delete(*id).await?;
                println!("Deleted shopping list {}", id);
                Ok(())
            }

            ListSubcommand::Purchase { id, metadata } => {
                let list = store
                    .purchase(*id, parse_metadata(metadata.as_deref())?)
                    .await?;
                println!("Purchased {} ({})", list.name, status_label(&list));
                Ok(())
            }

            ListSubcommand::Reset { id } => {
                let items = store.reset_list(*id).await?;
                println!("Reset {} item(s) on list {}", items.len(), id);
                Ok(())
            }

            ListSubcommand::MoveToPantry { id } => {
                let mut events = session.subscribe();
                session.move_to_pantry(*id).await?;
                while let Ok(event) = events.try_recv() {
                    if let SessionEvent::ItemsMovedToPantry { list_id } = event {
                        println!("Moved purchased items of list {} to the pantry", list_id);
                    }
                }
                Ok(())
            }

            ListSubcommand::Share { id, email } => {
                let user = store.share(*id, email).await?;
                println!("Shared list {} with {} <{}>", id, user.full_name(), user.email);
                Ok(())
            }

            ListSubcommand::SharedUsers { id, format } => {
                let users = store.fetch_shared_users(*id).await?;
                print_users(&users, *format)
            }

            ListSubcommand::Revoke { id, user_id } => {
                store.revoke_share(*id, *user_id).await?;
                println!("Revoked access to list {} for user {}", id, user_id);
                Ok(())
            }

            ListSubcommand::Items { command } => run_items(command, session, config).await,
        }
    }
}

async fn run_items(
    command: &ListItemSubcommand,
    session: &Session,
    config: &Config,
) -> Result<(), CommandError> {
    match command {
        ListItemSubcommand::List {
            list_id,
            purchased,
            pending,
            category,
            pantry,
            search,
            grep,
            page,
            sort,
            order,
            format,
        } => {
            let store = session.list_items(*list_id)?;
            let purchased = match (*purchased, *pending) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            store
                .fetch_list(ListItemQuery {
                    purchased,
                    pantry_id: *pantry,
                    category_id: *category,
                    search: search.clone(),
                    paging: paging(*page, config),
                    sort_by: *sort,
                    order: *order,
                })
                .await?;

            let items = store.filter(&ItemFilter {
                search: grep.clone(),
                ..Default::default()
            });
            match format {
                OutputFormat::Json => print_page_json(&items, &store.pagination())?,
                OutputFormat::Table => {
                    if items.is_empty() {
                        println!("No items on this list.");
                        return Ok(());
                    }
                    // Pending first, then purchased
                    let (done, todo): (Vec<&ListItem>, Vec<&ListItem>) =
                        items.iter().partition(|i| i.purchased);
                    for item in todo.iter().chain(done.iter()) {
                        print_item_row(item);
                    }
                    println!("{}", "-".repeat(44));
                    println!(
                        "{} of {} items purchased",
                        store.purchased_count(),
                        store.purchased_count() + store.pending_count()
                    );
                    if store.all_purchased() {
                        println!("Everything on this page is purchased.");
                    }
                    print_pagination(&store.pagination());
                }
            }
            Ok(())
        }

        ListItemSubcommand::Add {
            list_id,
            product,
            qty,
            unit,
            metadata,
        } => {
            let store = session.list_items(*list_id)?;
            let mut input = ListItemCreate::new(*product, *qty, unit.clone());
            input.metadata = parse_metadata(metadata.as_deref())?;

            let item = store.create(input).await?;
            println!(
                "Added {} {} {} to list {} (item {})",
                format_quantity(item.quantity),
                item.unit,
                item.product.name,
                list_id,
                item.id
            );
            Ok(())
        }

        ListItemSubcommand::Update {
            list_id,
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
            let store = session.list_items(*list_id)?;
            let item = store
                .update(
                    *item_id,
                    ListItemUpdate {
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

        ListItemSubcommand::Remove { list_id, item_id } => {
            let store = session.list_items(*list_id)?;
            store.delete(*item_id).await?;
            println!("Removed item {} from list {}", item_id, list_id);
            Ok(())
        }

        ListItemSubcommand::Toggle {
            list_id,
            item_id,
            undo,
        } => {
            // Focus the parent list so a reported completion lands somewhere.
            session.shopping_lists().fetch_one(*list_id).await?;
            let items = session.list_items(*list_id)?;

            let item = session.toggle_purchased(&items, *item_id, !undo).await?;
            let check = if item.purchased { "[x]" } else { "[ ]" };
            println!("{} {}", check, item.product.name);

            if let Some(list) = session.shopping_lists().current() {
                if list.is_completed() {
                    println!("List '{}' is complete.", list.name);
                }
            }
            Ok(())
        }
    }
}

fn status_label(list: &ShoppingList) -> &'static str {
    match list.completed {
        Some(true) => "complete",
        Some(false) => "open",
        None => "-",
    }
}

fn print_item_row(item: &ListItem) {
    let check = if item.purchased { "[x]" } else { "[ ]" };
    println!(
        "{} {:<6} {:<25} {} {}",
        check,
        item.id,
        item.product.name,
        format_quantity(item.quantity),
        item.unit
    );
}

fn print_list(list: &ShoppingList) {
    println!("{}", list.name);
    println!("{}", "=".repeat(list.name.len().max(8)));
    println!("id:        {}", list.id);
    println!("owner:     {} <{}>", list.owner.full_name(), list.owner.email);
    if let Some(description) = list.description.as_deref().filter(|d| !d.is_empty()) {
        println!("about:     {}", description);
    }
    println!("recurring: {}", list.recurring.unwrap_or(false));
    println!("status:    {}", status_label(list));
    if let Some(at) = &list.last_purchased_at {
        println!("purchased: {}", at);
    }
    if !list.shared_with.is_empty() {
        println!("shared with:");
        for user in &list.shared_with {
            println!("  {} <{}>", user.full_name(), user.email);
        }
    }
}
