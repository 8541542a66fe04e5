// src/main.rs
//
// recipebook CLI

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use recipebook::application::dto::{self, CategoryRowProps};
use recipebook::db::{get_connection, get_database_stats, verify_database_integrity};
use recipebook::{AppConfig, AppState};

/// Browse TheMealDB recipes from a local, offline-capable cache.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// SQLite file backing the cache
    #[arg(short, long, env = "RECIPEBOOK_DATABASE")]
    database: Option<PathBuf>,
    /// Enable verbose logging{n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all categories and their meal listings
    Refresh,
    /// List cached categories with their meal counts
    Categories,
    /// List cached meals of one category
    Meals { category_id: String },
    /// Show one cached meal
    Meal {
        id: String,
        /// Fetch the full recipe before showing it
        #[arg(long)]
        fetch: bool,
    },
    /// Toggle a meal's favorite flag
    Like { meal_id: String },
    /// List favorite meals, most recently liked first
    Favorites,
    /// Print live category and favorite rows until Ctrl-C
    Watch {
        /// Run a full refresh after subscribing
        #[arg(long)]
        refresh: bool,
    },
    /// Show cache statistics
    Stats,
}

fn logger_init() {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(
            "recipebook",
            if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default()
                == "debug"
            {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();
}

fn print_row(row: &CategoryRowProps) {
    println!("{:<24} {:>4} meals  [{}]", row.title(), row.cells.len(), row.id());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        env::set_var("RUST_LOG", "debug");
    }
    logger_init();

    let mut config = AppConfig::from_env()?;
    if let Some(path) = args.database {
        config.database_path = path;
    }
    let state = AppState::initialize(config)?;

    match args.command {
        Command::Refresh => {
            let report = state.ingestion.refresh_categories().await?;
            println!(
                "{} categories, {} meals refreshed",
                report.categories, report.meals
            );
            for (category, error) in &report.failed {
                println!("  {} failed: {}", category, error);
            }
        }
        Command::Categories => {
            for row in dto::category_rows(state.store.categories()?) {
                print_row(&row);
            }
        }
        Command::Meals { category_id } => {
            for meal in dto::meal_rows(state.store.meals_in_category(&category_id)?) {
                let heart = if meal.is_liked { "*" } else { " " };
                println!("{} {:<8} {}", heart, meal.id, meal.name);
            }
        }
        Command::Meal { id, fetch } => {
            if fetch {
                state.ingestion.refresh_meal(&id).await?;
            }
            match state.store.meal(&id)? {
                Some(meal) => {
                    let props = dto::meal_detail(Some(meal));
                    println!("{}{}", props.name, if props.is_liked { " (favorite)" } else { "" });
                    for ingredient in &props.ingredients {
                        println!("  - {} {}", ingredient.measurement, ingredient.name);
                    }
                    if !props.instructions.is_empty() {
                        println!("\n{}", props.instructions);
                    }
                }
                None => println!("Meal {} is not cached; try --fetch", id),
            }
        }
        Command::Like { meal_id } => match state.store.toggle_favorite(meal_id.clone()).await? {
            Some(true) => println!("Liked {}", meal_id),
            Some(false) => println!("Unliked {}", meal_id),
            None => println!("Meal {} is not cached", meal_id),
        },
        Command::Favorites => {
            let row = dto::favorites_row(state.store.favorite_meals()?);
            for cell in &row.cells {
                println!("{:<8} {}", cell.id, cell.name);
            }
        }
        Command::Watch { refresh } => watch(&state, refresh).await?,
        Command::Stats => {
            let conn = get_connection(state.store.pool())?;
            verify_database_integrity(&conn)?;
            let stats = get_database_stats(&conn)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

async fn watch(state: &AppState, refresh: bool) -> anyhow::Result<()> {
    let view_model = state.categories_view_model();
    let mut categories = view_model.categories();
    let mut favorites = view_model.favorites();

    if refresh {
        view_model.fetch_categories().await;
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = categories.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("--- categories ---");
                for row in categories.borrow_and_update().iter() {
                    print_row(row);
                }
            }
            changed = favorites.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("--- favorites ---");
                print_row(&favorites.borrow_and_update());
            }
            _ = &mut ctrl_c => break,
        }
    }

    view_model.cancel();
    Ok(())
}
