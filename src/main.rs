use std::io::{self, Write};

use anyhow::{bail, Context};

use smartrecipes::ratings::services::{self as ratings, RatingEligibility};
use smartrecipes::recipes::dto::RecipeDraft;
use smartrecipes::recipes::services::{self as recipes, DeleteConfirmation};
use smartrecipes::session::StoredUser;
use smartrecipes::state::AppState;
use smartrecipes::users::services as users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "smartrecipes=debug,reqwest=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };
    let rest = &args[1..];

    match command.as_str() {
        "register" => {
            let user = users::register(
                state.backend.as_ref(),
                &state.sessions,
                arg(rest, 0, "username")?,
                arg(rest, 1, "email")?,
                arg(rest, 2, "password")?,
            )
            .await?;
            println!("registered and logged in as {} (id {})", user.username, user.id);
        }
        "login" => {
            let user = users::login(
                state.backend.as_ref(),
                &state.sessions,
                arg(rest, 0, "email")?,
                arg(rest, 1, "password")?,
            )
            .await?;
            println!("logged in as {} (id {})", user.username, user.id);
        }
        "logout" => {
            users::logout(&state.sessions)?;
            println!("logged out");
        }
        "whoami" => match state.sessions.load() {
            Some(user) => println!("{} <{}> (id {})", user.username, user.email, user.id),
            None => println!("not logged in"),
        },
        "profile" => {
            let current = require_login(&state)?;
            let user = users::update_profile(
                state.backend.as_ref(),
                &state.sessions,
                &current,
                arg(rest, 0, "username")?,
                arg(rest, 1, "email")?,
                rest.get(2).map(String::as_str),
            )
            .await?;
            println!("profile updated: {} <{}>", user.username, user.email);
        }
        "catalog" => {
            let entries = match rest.first() {
                Some(category) => {
                    recipes::load_catalog_by_category(state.backend.as_ref(), category).await?
                }
                None => recipes::load_catalog(state.backend.as_ref()).await?,
            };
            print_catalog(&entries, state.sessions.load().as_ref());
        }
        "mine" => {
            let current = require_login(&state)?;
            let entries =
                recipes::load_catalog_by_user(state.backend.as_ref(), current.id).await?;
            print_catalog(&entries, Some(&current));
        }
        "show" => {
            let id = parse_id(rest, 0, "recipe-id")?;
            let detail = recipes::load_detail(state.backend.as_ref(), id).await?;
            let recipe = &detail.recipe;

            println!("{} [{}]", recipe.title, recipe.category);
            // a failed rating fetch must not read like an unrated recipe
            match detail.score() {
                Some(score) => println!("rating: {score}"),
                None => println!("rating: no rating data available"),
            }
            println!("\n{}", recipe.description);
            println!("\ningredients:\n{}", recipe.ingredients);
            println!("\nsteps:\n{}", recipe.steps);
            if let Some(url) = &recipe.image_url {
                println!("\nimage: {url}");
            }

            if let Some(user) = state.sessions.load() {
                if recipes::is_owner(recipe, &user) {
                    println!("\nyou own this recipe (edit/delete available)");
                } else {
                    match ratings::eligibility(state.backend.as_ref(), id, user.id).await {
                        Ok(RatingEligibility::Eligible) => {
                            println!("\nyou can rate this recipe with `rate {id} <stars> <comment>`")
                        }
                        Ok(RatingEligibility::AlreadyRated) => {
                            println!("\nyou have already rated this recipe")
                        }
                        Err(_) => println!("\nno rating data available"),
                    }
                }
            }

            match &detail.ratings {
                Some(all) if !all.is_empty() => {
                    println!("\nreviews:");
                    for rating in all {
                        println!(
                            "  {} stars (user {}): {}",
                            rating.stars, rating.user_id, rating.comment
                        );
                    }
                }
                Some(_) => {}
                None => println!("\nreviews: no rating data available"),
            }
        }
        "create" => {
            let current = require_login(&state)?;
            let recipe = recipes::create(
                state.backend.as_ref(),
                &current,
                draft_from_args(rest, 0)?,
            )
            .await?;
            println!("created recipe {} (id {})", recipe.title, recipe.id);
        }
        "update" => {
            let current = require_login(&state)?;
            let id = parse_id(rest, 0, "recipe-id")?;
            let recipe = recipes::fetch(state.backend.as_ref(), id).await?;
            let updated = recipes::update(
                state.backend.as_ref(),
                &current,
                &recipe,
                draft_from_args(rest, 1)?,
            )
            .await?;
            println!("updated recipe {} (id {})", updated.title, updated.id);
        }
        "delete" => {
            let current = require_login(&state)?;
            let id = parse_id(rest, 0, "recipe-id")?;
            let recipe = recipes::fetch(state.backend.as_ref(), id).await?;
            let confirmation = confirm_delete(&recipe.title)?;
            if recipes::delete(state.backend.as_ref(), &current, &recipe, confirmation).await? {
                println!("deleted recipe {id}");
            } else {
                println!("kept recipe {id}");
            }
        }
        "rate" => {
            let current = require_login(&state)?;
            let id = parse_id(rest, 0, "recipe-id")?;
            let stars: u8 = arg(rest, 1, "stars")?
                .parse()
                .context("stars must be a number from 1 to 5")?;
            let comment = rest[2..].join(" ");
            let rating =
                ratings::submit(state.backend.as_ref(), &current, id, stars, &comment).await?;
            println!("rated recipe {} with {} stars", rating.recipe_id, rating.stars);
        }
        other => {
            print_usage();
            bail!("unknown command: {other}");
        }
    }

    Ok(())
}

fn print_usage() {
    println!(
        "smartrecipes <command>\n\n\
         commands:\n\
         \x20 register <username> <email> <password>\n\
         \x20 login <email> <password>\n\
         \x20 logout\n\
         \x20 whoami\n\
         \x20 profile <username> <email> [new-password]\n\
         \x20 catalog [category]\n\
         \x20 mine\n\
         \x20 show <recipe-id>\n\
         \x20 create <title> <description> <ingredients> <steps> <category> [image-url]\n\
         \x20 update <recipe-id> <title> <description> <ingredients> <steps> <category> [image-url]\n\
         \x20 delete <recipe-id>\n\
         \x20 rate <recipe-id> <stars> <comment...>"
    );
}

fn print_catalog(
    entries: &[smartrecipes::recipes::services::CatalogEntry],
    user: Option<&StoredUser>,
) {
    if entries.is_empty() {
        println!("no recipes yet");
        return;
    }
    for entry in entries {
        let yours = match user {
            Some(u) if recipes::is_owner(&entry.recipe, u) => "  (yours)",
            _ => "",
        };
        println!(
            "{:>4}  {}  [{}]  {}{}",
            entry.recipe.id, entry.recipe.title, entry.recipe.category, entry.score, yours
        );
    }
}

fn require_login(state: &AppState) -> anyhow::Result<StoredUser> {
    state
        .sessions
        .load()
        .context("not logged in; run `smartrecipes login <email> <password>` first")
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing <{name}> argument"))
}

fn parse_id(args: &[String], index: usize, name: &str) -> anyhow::Result<i64> {
    arg(args, index, name)?
        .parse()
        .with_context(|| format!("<{name}> must be a number"))
}

fn draft_from_args(args: &[String], offset: usize) -> anyhow::Result<RecipeDraft> {
    Ok(RecipeDraft {
        title: arg(args, offset, "title")?.to_string(),
        description: arg(args, offset + 1, "description")?.to_string(),
        ingredients: arg(args, offset + 2, "ingredients")?.to_string(),
        steps: arg(args, offset + 3, "steps")?.to_string(),
        category: arg(args, offset + 4, "category")?.to_string(),
        image_url: args.get(offset + 5).cloned(),
    })
}

fn confirm_delete(title: &str) -> anyhow::Result<DeleteConfirmation> {
    print!("delete \"{title}\"? this cannot be undone [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(if line.trim().eq_ignore_ascii_case("y") {
        DeleteConfirmation::Confirmed
    } else {
        DeleteConfirmation::Declined
    })
}
