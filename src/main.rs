use meal_planner::meals::dates::{date_key, parse_calendar_date};
use meal_planner::meals::dto::MealType;
use meal_planner::meals::WeekView;
use meal_planner::{AppState, Planner, PlannerError};
use time::{Date, OffsetDateTime};

const USAGE: &str = "usage: meal-planner <recipes | week [YYYY-MM-DD] | generate [YYYY-MM-DD] | shopping | toggle <item-id> | watch>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "meal_planner=debug,reqwest=info".to_string());
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

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        anyhow::bail!(USAGE);
    };

    let state = AppState::init()?;
    tracing::info!(api_url = %state.config.api_url, %command, "starting");
    let mut planner = state.planner();
    if let Err(e) = planner.load().await {
        tracing::warn!(error = %e, "initial load incomplete; continuing with partial cache");
    }

    match command {
        "recipes" => {
            for recipe in planner.stores().recipes.list().await {
                println!(
                    "{}  {} ({} min, serves {})",
                    recipe.id,
                    recipe.name,
                    recipe.total_time(),
                    recipe.servings
                );
            }
        }
        "week" => {
            let start = start_date(args.get(1))?;
            print_week(&planner.week(start).await);
        }
        "generate" => {
            let start = start_date(args.get(1))?;
            match planner.generate_week(start).await {
                Ok(week) => {
                    println!("{}", week.message);
                    print_week(&planner.week(start).await);
                }
                Err(PlannerError::NoRecipes) => println!("{}", PlannerError::NoRecipes),
                Err(e) => return Err(e.into()),
            }
        }
        "shopping" => print_shopping(&planner).await,
        "toggle" => {
            let Some(item_id) = args.get(1) else {
                anyhow::bail!(USAGE);
            };
            planner.toggle_item(item_id).await?;
            print_shopping(&planner).await;
        }
        "watch" => {
            let refresh = state.spawn_refresh(&planner);
            tokio::signal::ctrl_c().await?;
            tracing::info!("stopping");
            refresh.shutdown().await;
        }
        _ => anyhow::bail!(USAGE),
    }

    Ok(())
}

fn start_date(arg: Option<&String>) -> anyhow::Result<Date> {
    match arg {
        Some(raw) => parse_calendar_date(raw).map_err(anyhow::Error::msg),
        None => Ok(OffsetDateTime::now_utc().date()),
    }
}

fn print_week(week: &WeekView) {
    for day in &week.days {
        println!("{} {}", day.key(), day.weekday);
        for slot in MealType::SLOTS {
            let meal = day
                .slots
                .slot(slot)
                .map(|p| {
                    p.recipe
                        .as_ref()
                        .map(|r| r.name.clone())
                        .unwrap_or_else(|| format!("<recipe {}>", p.recipe_id))
                })
                .unwrap_or_else(|| "-".to_string());
            println!("  {:<9} {}", slot.as_str(), meal);
        }
    }
    if week.days.is_empty() {
        println!("no days from {}", date_key(week.start));
    }
}

async fn print_shopping(planner: &Planner) {
    for item in planner.stores().shopping.list().await {
        println!(
            "[{}] {}  {} {} {}",
            if item.is_purchased { "x" } else { " " },
            item.id,
            item.quantity,
            item.unit,
            item.name
        );
    }
}
