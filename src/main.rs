use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use todo_client::config::Config;
use todo_client::{Filter, HttpStore, Notice, RemoteStore, TodoId, TodoList, User, UserId};

/// Get the config directory path (~/.config/todo-client/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("todo-client"))
}

#[derive(Parser, Debug)]
#[command(name = "todo-client", about = "Manage your todo list on a remote todo API")]
struct Args {
    /// Config file (defaults to ~/.config/todo-client/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Act as this user (overrides user_id from the config file)
    #[arg(long, value_name = "ID")]
    user_id: Option<i64>,

    /// Which todos to print: all, active or completed
    #[arg(long, value_name = "MODE")]
    filter: Option<Filter>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the list (default)
    List,
    /// Add a todo
    Add { title: String },
    /// Flip a todo between active and completed
    Toggle { id: i64 },
    /// Retitle a todo (an empty title deletes it)
    Rename { id: i64, title: String },
    /// Delete a todo
    Delete { id: i64 },
    /// Complete everything, or un-complete everything if all are done
    ToggleAll,
    /// Delete every completed todo
    ClearCompleted,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the list on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let user = args
        .user_id
        .or(config.user_id)
        .map(|id| User { id: UserId(id) });
    let user_id = UserId::resolve(user.as_ref());
    if user_id == UserId::ANONYMOUS {
        tracing::warn!("No user configured, using anonymous user id 0");
    }

    let token = config.resolve_token(std::env::var("TODO_API_TOKEN").ok());
    let store = HttpStore::new(&config.api_base_url, config.request_timeout(), token)
        .context("Failed to create API client")?;

    let mut list = TodoList::new(store, user_id, Notice::new(config.notice_ttl()));
    list.set_filter(args.filter.unwrap_or(config.default_filter));

    let last_notice = if list.load().await.is_ok() {
        run_command(&mut list, args.command.unwrap_or(Command::List));
        let mut last = list.notice().text().map(str::to_string);

        // Remember every failure even if its notice expires before we finish
        while list.next_event().await {
            if let Some(text) = list.notice().text() {
                last = Some(text.to_string());
            }
        }
        last
    } else {
        list.notice().text().map(str::to_string)
    };

    print_list(&list);

    if let Some(text) = last_notice {
        eprintln!("Error: {text}");
        std::process::exit(1);
    }
    Ok(())
}

fn run_command<S: RemoteStore>(list: &mut TodoList<S>, command: Command) {
    let result = match command {
        Command::List => Ok(()),
        Command::Add { title } => list.add(&title),
        Command::Toggle { id } => list.toggle(TodoId(id)),
        Command::Rename { id, title } => list.rename(TodoId(id), &title).map(|outcome| {
            tracing::debug!(?outcome, "Rename issued");
        }),
        Command::Delete { id } => {
            list.delete(TodoId(id));
            Ok(())
        }
        Command::ToggleAll => {
            let issued = list.toggle_all();
            tracing::debug!(issued, "Toggle all");
            Ok(())
        }
        Command::ClearCompleted => {
            let issued = list.clear_completed();
            tracing::debug!(issued, "Clear completed");
            Ok(())
        }
    };

    // The notice already carries the user-facing message
    if let Err(e) = result {
        tracing::debug!(error = %e, "Command rejected");
    }
}

fn print_list<S: RemoteStore>(list: &TodoList<S>) {
    for row in list.rows() {
        let mark = if row.completed { "x" } else { " " };
        match row.id {
            Some(id) => println!("[{mark}] {:>5}  {}", id.0, row.title),
            None => println!("[{mark}]   ...  {}", row.title),
        }
    }

    let summary = list.summary();
    let noun = if summary.active == 1 { "item" } else { "items" };
    println!(
        "{} {noun} left ({} shown, filter: {})",
        summary.active,
        summary.visible,
        list.filter()
    );
}
