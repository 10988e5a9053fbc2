use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use roomgate::components::access_guard::{AccessGuard, GuardView};
use roomgate::config::{ClientConfig, ConfigError};
use roomgate::net::api::{ApiClient, ApiError};
use roomgate::net::rooms;
use roomgate::net::types::{IdentityId, NewRoom, RoomId, RoomUpdate};
use roomgate::pages::dashboard::{Dashboard, DashboardState, RealtimeStatus};
use roomgate::pages::login::{self, LoginError, LoginForm, LoginPage};
use roomgate::state::rooms::RoomsState;
use roomgate::state::session::SessionStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("request failed: {0}")]
    Api(#[from] ApiError),
    #[error("login failed: {}", .0.message())]
    Login(#[from] LoginError),
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),
    #[error("nothing to update; pass --name or --description")]
    EmptyUpdate,
    #[error("session ended before the dashboard mounted")]
    NotMounted,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("signal handling failed: {0}")]
    Signal(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "roomgate", about = "Session-gated rooms client")]
struct Cli {
    /// REST API base address; overrides ROOMGATE_API_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Realtime channel address; overrides ROOMGATE_WS_URL.
    #[arg(long, global = true)]
    ws_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in by name and print the returned identity.
    Login {
        #[arg(long)]
        name: String,
    },
    Rooms(RoomsCommand),
    /// Log in, mount the dashboard, and follow it until Ctrl-C.
    Watch {
        #[arg(long)]
        name: String,
    },
}

#[derive(Args, Debug)]
struct RoomsCommand {
    #[command(subcommand)]
    command: RoomsSubcommand,
}

#[derive(Subcommand, Debug)]
enum RoomsSubcommand {
    List,
    Get {
        room_id: RoomId,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Update {
        room_id: RoomId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        room_id: RoomId,
    },
    Join {
        room_id: RoomId,
        #[arg(long)]
        user: String,
    },
}

/// What the guard shows in the terminal.
enum Screen {
    Login,
    Dashboard(Dashboard),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config = ClientConfig { realtime_url: config.realtime_url, ..ClientConfig::new(base_url) };
    }
    if let Some(ws_url) = cli.ws_url {
        config = config.with_realtime_url(ws_url);
    }
    let api = ApiClient::new(&config)?;

    match cli.command {
        Command::Login { name } => run_login(&api, name).await,
        Command::Rooms(rooms) => run_rooms(&api, rooms).await,
        Command::Watch { name } => run_watch(api, &config, name).await,
    }
}

async fn run_login(api: &ApiClient, name: String) -> Result<(), CliError> {
    let session = SessionStore::new();
    let identity = login::submit(&LoginForm::new(name), api, &session).await?;
    print_json(&identity)
}

async fn run_rooms(api: &ApiClient, command: RoomsCommand) -> Result<(), CliError> {
    match command.command {
        RoomsSubcommand::List => print_json(&rooms::list(api).await?),
        RoomsSubcommand::Get { room_id } => print_json(&rooms::get(api, room_id).await?),
        RoomsSubcommand::Create { name, description } => {
            let room = NewRoom::new(name).description(description);
            print_json(&rooms::create(api, &room).await?)
        }
        RoomsSubcommand::Update { room_id, name, description } => {
            let mut update = RoomUpdate::default();
            if let Some(name) = name {
                update = update.name(name);
            }
            if let Some(description) = description {
                update = update.description(description);
            }
            if update.is_empty() {
                return Err(CliError::EmptyUpdate);
            }
            print_json(&rooms::update(api, room_id, &update).await?)
        }
        RoomsSubcommand::Delete { room_id } => {
            rooms::delete(api, room_id).await?;
            println!("deleted room {room_id}");
            Ok(())
        }
        RoomsSubcommand::Join { room_id, user } => {
            let user_id = IdentityId::new(user.trim()).ok_or(CliError::InvalidUserId(user))?;
            print_json(&rooms::join(api, room_id, &user_id).await?)
        }
    }
}

async fn run_watch(api: ApiClient, config: &ClientConfig, name: String) -> Result<(), CliError> {
    let realtime_url = match config.realtime_url() {
        Ok(url) => Some(url),
        Err(err) => {
            tracing::warn!(error = %err, "realtime feed disabled");
            None
        }
    };

    let session = SessionStore::new();
    let guard = {
        let api = api.clone();
        let dashboard_session = session.clone();
        AccessGuard::mount(
            &session,
            || Screen::Login,
            move || Screen::Dashboard(Dashboard::mount(api.clone(), dashboard_session.clone(), realtime_url.clone())),
        )
    };

    let mut page = LoginPage::new(name);
    let identity = page.submit(&api, &session).await?;
    println!("logged in as {}", identity.display_name());

    let mut updates = guard
        .with_view(|view| match view {
            GuardView::Children(Screen::Dashboard(dashboard)) => Some(dashboard.watch()),
            GuardView::Children(Screen::Login) | GuardView::Login(_) => None,
        })
        .flatten()
        .ok_or(CliError::NotMounted)?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut printer = Printer::default();
    printer.show(&updates.borrow_and_update())?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                // The guard dropped the dashboard: the session was invalidated.
                if changed.is_err() {
                    println!("session ended");
                    break;
                }
                let state = updates.borrow_and_update().clone();
                printer.show(&state)?;
            }
            signal = &mut shutdown => {
                signal?;
                break;
            }
        }
    }

    session.clear();
    drop(guard);
    Ok(())
}

/// Prints only what changed since the previous dashboard state.
#[derive(Default)]
struct Printer {
    rooms: Option<RoomsState>,
    realtime: Option<RealtimeStatus>,
    messages: usize,
}

impl Printer {
    fn show(&mut self, state: &DashboardState) -> Result<(), CliError> {
        if !state.rooms.loading && self.rooms.as_ref() != Some(&state.rooms) {
            match &state.rooms.error {
                Some(error) => eprintln!("rooms unavailable: {error}"),
                None => print_json(&state.rooms.items)?,
            }
            self.rooms = Some(state.rooms.clone());
        }
        if self.realtime.as_ref() != Some(&state.realtime) {
            match &state.realtime {
                RealtimeStatus::Failed(reason) => eprintln!("realtime failed: {reason}"),
                status => println!("realtime: {status:?}"),
            }
            self.realtime = Some(state.realtime.clone());
        }
        for message in state.messages.iter().skip(self.messages) {
            println!("> {message}");
        }
        self.messages = state.messages.len();
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
