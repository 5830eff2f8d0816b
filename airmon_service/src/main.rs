//! Interactive station dashboard (`airmon`).
//!
//! Usage: `airmon [config.toml]` (defaults to `./airmon.toml`; a missing file
//! means built-in defaults). The assistant's API key is read from the
//! environment or `.env`, from the configured secret file, or entered with
//! the `key` command.

use airmon_service::analysis::context::format_reading;
use airmon_service::assistant::prompts::suggested_question;
use airmon_service::assistant::{AssistantClient, Credential, CredentialChain, CredentialProvider};
use airmon_service::config::{Config, DEFAULT_CONFIG_PATH};
use airmon_service::dashboard::render;
use airmon_service::dashboard::{parse_command, Command, CommandError, Question, Session};
use airmon_service::logging::{self, Source};
use airmon_service::stations::StationDirectory;
use chrono::FixedOffset;
use std::error::Error;
use std::io::{self, BufRead, Write};

struct App {
    config: Config,
    offset: FixedOffset,
    directory: StationDirectory,
    assistant: AssistantClient,
    credentials: CredentialChain,
    session: Session,
}

enum Flow {
    Continue,
    Quit,
}

impl App {
    fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Help => println!("{}", render::render_help()),
            Command::Stations => println!(
                "{}",
                render::render_directory(&self.directory, &self.session.station_code)
            ),
            Command::Select(code) => self.select(&code),
            Command::Fetch(code) => self.fetch(code.as_deref()),
            Command::Tls(verify) => {
                self.session.verify_tls = verify;
                println!("{}", render::render_tls_status(verify));
            }
            Command::Protocol(protocol) => {
                self.session.protocol = protocol;
                println!(
                    "🌐 Station API: {}",
                    self.config.station_api.base_url(protocol)
                );
            }
            Command::Show => match &self.session.snapshot {
                Some(snapshot) => {
                    let record = self.directory.find_by_code(&snapshot.station_code);
                    println!("{}", render::render_snapshot(snapshot, record));
                }
                None => println!("👈 Fetch a station to begin (`fetch 204`)"),
            },
            Command::Json => match &self.session.snapshot {
                Some(snapshot) => println!("{}", render::render_raw_json(&snapshot.document)),
                None => println!("👈 Nothing fetched yet"),
            },
            Command::Suggest => println!("{}", render::render_suggestions()),
            Command::Ask(question) => self.ask(question),
            Command::Key(key) => self.set_key(&key),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn select(&mut self, code: &str) {
        let code = code.trim();
        match self.directory.find_by_code(code) {
            Some(record) => {
                self.session.station_code = record.code.to_string();
                println!(
                    "🏢 Selected {} ({}, {})",
                    record.code, record.municipality, record.region
                );
            }
            None => {
                self.session.station_code = code.to_string();
                println!("⚠️  {} is not in the station directory; it will be sent as typed", code);
            }
        }
    }

    fn fetch(&mut self, code: Option<&str>) {
        let Some(request) = self.session.fetch_request(code) else {
            println!("⚠️  Please enter a station ID (`fetch <code>`)");
            return;
        };

        println!("🔄 Fetching station {}...", request.station_code);
        let result = request.execute(&self.config.station_api, self.offset);
        self.session.apply(&result);

        match &result {
            Ok(snapshot) => {
                println!("✅ Data fetched for station {}", snapshot.station_code);
                let record = self.directory.find_by_code(&snapshot.station_code);
                println!("{}", render::render_snapshot(snapshot, record));
            }
            Err(e) => println!("{}", render::render_error(&e.to_string())),
        }
    }

    fn ask(&self, question: Question) {
        let Some(snapshot) = &self.session.snapshot else {
            println!("👈 Fetch a station before asking about it");
            return;
        };
        let Some(credential) = self.credentials.get() else {
            println!("⚠️  Assistant disabled: no API key. Use `key <api key>` or set it in .env");
            return;
        };
        let question = match question {
            Question::Text(text) => text,
            Question::Suggested(n) => match suggested_question(n) {
                Some(q) => q.to_string(),
                None => {
                    println!("⚠️  There is no suggested question #{} (see `suggest`)", n);
                    return;
                }
            },
        };

        println!("🤖 Asking the assistant...");
        let context = format_reading(&snapshot.reading);
        match self.assistant.ask_exchange(&question, &context, credential.expose()) {
            Ok(exchange) => println!("{}", render::render_answer(&exchange)),
            Err(e) => println!("{}", render::render_error(&e.to_string())),
        }
    }

    fn set_key(&mut self, key: &str) {
        if Credential::new(key).is_none() {
            println!("{}", render::render_error("API key is blank"));
            return;
        }
        self.credentials.set_session_key(key);
        println!("🔑 API key set for this session");
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;

    logging::init_logger(&config.logging)?;
    logging::debug(Source::Config, None, &format!("Loaded configuration from {}", config_path));

    let offset = config.display.offset()?;
    let directory = match &config.stations_file {
        Some(path) => StationDirectory::load(path)?,
        None => StationDirectory::builtin()?,
    };
    logging::debug(
        Source::System,
        None,
        &format!("Station directory has {} entries", directory.len()),
    );

    let assistant = AssistantClient::new(&config.assistant)?;
    let credentials = CredentialChain::from_config(&config.assistant);
    let session = Session::from_config(&config.station_api);

    let mut app = App {
        config,
        offset,
        directory,
        assistant,
        credentials,
        session,
    };

    println!("{}", render::render_banner());
    println!(
        "{}",
        render::render_settings(&app.session, app.credentials.active_source().as_deref())
    );
    println!("Type `help` for commands.\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("airmon> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match parse_command(&line) {
            Ok(command) => {
                if let Flow::Quit = app.handle(command) {
                    break;
                }
            }
            Err(CommandError::Empty) => {}
            Err(e) => println!("{}", render::render_error(&e.to_string())),
        }
        println!();
    }

    logging::info(Source::System, None, "Session closed");
    Ok(())
}
