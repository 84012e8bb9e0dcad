use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use serde_json::{json, Value};
use tokio::sync::Notify;

use jukebox_prompt::config::AppConfig;
use jukebox_prompt::helpers::http_client::new_http_client;
use jukebox_prompt::host::LocalHost;
use jukebox_prompt::injection::INJECT_ID;
use jukebox_prompt::jukebox::{JukeBoxClient, JukeBoxEndpoints};
use jukebox_prompt::logging::initialize_logging;
use jukebox_prompt::settings::{SettingInput, SettingsForm};
use jukebox_prompt::JukeBoxExtension;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Injects the track playing on Roon into a chat prompt", long_about = None)]
struct Args {
    /// Configuration file (defaults to /etc/jukebox.json if present)
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[clap(long, short = 'd', help = "Enable debug logging")]
    debug: bool,

    /// Enable verbose output
    #[clap(long, short = 'v', help = "Enable verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Poll the JukeBox plugin and keep the injected prompt current until Ctrl+C
    Run,
    /// Run one refresh cycle and print the injected text
    Refresh,
    /// Show the track currently playing on Roon
    NowPlaying,
    /// Invoke a function tool the way the model would
    ///
    /// Example: jukebox tool RoonSearchLyrics --song "Nightswim" --artist "ODESZA"
    Tool {
        /// Tool name, e.g. RoonGetCurrentTrack
        name: String,

        /// Song title (RoonSearchLyrics)
        #[clap(long, short = 's')]
        song: Option<String>,

        /// Artist name (RoonSearchLyrics)
        #[clap(long, short = 'a')]
        artist: Option<String>,
    },
    /// Show or change the extension settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the current settings
    Show {
        /// Render the settings form as HTML instead of JSON
        #[clap(long)]
        html: bool,
    },
    /// Change one setting, e.g. `settings set pollInterval 2000`
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = initialize_logging(config.logging.clone(), args.debug, args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(args.command, config).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(command: Commands, config: AppConfig) -> Result<(), String> {
    let jukebox = &config.jukebox;

    let endpoints = JukeBoxEndpoints::new(&jukebox.base_url)
        .map_err(|e| format!("Invalid JukeBox URL {}: {}", jukebox.base_url, e))?;
    let client = JukeBoxClient::new(new_http_client(jukebox.timeout_secs), endpoints);

    let host = Arc::new(
        LocalHost::new(&jukebox.settings_file, Duration::from_millis(jukebox.save_debounce_ms))
            .with_macro("user", &jukebox.user_name)
            .with_macro("char", &jukebox.char_name),
    );

    let extension = JukeBoxExtension::new(host.clone(), client).map_err(|e| e.to_string())?;

    match command {
        Commands::Run => run_polling(&extension).await?,
        Commands::Refresh => {
            let state = extension.update_current_track().await;
            info!("Refresh finished in state {}", state);
            match host.extension_prompt(INJECT_ID).filter(|p| !p.is_cleared()) {
                Some(payload) => println!("{}", payload.text),
                None => println!("nothing injected"),
            }
        }
        Commands::NowPlaying => match extension.client().fetch_current_track().await {
            Some(track) => {
                println!("{}", track);
                if let Some(label) = track.position_label() {
                    println!("{}", label);
                }
                if let Some(updated) = track.last_updated_at() {
                    println!("Updated {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
                }
            }
            None => println!("Nothing is playing"),
        },
        Commands::Tool { name, song, artist } => {
            extension.sync_tools();
            let mut call_args = json!({});
            if let Some(song) = song {
                call_args["song"] = Value::String(song);
            }
            if let Some(artist) = artist {
                call_args["artist"] = Value::String(artist);
            }
            let result = host
                .call_function_tool(&name, call_args)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}", result);
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show { html } => {
                let settings = extension.settings();
                if html {
                    println!("{}", SettingsForm::render_html(&settings));
                } else {
                    let json = serde_json::to_string_pretty(&settings).map_err(|e| e.to_string())?;
                    println!("{}", json);
                }
            }
            SettingsAction::Set { key, value } => {
                let input = SettingInput::from_key_value(&key, &value).map_err(|e| e.to_string())?;
                let effect = extension.store_setting(input).map_err(|e| e.to_string())?;
                info!("Saved {} = {} ({:?})", key, value, effect);
            }
        },
    }

    host.flush_settings().map_err(|e| e.to_string())
}

async fn run_polling(extension: &JukeBoxExtension) -> Result<(), String> {
    let shutdown = Arc::new(Notify::new());
    let notify = shutdown.clone();
    ctrlc::set_handler(move || {
        println!("\nReceived Ctrl+C, shutting down...");
        notify.notify_one();
    })
    .map_err(|e| format!("Error setting Ctrl+C handler: {}", e))?;

    if !extension.init().await {
        warn!("Polling not started; check that the JukeBox plugin is running and injection is enabled");
        println!("Polling not started, press Ctrl+C to exit");
    } else {
        println!("Polling JukeBox every {}ms. Press Ctrl+C to exit.", extension.settings().poll_interval);
    }

    shutdown.notified().await;
    extension.shutdown();
    info!("Exiting application");
    Ok(())
}
