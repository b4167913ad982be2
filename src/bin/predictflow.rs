use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand};

use predictflow::service::{execute, HttpModelService, ModelService};
use predictflow::session::{
    format_status, InputSession, NgramOrder, ServiceRequest, SessionConfig, SessionResponse,
    SuggestionAction, SuggestionBar,
};

#[derive(Parser)]
#[command(name = "predictflow", about = "Predictive-text model service client")]
struct Cli {
    /// Model service base URL (overrides the config file)
    #[arg(long, global = true)]
    url: Option<String>,
    /// Path to a settings TOML file
    #[arg(long, global = true)]
    config: Option<String>,
    /// Write a JSON trace to this directory (needs the `trace` feature)
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the model's order and pattern count
    Status {
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Ask for next-word suggestions for a text
    Predict {
        text: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Train the model on a text or a corpus file
    Train {
        /// Text to train on
        text: Option<String>,
        /// Read the corpus from this file instead
        #[arg(long, conflicts_with = "text")]
        file: Option<String>,
    },

    /// Erase everything the model has learned
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Change the n-gram order (1, 2 or 3)
    SetOrder { n: u8 },

    /// Type a text into a headless widget and show what it would display
    Simulate {
        text: String,
        /// Accept the suggestion at this index afterwards
        #[arg(long)]
        accept: Option<usize>,
        /// Submit completed sentences for training as they are typed
        #[arg(long)]
        auto_learn: bool,
    },

    /// Print the default settings TOML
    Config,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    process::exit(1);
}

fn load_settings(path: Option<&str>) {
    let Some(path) = path else { return };
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format_args!("Failed to read config {path}: {e}")));
    predictflow::settings::init_custom(content)
        .unwrap_or_else(|e| fail(format_args!("Invalid config {path}: {e}")));
}

fn open_service(url: Option<&str>) -> HttpModelService {
    let settings = &predictflow::settings::settings().service;
    match url {
        Some(url) => HttpModelService::new(url, settings.timeout()),
        None => HttpModelService::from_settings(settings),
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes")
}

// ---------------------------------------------------------------------------
// Headless widget
// ---------------------------------------------------------------------------

/// Drives an `InputSession` on a virtual clock, running every service call
/// synchronously as soon as it is requested.
struct Simulator<'a> {
    session: InputSession,
    service: &'a dyn ModelService,
    now: Instant,
    editor: String,
    bar: SuggestionBar,
    status: String,
}

impl<'a> Simulator<'a> {
    fn new(service: &'a dyn ModelService, config: SessionConfig) -> Self {
        let mut sim = Self {
            session: InputSession::with_config(config),
            service,
            now: Instant::now(),
            editor: String::new(),
            bar: SuggestionBar::Placeholder,
            status: String::new(),
        };
        let resp = sim.session.start();
        sim.apply(resp);
        sim
    }

    fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.editor.push(ch);
            let current = self.editor.clone();
            let resp = self.session.handle_text_change(&current, self.now);
            self.apply(resp);
        }
        // Let the debounce window elapse.
        if let Some(deadline) = self.session.next_deadline() {
            self.now = self.now.max(deadline);
            let resp = self.session.tick(self.now);
            self.apply(resp);
        }
    }

    fn accept(&mut self, index: usize) -> bool {
        let resp = self.session.accept_suggestion(index);
        let consumed = resp.consumed;
        self.apply(resp);
        consumed
    }

    fn apply(&mut self, mut resp: SessionResponse) {
        let requests: Vec<ServiceRequest> = std::mem::take(&mut resp.requests);
        if let Some(text) = resp.text {
            self.editor = text;
        }
        if let SuggestionAction::Render(bar) = resp.suggestions {
            self.bar = bar;
        }
        if let Some(line) = resp.status {
            self.status = line.text;
        }
        for request in requests {
            let outcome = execute(self.service, request);
            if let Some(next) = self.session.receive(outcome, self.now) {
                self.apply(next);
            }
        }
    }

    fn print(&self) {
        println!("text:        {:?}", self.editor);
        println!("words:       {}", predictflow::session::word_count_label(&self.editor));
        println!("suggestions: {}", self.bar.to_line());
        if !self.bar.is_placeholder() {
            println!("             {}", self.bar.index_line());
        }
        println!("status:      {}", self.status);
    }
}

fn main() {
    let cli = Cli::parse();
    load_settings(cli.config.as_deref());
    if let Some(dir) = &cli.log_dir {
        predictflow::trace_init::init_tracing(Path::new(dir));
    }

    match cli.command {
        Command::Config => {
            print!("{}", predictflow::settings::default_toml());
        }

        Command::Status { json } => {
            let service = open_service(cli.url.as_deref());
            let status = service.status().unwrap_or_else(|e| fail(e));
            if json {
                let out = serde_json::to_string_pretty(&status).unwrap_or_else(|e| fail(e));
                println!("{out}");
            } else {
                println!("{}", format_status(&status));
                if let Some(vocab) = status.vocab_size {
                    println!("Vocabulary: {vocab} words");
                }
            }
        }

        Command::Predict { text, json } => {
            let service = open_service(cli.url.as_deref());
            let words = service.predict(&text).unwrap_or_else(|e| fail(e));
            if json {
                let out = serde_json::to_string(&words).unwrap_or_else(|e| fail(e));
                println!("{out}");
            } else if words.is_empty() {
                println!("(no suggestions)");
            } else {
                for (i, word) in words.iter().enumerate() {
                    println!("{i}: {word}");
                }
            }
        }

        Command::Train { text, file } => {
            let corpus = match (text, file) {
                (Some(text), None) => text,
                (None, Some(path)) => fs::read_to_string(&path)
                    .unwrap_or_else(|e| fail(format_args!("Failed to read {path}: {e}"))),
                _ => fail("Give either a text or --file"),
            };
            if corpus.trim().is_empty() {
                fail("Nothing to train on");
            }
            let service = open_service(cli.url.as_deref());
            service.train(&corpus).unwrap_or_else(|e| fail(e));
            println!("Model trained successfully!");
        }

        Command::Clear { yes } => {
            if !yes && !confirm("Clear the model? Everything it learned is lost.") {
                println!("Aborted.");
                return;
            }
            let service = open_service(cli.url.as_deref());
            service.clear().unwrap_or_else(|e| fail(e));
            println!("Dictionary cleared.");
        }

        Command::SetOrder { n } => {
            let order = NgramOrder::try_from(n).unwrap_or_else(|e| fail(e));
            let service = open_service(cli.url.as_deref());
            service.set_order(order).unwrap_or_else(|e| fail(e));
            match service.status() {
                Ok(status) => println!("{}", format_status(&status)),
                Err(_) => println!("Order set to {order}"),
            }
        }

        Command::Simulate {
            text,
            accept,
            auto_learn,
        } => {
            let service = open_service(cli.url.as_deref());
            let mut config = SessionConfig::from_settings(predictflow::settings::settings());
            config.auto_learn |= auto_learn;
            let mut sim = Simulator::new(&service, config);
            sim.type_text(&text);
            sim.print();
            if let Some(index) = accept {
                if !sim.accept(index) {
                    fail(format_args!("No suggestion at index {index}"));
                }
                println!();
                sim.print();
            }
        }
    }
}
