// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

mod render;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::warn;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::fs;
use std::path::PathBuf;
use tripmate_answer::{AgeBand, AnswerMarkers, TravelStyle, UserQuery};
use tripmate_core::config::AppConfig;
use tripmate_core::index::{IndexRetriever, TextSplitter, VectorIndex};
use tripmate_core::llm::{OpenAiClient, API_KEY_ENV};
use tripmate_core::pipeline::{review_with, Recommender};
use tripmate_core::places::PlaceCatalog;
use tripmate_core::session::{ConversationRecord, SessionStore};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Place CSV file; repeat to use several. Overrides the configured list.
    #[arg(long = "data-file", global = true)]
    data_files: Vec<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask for recommendations and a day-by-day plan
    Recommend(RecommendArgs),
    /// Format a saved raw answer without calling the model
    Format {
        answer_file: PathBuf,
        #[arg(long, default_value_t = 37.5665, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, default_value_t = 126.9780, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Manage the embedding index
    Index {
        #[command(subcommand)]
        command: IndexCommands,
    },
    /// Browse or clear past conversations
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand)]
enum IndexCommands {
    /// Rebuild the index from the data files
    Build {
        #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
        api_key: String,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List conversations, newest first
    List,
    /// Show conversation <n> as numbered by `list`
    Show { number: usize },
    /// Delete all stored conversations
    Clear,
}

#[derive(clap::Args)]
struct RecommendArgs {
    /// What you want to do or see
    question: String,

    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: String,

    #[arg(long, value_enum, default_value_t = AgeArg::Twenties)]
    age: AgeArg,

    /// Travel style; repeat for several
    #[arg(long = "style", value_enum)]
    styles: Vec<StyleArg>,

    #[arg(long, default_value_t = 37.5665, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, default_value_t = 126.9780, allow_hyphen_values = true)]
    lon: f64,

    /// Trip length in days
    #[arg(long, default_value_t = 3)]
    days: u32,

    /// Budget in won
    #[arg(long, default_value_t = 500_000)]
    budget: u64,

    /// Number of travellers
    #[arg(long, default_value_t = 2)]
    people: u32,

    /// Anything else to take into account
    #[arg(long, default_value = "")]
    requests: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum AgeArg {
    #[value(name = "10s", alias = "10대")]
    Teens,
    #[value(name = "20s", alias = "20대")]
    Twenties,
    #[value(name = "30s", alias = "30대")]
    Thirties,
    #[value(name = "40s", alias = "40대")]
    Forties,
    #[value(name = "50s+", alias = "50대 이상")]
    FiftiesPlus,
}

impl From<AgeArg> for AgeBand {
    fn from(arg: AgeArg) -> Self {
        match arg {
            AgeArg::Teens => AgeBand::Teens,
            AgeArg::Twenties => AgeBand::Twenties,
            AgeArg::Thirties => AgeBand::Thirties,
            AgeArg::Forties => AgeBand::Forties,
            AgeArg::FiftiesPlus => AgeBand::FiftiesPlus,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    #[value(alias = "자연")]
    Nature,
    #[value(alias = "역사")]
    History,
    #[value(alias = "체험")]
    Experience,
    #[value(alias = "휴식")]
    Relaxation,
    #[value(alias = "문화")]
    Culture,
    #[value(alias = "가족")]
    Family,
    #[value(alias = "액티비티")]
    Activity,
}

impl From<StyleArg> for TravelStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Nature => TravelStyle::Nature,
            StyleArg::History => TravelStyle::History,
            StyleArg::Experience => TravelStyle::Experience,
            StyleArg::Relaxation => TravelStyle::Relaxation,
            StyleArg::Culture => TravelStyle::Culture,
            StyleArg::Family => TravelStyle::Family,
            StyleArg::Activity => TravelStyle::Activity,
        }
    }
}

impl RecommendArgs {
    fn to_query(&self) -> UserQuery {
        let mut query = UserQuery {
            age_band: self.age.into(),
            latitude: self.lat,
            longitude: self.lon,
            duration_days: self.days,
            budget: self.budget,
            party_size: self.people,
            special_requests: self.requests.trim().to_string(),
            question: self.question.trim().to_string(),
            ..UserQuery::default()
        };
        for &style in &self.styles {
            query.pick_style(style.into());
        }
        query
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path)?;
    if !cli.data_files.is_empty() {
        config.data_files = cli.data_files.clone();
    }
    let store = SessionStore::new(SessionStore::default_path());
    let markers = AnswerMarkers::default();

    match &cli.command {
        Commands::Recommend(args) => {
            let query = args.to_query();
            query.validate()?;

            let places = PlaceCatalog::load(&config.data_files)?;
            let client = OpenAiClient::new(&config, &args.api_key)?;
            let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap);
            let index = VectorIndex::load_or_build(
                &config.index_path,
                &config.data_files,
                &splitter,
                &client,
            )?;
            let retriever = IndexRetriever::new(&index, &client);
            let recommender = Recommender::new(places, retriever, &client, config.top_k);

            let mut session = store.load()?;
            let answer = recommender.recommend(&mut session, query)?;
            store.save(&session)?;

            println!("🎉 추천 결과 및 상세 여행 계획\n");
            println!("{}", render::render_answer(&answer));
        }
        Commands::Format {
            answer_file,
            lat,
            lon,
        } => {
            let raw = fs::read_to_string(answer_file)
                .with_context(|| format!("Failed to read {}", answer_file.display()))?;
            let query = UserQuery {
                latitude: *lat,
                longitude: *lon,
                ..UserQuery::default()
            };
            let record = ConversationRecord::new(query, raw);
            let places = load_places_for_display(&config);
            println!("{}", render::render_answer(&review_with(&places, &record, &markers)));
        }
        Commands::Index {
            command: IndexCommands::Build { api_key },
        } => {
            let client = OpenAiClient::new(&config, api_key)?;
            let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap);
            let index =
                VectorIndex::rebuild(&config.index_path, &config.data_files, &splitter, &client)?;
            println!(
                "Indexed {} chunks into {}",
                index.chunks.len(),
                config.index_path.display()
            );
        }
        Commands::History { command } => {
            let mut session = store.load()?;
            match command {
                HistoryCommands::List => {
                    if session.is_empty() {
                        println!("이전 대화가 없습니다.");
                    }
                    for (index, preview) in session.previews() {
                        let record = &session.records()[index];
                        println!(
                            "[{}] {}\n    {}",
                            index + 1,
                            record.created_at.format("%Y-%m-%d %H:%M UTC"),
                            preview.replace('\n', "\n    ")
                        );
                    }
                }
                HistoryCommands::Show { number } => {
                    let index = number
                        .checked_sub(1)
                        .ok_or_else(|| anyhow!("Conversations are numbered from 1"))?;
                    let record = session.select(index)?.clone();
                    let places = load_places_for_display(&config);

                    println!("🗣️ 질문: {}", record.query.question);
                    if record.style_label != tripmate_answer::query::NO_STYLE_LABEL {
                        println!("🌟 선택된 여행 스타일: {}", record.style_label);
                    }
                    println!(
                        "\n💡 답변:\n{}",
                        render::render_answer(&review_with(&places, &record, &markers))
                    );
                }
                HistoryCommands::Clear => {
                    session.clear();
                    store.save(&session)?;
                    println!("대화 기록을 삭제했습니다.");
                }
            }
        }
    }

    Ok(())
}

/// Offline commands still render when no place file is readable; every
/// distance then shows as unavailable.
fn load_places_for_display(config: &AppConfig) -> PlaceCatalog {
    PlaceCatalog::load(&config.data_files).unwrap_or_else(|e| {
        warn!("Distances unavailable — {}", e);
        PlaceCatalog::default()
    })
}
