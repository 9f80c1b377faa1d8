use std::{
    io::{
        self,
        BufRead,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
    process::ExitCode,
};

use clap::{
    Args,
    Parser,
    Subcommand,
    ValueEnum,
};
use waniwords::{
    config::{
        ConfigStore,
        CredentialProvider,
    },
    corpus::{
        ColumnMap,
        CorpusBuilder,
        CorpusConfig,
        CorpusSource,
        FrequencyListReader,
    },
    filters::{
        FilterKind,
        FilterStep,
    },
    generate_study_list,
    jpdb::{
        JpdbClient,
        SyncOptions,
        DEFAULT_DECK_NAME,
    },
    logging::init_tracing,
    persistence::{
        get_app_data_dir,
        CONFIG_FILE,
        FREQUENCY_LIST_FILE,
        KNOWLEDGE_CACHE_FILE,
    },
    wanikani::{
        state::{
            DEFAULT_KANJI_STAGE,
            DEFAULT_VOCABULARY_STAGE,
            MAX_SRS_STAGE,
        },
        KnowledgeConfig,
        KnowledgeStore,
        RefreshMode,
        WaniKaniClient,
    },
    ErrorKind,
    Service,
    StudyListOutcome,
    StudyListRequest,
    WaniWordsError,
};

#[derive(Parser)]
#[command(name = "waniwords", version, about = "Frequent words you can read but haven't studied, synced to jpdb")]
struct Cli {
    /// Where config, cache and the frequency list live
    #[arg(long, global = true, env = "WANIWORDS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the frequency list from raw corpus files
    BuildCorpus(BuildCorpusArgs),
    /// Generate the study list and sync it to a jpdb deck
    Study(StudyArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceFormat {
    /// BCCWJ short-unit-word TSV
    Bccwj,
    Tsv,
    Csv,
}

#[derive(Args)]
struct BuildCorpusArgs {
    /// Primary corpus file, most frequent entries first
    #[arg(long)]
    source: PathBuf,

    #[arg(long, value_enum, default_value = "bccwj")]
    format: SourceFormat,

    /// Column indices as lemma,reading,pos (ignored for bccwj)
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<usize>>,

    /// Second corpus whose blacklisted entries are removed from the primary one
    #[arg(long)]
    refine: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "csv")]
    refine_format: SourceFormat,

    #[arg(long, value_delimiter = ',')]
    refine_columns: Option<Vec<usize>>,

    /// Stop reading each source after this many lines
    #[arg(long)]
    max_lines: Option<usize>,

    /// Extra part-of-speech tags to exclude
    #[arg(long = "exclude-pos", value_delimiter = ',')]
    exclude_pos: Vec<String>,

    /// Output path (defaults to the data directory)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FilterArg {
    KnownVocabulary,
    UnknownKanji,
    KanaOnly,
}

impl From<FilterArg> for FilterKind {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::KnownVocabulary => FilterKind::KnownVocabulary,
            FilterArg::UnknownKanji => FilterKind::UnknownKanji,
            FilterArg::KanaOnly => FilterKind::KanaOnly,
        }
    }
}

#[derive(Args)]
struct StudyArgs {
    /// Number of most frequent words to start from
    #[arg(short = 'n', long, default_value_t = 1000)]
    words: usize,

    /// Filters to apply, in order
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "known-vocabulary,unknown-kanji,kana-only"
    )]
    filters: Vec<FilterArg>,

    /// Filters whose result should be inverted
    #[arg(long, value_enum, value_delimiter = ',')]
    invert: Vec<FilterArg>,

    #[arg(long, default_value = DEFAULT_DECK_NAME)]
    deck: String,

    /// Print the list without touching jpdb
    #[arg(long)]
    dry_run: bool,

    /// Use the cached WaniKani data without refreshing it
    #[arg(long)]
    offline: bool,

    /// Discard the WaniKani cache and download everything again
    #[arg(long)]
    full_resync: bool,

    /// Delete deck vocabulary that is no longer on the list
    #[arg(long)]
    remove_obsolete: bool,

    /// SRS stage from which a kanji counts as known
    #[arg(long, default_value_t = DEFAULT_KANJI_STAGE, value_parser = srs_stage_parser())]
    kanji_stage: u8,

    /// SRS stage from which a vocabulary word counts as known
    #[arg(long, default_value_t = DEFAULT_VOCABULARY_STAGE, value_parser = srs_stage_parser())]
    vocabulary_stage: u8,
}

fn srs_stage_parser() -> clap::builder::RangedI64ValueParser<u8> {
    clap::value_parser!(u8).range(1..=MAX_SRS_STAGE as i64)
}

/// Asks for API keys on the terminal.
struct TerminalPrompt;

impl CredentialProvider for TerminalPrompt {
    fn request_key(&mut self, service: Service) -> Result<String, WaniWordsError> {
        print!("Enter {} API key: ", service.config_key());
        io::stdout().flush()?;
        let mut key = String::new();
        io::stdin().lock().read_line(&mut key)?;
        Ok(key.trim().to_string())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let data_dir = cli.data_dir.clone().unwrap_or_else(get_app_data_dir);
    let result = match cli.command {
        Command::BuildCorpus(args) => build_corpus(args, &data_dir),
        Command::Study(args) => study(args, &data_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let hint = match e.kind() {
                ErrorKind::Authentication => " The key was removed; you will be asked for a new one.",
                ErrorKind::Network => " Check your internet connection and try again.",
                _ => "",
            };
            eprintln!("Error! {}.{}", e, hint);
            ExitCode::FAILURE
        }
    }
}

fn corpus_source(
    path: PathBuf,
    format: SourceFormat,
    columns: Option<Vec<usize>>,
) -> Result<CorpusSource, WaniWordsError> {
    let columns = match columns.as_deref() {
        Some(&[lemma, reading, part_of_speech]) => Some(ColumnMap { lemma, reading, part_of_speech }),
        Some(_) => {
            return Err(WaniWordsError::Config("--columns takes lemma,reading,pos".to_string()))
        }
        None => None,
    };
    let default_columns = ColumnMap { lemma: 0, reading: 1, part_of_speech: 2 };

    Ok(match format {
        SourceFormat::Bccwj => CorpusSource::bccwj_suw(path),
        SourceFormat::Tsv => CorpusSource::new(path, '\t', columns.unwrap_or(default_columns)),
        SourceFormat::Csv => CorpusSource::new(path, ',', columns.unwrap_or(default_columns)),
    })
}

fn build_corpus(args: BuildCorpusArgs, data_dir: &Path) -> Result<(), WaniWordsError> {
    let primary = corpus_source(args.source, args.format, args.columns)?;
    let refinement = args
        .refine
        .map(|path| corpus_source(path, args.refine_format, args.refine_columns))
        .transpose()?;

    let mut config = CorpusConfig { max_lines: args.max_lines, ..CorpusConfig::default() };
    config.blacklisted_pos.extend(args.exclude_pos);

    println!("Generating frequency list from {}...", primary.path.display());
    let list = CorpusBuilder::new(config).build(&primary, refinement.as_ref())?;

    let output = args.output.unwrap_or_else(|| data_dir.join(FREQUENCY_LIST_FILE));
    list.save(&output)?;
    println!("Wrote {} words to {}", list.len(), output.display());
    Ok(())
}

fn study(args: StudyArgs, data_dir: &Path) -> Result<(), WaniWordsError> {
    let mut config = ConfigStore::load(data_dir.join(CONFIG_FILE));
    let mut prompt = TerminalPrompt;

    let progress = if args.offline {
        None
    } else {
        Some(WaniKaniClient::new(config.require_key(Service::WaniKani, &mut prompt)?)?)
    };
    let deck = if args.dry_run {
        None
    } else {
        Some(JpdbClient::new(config.require_key(Service::Jpdb, &mut prompt)?)?)
    };

    let frequency_list = FrequencyListReader::open(&data_dir.join(FREQUENCY_LIST_FILE))?;
    let mut knowledge = KnowledgeStore::load(
        data_dir.join(KNOWLEDGE_CACHE_FILE),
        KnowledgeConfig {
            kanji_min_stage: args.kanji_stage,
            vocabulary_min_stage: args.vocabulary_stage,
            ..KnowledgeConfig::default()
        },
    );

    let request = StudyListRequest {
        word_count: args.words,
        filters: args
            .filters
            .iter()
            .map(|f| FilterStep { kind: (*f).into(), invert: args.invert.contains(f) })
            .collect(),
        refresh_mode: if args.full_resync { RefreshMode::Full } else { RefreshMode::Incremental },
        deck_name: args.deck,
        sync_options: SyncOptions { remove_obsolete: args.remove_obsolete, report_spellings: true },
    };

    let outcome = generate_study_list(
        &request,
        &frequency_list,
        &mut knowledge,
        progress.as_ref(),
        deck.as_ref(),
    );

    match outcome {
        Ok(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        Err(e) => {
            config.invalidate_rejected(&e)?;
            Err(e)
        }
    }
}

fn print_outcome(outcome: &StudyListOutcome) {
    for (step, remaining) in &outcome.stage_counts {
        println!("{:<28}{} words remaining.", format!("{}:", step), remaining);
    }

    println!("Generated list:");
    println!("{}", outcome.words.join(" "));

    if let Some(report) = &outcome.sync {
        if !report.added_spellings.is_empty() {
            println!("Added Vocabulary Words:");
            println!("{}", report.added_spellings.join(" "));
        }
        if !report.obsolete_spellings.is_empty() {
            println!("Obsolete Vocabulary Words:");
            println!("{}", report.obsolete_spellings.join(" "));
        }
    }

    println!("{}", outcome.status_message());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_study(args: &[&str]) -> Result<StudyArgs, clap::Error> {
        let argv = ["waniwords", "study"].iter().chain(args);
        match Cli::try_parse_from(argv)?.command {
            Command::Study(study) => Ok(study),
            Command::BuildCorpus(_) => panic!("Expected the study subcommand"),
        }
    }

    #[test]
    fn test_study_defaults() {
        let args = parse_study(&[]).unwrap();
        assert_eq!(args.words, 1000);
        assert_eq!(args.kanji_stage, DEFAULT_KANJI_STAGE);
        assert_eq!(args.vocabulary_stage, DEFAULT_VOCABULARY_STAGE);
        assert_eq!(args.deck, DEFAULT_DECK_NAME);
    }

    #[test]
    fn test_srs_stages_bounded() {
        assert_eq!(parse_study(&["--kanji-stage", "9"]).unwrap().kanji_stage, 9);
        assert!(parse_study(&["--vocabulary-stage", "10"]).is_err());
        assert!(parse_study(&["--kanji-stage", "0"]).is_err());
    }
}
