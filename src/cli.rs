use clap::{App, Arg, ArgMatches};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

// Exit Codes for different types of errors
pub const ERR_INPUT_ERROR: i32 = 1;
pub const ERR_SEMANTIC_ERROR: i32 = 2;
pub const ERR_SEMANTIC_WARNING: i32 = 3;
pub const ERR_MANIFEST_WRITE_ERROR: i32 = 4;

pub fn configure_cli() -> clap::App<'static, 'static> {
    let app = App::new("fsdc")
        .version("0.3.0")
        .about("Compiles annotated file-system metadata descriptions into a validated, dependency-ordered manifest for code generation")
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .required(true)
                .help("Annotation tree (JSON) produced by the front end"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("File the resolved manifest is written to; stdout when omitted"),
        )
        .arg(
            Arg::with_name("name")
                .short("n")
                .long("name")
                .takes_value(true)
                .help("Name of the file system; defaults to the input file stem"),
        )
        .arg(
            Arg::with_name("emit")
                .long("emit")
                .possible_values(&["yaml", "json"])
                .takes_value(true)
                .help("Manifest serialization format (default yaml)"),
        )
        .arg(
            Arg::with_name("log")
                .long("log")
                .possible_values(&["debug", "info", "error"])
                .takes_value(true)
                .help("Print log messages at or above the given level"),
        );
    app
}

pub fn get_log_level(args: &ArgMatches) -> Option<LevelFilter> {
    match args.value_of("log") {
        Some("debug") => Some(LevelFilter::Debug),
        Some("info") => Some(LevelFilter::Info),
        Some("error") => Some(LevelFilter::Error),
        _ => None,
    }
}

pub fn configure_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
}
