use crate::domain::{Coordinate, DraftFields, JournalCommand, ListFilter};
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::error::Error;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub help: bool,
    /// -v / --verbose: ログを stderr にも出す
    pub verbose: bool,
    /// サブコマンド（未指定なら None）
    pub command: Option<JournalCommand>,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

/// "lat,lng" を座標にする
fn parse_coordinate_arg(s: &str) -> Result<Coordinate, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG but got '{}'", s))?;
    let num = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| format!("'{}' is not a number", v.trim()))
    };
    Ok(Coordinate {
        lat: num(lat)?,
        lng: num(lng)?,
    })
}

fn list_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        clap::Arg::new("keyword")
            .short('k')
            .long("keyword")
            .value_name("keyword")
            .help("Show only entries with exactly this keyword")
            .num_args(1),
    )
    .arg(
        clap::Arg::new("search")
            .short('s')
            .long("search")
            .value_name("text")
            .help("Match name, address or keyword (case-insensitive)")
            .num_args(1),
    )
}

fn around_arg() -> clap::Arg {
    clap::Arg::new("around")
        .long("around")
        .value_name("lat,lng")
        .help("Search center (default: Athens)")
        .value_parser(parse_coordinate_arg)
        .num_args(1)
}

fn text_arg(name: &'static str, help: &'static str) -> clap::Arg {
    clap::Arg::new(name)
        .long(name)
        .value_name(name)
        .help(help)
        .num_args(1)
}

/// サブコマンド（-h は上位の global 引数で受ける）
fn sub(name: &'static str) -> clap::Command {
    clap::Command::new(name).disable_help_flag(true)
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("journal")
        .about("Private travel journal: memories, dreams and photos")
        .disable_help_flag(true)
        .disable_help_subcommand(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Mirror structured logs to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
        .subcommand(
            sub("status")
                .about("Show the access gate state")
                .arg(text_arg("path", "Screen path to check (default: /)")),
        )
        .subcommand(
            sub("sign-in")
                .about("Sign in with email and password")
                .arg(text_arg("email", "Account email").required(true))
                .arg(text_arg("password", "Account password").required(true)),
        )
        .subcommand(sub("sign-out").about("Sign out"))
        .subcommand(sub("home").about("Recent memories, counts and map pins"))
        .subcommand(list_args(
            sub("memories").about("List memories (newest visit first)"),
        ))
        .subcommand(list_args(
            sub("dreams").about("List dreams (newest first)"),
        ))
        .subcommand(
            sub("keywords")
                .about("List keywords used by memories (or dreams)")
                .arg(
                    clap::Arg::new("dreams")
                        .long("dreams")
                        .help("Use dreams instead of memories")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            sub("show")
                .about("Show one memory with photos")
                .arg(clap::Arg::new("id").index(1).required(true)),
        )
        .subcommand(
            sub("save")
                .about("Create a memory, or edit one with --id")
                .arg(text_arg("id", "Edit this memory instead of creating one"))
                .arg(text_arg("title", "Title (required)"))
                .arg(text_arg("body", "Free text"))
                .arg(text_arg("date", "Visit date YYYY-MM-DD (default: today)"))
                .arg(text_arg("place", "Place name"))
                .arg(text_arg("address", "Address"))
                .arg(text_arg("lat", "Latitude"))
                .arg(text_arg("lng", "Longitude"))
                .arg(text_arg("keyword", "Keyword"))
                .arg(
                    clap::Arg::new("photo")
                        .long("photo")
                        .value_name("file")
                        .help("JPEG file to attach (repeatable; the first becomes the cover)")
                        .action(ArgAction::Append)
                        .num_args(1),
                ),
        )
        .subcommand(
            sub("delete-dream")
                .about("Delete a dream")
                .arg(clap::Arg::new("id").index(1).required(true)),
        )
        .subcommand(
            sub("promote")
                .about("Turn a dream into a memory draft")
                .arg(clap::Arg::new("id").index(1).required(true)),
        )
        .subcommand(
            sub("search")
                .about("Search places by text")
                .arg(clap::Arg::new("query").index(1).required(true).num_args(1..))
                .arg(around_arg()),
        )
        .subcommand(
            sub("add-dream")
                .about("Search a place and save the first result as a dream")
                .arg(clap::Arg::new("query").index(1).required(true).num_args(1..))
                .arg(around_arg())
                .arg(text_arg("keyword", "Keyword for the new dream")),
        )
        .subcommand(
            sub("draft-place")
                .about("Search a place and open the first result as a memory draft")
                .arg(clap::Arg::new("query").index(1).required(true).num_args(1..))
                .arg(around_arg())
                .arg(text_arg("keyword", "Keyword for the draft")),
        )
}

fn string_of(m: &clap::ArgMatches, name: &str) -> Option<String> {
    m.get_one::<String>(name).cloned()
}

fn joined(m: &clap::ArgMatches, name: &str) -> String {
    m.get_many::<String>(name)
        .map(|v| v.cloned().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn list_filter(m: &clap::ArgMatches) -> ListFilter {
    ListFilter {
        keyword: string_of(m, "keyword"),
        query: string_of(m, "search").unwrap_or_default(),
    }
}

fn subcommand_to_command(name: &str, m: &clap::ArgMatches) -> Option<JournalCommand> {
    let cmd = match name {
        "status" => JournalCommand::Status {
            path: string_of(m, "path").unwrap_or_else(|| "/".to_string()),
        },
        "sign-in" => JournalCommand::SignIn {
            email: string_of(m, "email").unwrap_or_default(),
            password: string_of(m, "password").unwrap_or_default(),
        },
        "sign-out" => JournalCommand::SignOut,
        "home" => JournalCommand::Home,
        "memories" => JournalCommand::Memories(list_filter(m)),
        "dreams" => JournalCommand::Dreams(list_filter(m)),
        "keywords" => JournalCommand::Keywords {
            dreams: m.get_flag("dreams"),
        },
        "show" => JournalCommand::ShowMemory {
            id: string_of(m, "id")?,
        },
        "save" => JournalCommand::SaveMemory {
            id: string_of(m, "id"),
            fields: DraftFields {
                title: string_of(m, "title"),
                body: string_of(m, "body"),
                visited_at: string_of(m, "date"),
                place_name: string_of(m, "place"),
                address: string_of(m, "address"),
                lat: string_of(m, "lat"),
                lng: string_of(m, "lng"),
                keyword: string_of(m, "keyword"),
            },
            photos: m
                .get_many::<String>("photo")
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
        },
        "delete-dream" => JournalCommand::DeleteDream {
            id: string_of(m, "id")?,
        },
        "promote" => JournalCommand::PromoteDream {
            id: string_of(m, "id")?,
        },
        "search" => JournalCommand::SearchPlaces {
            query: joined(m, "query"),
            around: m.get_one::<Coordinate>("around").copied(),
        },
        "add-dream" => JournalCommand::AddDream {
            query: joined(m, "query"),
            around: m.get_one::<Coordinate>("around").copied(),
            keyword: string_of(m, "keyword"),
        },
        "draft-place" => JournalCommand::DraftFromPlace {
            query: joined(m, "query"),
            around: m.get_one::<Coordinate>("around").copied(),
            keyword: string_of(m, "keyword"),
        },
        _ => return None,
    };
    Some(cmd)
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    let sub = matches.subcommand();
    // -h / -v はサブコマンドの後ろに書いてもよい
    let flag = |name: &str| {
        matches.get_flag(name) || sub.map(|(_, m)| m.get_flag(name)).unwrap_or(false)
    };
    Config {
        help: flag("help"),
        verbose: flag("verbose"),
        command: sub.and_then(|(name, m)| subcommand_to_command(name, m)),
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }

    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

/// テスト用: 引数スライスから解析する
#[cfg(test)]
pub fn parse_args_from(args: &[&str]) -> Result<Config, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_config(&matches))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "journal", &mut std::io::stdout());
}

/// 使い方の本文
pub fn help_text() -> String {
    build_clap_command().render_help().to_string()
}

/// Config を JournalCommand に変換する
pub fn config_to_command(config: Config) -> JournalCommand {
    if config.help {
        return JournalCommand::Help;
    }
    config.command.unwrap_or(JournalCommand::Help)
}
