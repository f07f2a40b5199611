use artwork_resolver::{
    EpisodeIdentity, Resolver, ResolverConfig, ResolverError, SeriesIdentity, TmdbClient,
    download_image,
};
use clap::{Args, Parser, Subcommand};
use humansize::{DECIMAL, format_size};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "artwork-resolver")]
#[command(about = "Find episode stills, logos, backdrops and titles on TheMovieDatabase")]
struct Cli {
    /// Config file to read instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every lookup step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SeriesArgs {
    /// Series name
    name: String,
    /// Year the series first aired
    year: i32,
}

impl SeriesArgs {
    fn identity(&self) -> SeriesIdentity {
        SeriesIdentity::new(self.name.clone(), self.year)
    }
}

#[derive(Args)]
struct EpisodeArgs {
    season: u32,
    episode: u32,

    /// Episode title
    #[arg(long, default_value = "")]
    title: String,

    /// Episode number counted across all seasons
    #[arg(long)]
    absolute: Option<u32>,
}

impl EpisodeArgs {
    fn identity(&self) -> EpisodeIdentity {
        let episode = EpisodeIdentity::new(self.title.clone(), self.season, self.episode);
        match self.absolute {
            Some(absolute) => episode.with_absolute_number(absolute),
            None => episode,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Resolve and print the TMDb, TVDb and IMDb IDs of a series
    SeriesIds {
        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Print the URL of the best source image of an episode
    SourceImage {
        #[command(flatten)]
        series: SeriesArgs,
        #[command(flatten)]
        episode: EpisodeArgs,

        /// Accept index matches without checking the title
        #[arg(long)]
        no_title_match: bool,

        /// Ignore images with a language code
        #[arg(long)]
        skip_localized: bool,
    },

    /// Print the title of an episode in the given language
    Title {
        #[command(flatten)]
        series: SeriesArgs,
        #[command(flatten)]
        episode: EpisodeArgs,

        /// Language or region code, e.g. "de" or "BR"
        language: String,
    },

    /// Print the URL of the best English logo of a series
    Logo {
        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Print the URL of the best backdrop of a series
    Backdrop {
        #[command(flatten)]
        series: SeriesArgs,

        /// Ignore images with a language code
        #[arg(long)]
        skip_localized: bool,
    },

    /// Download the source images of episodes 1 to EPISODES of a season
    DownloadSeason {
        #[command(flatten)]
        series: SeriesArgs,
        season: u32,
        episodes: u32,
        directory: PathBuf,
    },

    /// Forget the failed lookups of one series
    Unblacklist {
        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Forget every failed lookup
    DeleteBlacklist {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

impl Command {
    /// Whether the command works on the local stores only
    fn is_offline(&self) -> bool {
        matches!(
            self,
            Command::Unblacklist { .. } | Command::DeleteBlacklist { .. }
        )
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_result(result: Option<String>) {
    match result {
        Some(value) => println!("{}", value),
        None => println!("Nothing found."),
    }
}

fn resolved_series(resolver: &mut Resolver<TmdbClient>, args: &SeriesArgs) -> SeriesIdentity {
    let mut series = args.identity();
    resolver.resolve_series_ids(&mut series);
    series
}

fn download_season(
    resolver: &mut Resolver<TmdbClient>,
    series: &SeriesIdentity,
    season: u32,
    episodes: u32,
    directory: &Path,
) {
    let http = reqwest::blocking::Client::new();
    let mut total: u64 = 0;

    for number in 1..=episodes {
        let episode = EpisodeIdentity::new("", season, number);
        let Some(url) = resolver.get_source_image(series, &episode, false, false) else {
            println!("{}: no image found", episode);
            continue;
        };

        let destination = directory.join(format!("s{}e{}.jpg", season, number));
        match download_image(&http, &url, &destination) {
            Ok(size) => {
                total += size;
                println!(
                    "{}: {} ({})",
                    episode,
                    destination.display(),
                    format_size(size, DECIMAL)
                );
            }
            Err(e) => eprintln!("{}: {}", episode, e),
        }
    }

    println!("Downloaded {} in total.", format_size(total, DECIMAL));
}

fn run(cli: Cli) -> Result<(), ResolverError> {
    let config = ResolverConfig::load(cli.config.as_deref())?;

    let client = if cli.command.is_offline() {
        TmdbClient::new(&config.api_key)
    } else {
        TmdbClient::connect(&config.api_key)?
    };
    let mut resolver = Resolver::new(client, &config)?;

    match cli.command {
        Command::SeriesIds { series } => {
            let series = resolved_series(&mut resolver, &series);
            let show = |id: Option<String>| id.unwrap_or_else(|| "-".to_string());
            println!("{}", series);
            println!("  TMDb: {}", show(series.tmdb_id.map(|id| id.to_string())));
            println!("  TVDb: {}", show(series.tvdb_id.map(|id| id.to_string())));
            println!("  IMDb: {}", show(series.imdb_id.clone()));
        }
        Command::SourceImage {
            series,
            episode,
            no_title_match,
            skip_localized,
        } => {
            let series = resolved_series(&mut resolver, &series);
            let episode = episode.identity();
            print_result(resolver.get_source_image(
                &series,
                &episode,
                !no_title_match,
                skip_localized,
            ));
        }
        Command::Title {
            series,
            episode,
            language,
        } => {
            let series = resolved_series(&mut resolver, &series);
            print_result(resolver.get_episode_title(&series, &episode.identity(), &language));
        }
        Command::Logo { series } => {
            let series = resolved_series(&mut resolver, &series);
            print_result(resolver.get_series_logo(&series));
        }
        Command::Backdrop {
            series,
            skip_localized,
        } => {
            let series = resolved_series(&mut resolver, &series);
            print_result(resolver.get_series_backdrop(&series, skip_localized));
        }
        Command::DownloadSeason {
            series,
            season,
            episodes,
            directory,
        } => {
            let series = resolved_series(&mut resolver, &series);
            download_season(&mut resolver, &series, season, episodes, &directory);
        }
        Command::Unblacklist { series } => {
            let series = series.identity();
            let removed = resolver.purge_blacklist(&series)?;
            println!("Removed {} blacklist entries for {}", removed, series);
        }
        Command::DeleteBlacklist { yes } => {
            let confirmed = yes
                || dialoguer::Confirm::new()
                    .with_prompt("Delete the entire blacklist?")
                    .default(false)
                    .interact()
                    .unwrap_or(false);
            if !confirmed {
                println!("Blacklist kept.");
                return Ok(());
            }

            resolver.reset_blacklist()?;
            println!("Blacklist deleted.");
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
