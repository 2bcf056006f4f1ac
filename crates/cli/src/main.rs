use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

use sgfdl_core::{
    config::{self, AppConfig},
    Pipeline,
};

/// Download SGF game records from the OGS server.
#[derive(Parser, Debug)]
#[command(name = "sgfdl", version, about)]
struct Args {
    /// Player ids from the OGS server. Example: -p 64817
    #[arg(short = 'p', long = "players", num_args = 1.., required = true)]
    players: Vec<String>,

    /// Page range of the game history to walk, as FROM TO; the TO page
    /// itself is not fetched. Example: -r 1 100
    #[arg(short = 'r', long = "range", num_args = 2, value_names = ["FROM", "TO"], required = true)]
    range: Vec<u32>,

    /// Directory the records are saved under.
    #[arg(long = "path", required = true)]
    path: PathBuf,

    /// Keep only games played on boards of this width.
    #[arg(long = "board-size")]
    board_size: Option<u32>,

    /// Stop walking the history as soon as a page comes back empty.
    #[arg(long = "stop-on-empty")]
    stop_on_empty: bool,

    /// Configuration file to read instead of the default location.
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();

    config::ensure_default_config()?;
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(Some(path.clone()))?,
        None => AppConfig::load()?,
    };
    if let Some(board_size) = args.board_size {
        config.board_size = board_size;
    }
    if args.stop_on_empty {
        config.stop_on_empty = true;
    }

    let pipeline = Pipeline::new(&config)?;
    let pages = args.range[0]..args.range[1];
    archive_players(&pipeline, &args.players, pages, &args.path).await
}

/// Run the pipeline for each player in turn, stopping at the first fatal
/// error.
async fn archive_players(
    pipeline: &Pipeline,
    players: &[String],
    pages: Range<u32>,
    dest: &Path,
) -> Result<()> {
    for player in players {
        tracing::info!("archiving games for player {player}");
        pipeline.run(player, pages.clone(), dest).await?;
    }
    tracing::info!("all {} player(s) processed", players.len());
    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;
    use sgfdl_core::Pacer;
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tempfile::tempdir;
    use wiremock::matchers::{method, path as url_path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_the_usual_invocation() {
        let args =
            Args::parse_from(["sgfdl", "-p", "64817", "-r", "1", "4", "--path", "/tmp/sgf"]);
        assert_eq!(args.players, ["64817"]);
        assert_eq!(args.range, [1, 4]);
        assert_eq!(args.path, PathBuf::from("/tmp/sgf"));
        assert_eq!(args.board_size, None);
        assert!(!args.stop_on_empty);
    }

    #[test]
    fn accepts_several_players_in_one_token() {
        let args = Args::parse_from([
            "sgfdl", "--players", "64817", "123", "--range", "1", "10", "--path", "out",
        ]);
        assert_eq!(args.players, ["64817", "123"]);
    }

    #[test]
    fn accepts_the_board_size_and_stop_flags() {
        let args = Args::parse_from([
            "sgfdl",
            "-p",
            "64817",
            "-r",
            "1",
            "4",
            "--path",
            "out",
            "--board-size",
            "13",
            "--stop-on-empty",
        ]);
        assert_eq!(args.board_size, Some(13));
        assert!(args.stop_on_empty);
    }

    #[test]
    fn every_switch_is_required() {
        assert!(Args::try_parse_from(["sgfdl", "-p", "64817"]).is_err());
        assert!(Args::try_parse_from(["sgfdl", "-r", "1", "4", "--path", "out"]).is_err());
        assert!(Args::try_parse_from(["sgfdl", "-p", "64817", "-r", "1", "4"]).is_err());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Route this thread's log output into a readable buffer until the guard
    /// drops.
    fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (logs, tracing::subscriber::set_default(subscriber))
    }

    async fn mount_player(server: &MockServer, player: &str, username: &str, game: i64) {
        Mock::given(method("GET"))
            .and(url_path(format!("/api/v1/players{player}/games")))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "results": [{
                    "id": game,
                    "width": 9,
                    "height": 9,
                    "related": {"detail": format!("/api/v1/games/{game}")}
                }]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(url_path(format!("/api/v1/players{player}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 1, "username": username})),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(url_path(format!("/api/v1/games/{game}/sgf")))
            .respond_with(ResponseTemplate::new(200).set_body_string("(;GM[1])"))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn archives_each_requested_player_and_logs_progress() -> Result<()> {
        let server = MockServer::start().await;
        mount_player(&server, "7", "shusaku", 101).await;
        mount_player(&server, "8", "shuwa", 202).await;
        let dir = tempdir()?;
        let config = AppConfig {
            base_url: server.uri(),
            ..AppConfig::default()
        };
        let pipeline = Pipeline::new(&config)?.with_pacer(Pacer::disabled());
        let players = ["7".to_string(), "8".to_string()];
        let (logs, _guard) = capture_logs();

        archive_players(&pipeline, &players, 1..2, dir.path()).await?;

        assert!(dir.path().join("shusaku").join("101.sgf").exists());
        assert!(dir.path().join("shuwa").join("202.sgf").exists());
        let contents = logs.contents();
        assert!(contents.contains("archiving games for player 7"));
        assert!(contents.contains("archiving games for player 8"));
        assert!(contents.contains("all 2 player(s) processed"));
        Ok(())
    }
}
