use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use interview_scheduler::config::{self, BoardArgs, Cli, Command, ExportArgs, WebArgs};
use interview_scheduler::display::{print_board, write_board_to_file};
use interview_scheduler::form::export_to_files;
use interview_scheduler::store::ScheduleStore;
use interview_scheduler::{logging, web};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = config::initial_store(cli.seed.as_deref()).context("failed to load seed file")?;

    match cli.command.unwrap_or(Command::Board(BoardArgs::default())) {
        Command::Board(args) => board(&store, args),
        Command::Export(args) => export(&store, args),
        Command::Web(args) => serve(store, args).await,
    }
}

fn board(store: &ScheduleStore, args: BoardArgs) -> Result<()> {
    print_board(store.schedule(), store.applicants());

    if let Some(path) = args.output {
        write_board_to_file(store.schedule(), store.applicants(), &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("\nBoard saved to {}", path.display());
    }
    Ok(())
}

fn export(store: &ScheduleStore, args: ExportArgs) -> Result<()> {
    export_to_files(store.schedule(), store.applicants(), &args.board, &args.roster)
        .context("failed to export CSV")?;
    println!("Board saved to {}", args.board.display());
    println!("Applicants saved to {}", args.roster.display());
    Ok(())
}

async fn serve(store: ScheduleStore, args: WebArgs) -> Result<()> {
    info!(bind = %args.bind, port = args.port, "starting web server");
    println!("Access the site at http://localhost:{}", args.port);
    web::start_server(store, &args.bind, args.port, args.admin_password)
        .await
        .context("web server failed")?;
    Ok(())
}
