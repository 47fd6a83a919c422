use std::io::Write;

use clap::{Parser, Subcommand};
use superrps::prelude::*;
use superrps::protocol::QUIT_MESSAGE;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "super-lan-rps", version, about = "Rock-paper-scissors over a LAN")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wait for a peer and play as Player 2.
    Server {
        #[arg(long, default_value = "0.0.0.0:8011")]
        bind: String,
        /// Seed for inventory regeneration.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Connect to a server, pick the stage, and play as Player 1.
    Client {
        #[arg(long, default_value = "127.0.0.1:8011")]
        server: String,
        /// Seed for inventory regeneration.
        #[arg(long)]
        seed: Option<u64>,
    },
}

// ---------------------------------------------------------------------------
// Terminal console
// ---------------------------------------------------------------------------

struct TerminalConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalConsole {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Prints `prompt` and reads one line. `None` once stdin is closed.
    async fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
        match self.lines.next_line().await {
            Ok(Some(line)) => Some(line.trim_end_matches('\r').to_string()),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stdin");
                None
            }
        }
    }
}

fn print_options(error: &InvalidSelection) {
    println!("You have to choose one of these options (no typos, case-sensitive):");
    println!("{}", error.valid.join(", "));
}

impl Console for TerminalConsole {
    async fn choose_stage(&mut self) -> StageChoice {
        println!("Choose a stage by entering its name.");
        println!("R, P, and S show how many of Rock, Paper, and Scissors each player gets.");
        for stage in Stage::ALL {
            println!("  {:<12}{}", stage.name(), stage.starting_inventory());
        }
        println!();

        loop {
            let Some(line) = self.read_line("Stage: ").await else {
                return StageChoice::Quit;
            };
            match parse_stage(&line) {
                Ok(choice) => return choice,
                Err(e) => {
                    println!("That stage doesn't exist.");
                    print_options(&e);
                }
            }
        }
    }

    async fn choose_play(&mut self, inventory: &Inventory) -> Play {
        println!("Your remaining options: {inventory}");
        loop {
            let Some(line) = self.read_line("Your move: ").await else {
                return Play::Quit;
            };
            match parse_play(&line, inventory) {
                Ok(play) => return play,
                Err(e) => {
                    println!(
                        "No fancy stuff in this game. You have to win using the power of prediction!"
                    );
                    print_options(&e);
                }
            }
        }
    }

    fn notify(&mut self, event: GameEvent) {
        match event {
            GameEvent::StageAnnounced { stage, starting } => {
                println!("Playing on stage {stage}");
                println!("On {stage}, you both start with the following move options:");
                println!("{starting}\n");
            }
            GameEvent::RoundResolved(report) => {
                println!("vs {}\n", report.opponent_move);
                match report.winner {
                    RoundWinner::Player1 => println!("Player 1 wins this round!"),
                    RoundWinner::Player2 => println!("Player 2 wins this round!"),
                    RoundWinner::Tie => println!("This round was a tie!"),
                    RoundWinner::Unset => {}
                }
                println!("Your score: {}", report.local_score);
                println!("Opponent score: {}\n", report.opponent_score);
            }
            GameEvent::Regenerated { inventory } => {
                println!("\nYou randomly regenerated some options! Here are your new options:");
                println!("{inventory}\n");
            }
            GameEvent::WaitingForOpponent => {
                println!("Waiting for your opponent...");
            }
            GameEvent::GameOver {
                code,
                local_score,
                opponent_score,
            } => {
                if code == EndGameCode::OpponentQuit {
                    println!("\nOpponent quit. You are the RPS master today.");
                }
                println!("\n***Final scores***");
                println!("You: {local_score}");
                println!("Opponent: {opponent_score}");
            }
            GameEvent::OpponentError { reason } => {
                println!("\nYour opponent had an error ({reason}). Ending the game.");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "warn,superrps=info,superrps_transport=info,superrps_protocol=info,superrps_engine=info,super_lan_rps=info",
        )
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    let mut console = TerminalConsole::new();

    let report = match cli.command {
        Command::Server { bind, seed } => {
            let config = SessionConfig::builder()
                .bind(&bind)
                .rng_seed(seed)
                .build();
            println!("Listening on {bind}. Type {QUIT_MESSAGE} to quit.\n");
            println!(
                "You are player 2. Waiting for player 1 to select a stage and a first move...\n"
            );
            host(&config, &mut console).await?
        }
        Command::Client { server, seed } => {
            let config = SessionConfig::builder()
                .server(&server)
                .rng_seed(seed)
                .build();
            println!("Connecting to {server}. Type {QUIT_MESSAGE} to quit.\n");
            println!("You are player 1.\n");
            join(&config, &mut console).await?
        }
    };

    tracing::debug!(outcome = ?report.outcome, "session finished");
    println!("\nConnection closed.");
    Ok(())
}
