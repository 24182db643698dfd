use std::pin::Pin;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Sleep, sleep};

use chess_core::config::AppConfig;
use chess_core::engine::types::{ChessError, Color, PieceType, Square};
use chess_core::session::{AutomatedTurn, GameSession, Selection};

type PendingTurn = Option<(AutomatedTurn, Pin<Box<Sleep>>)>;

enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the board.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        automated_opponent = config.automated_opponent,
        automated_color = %config.automated_color,
        delay_ms = config.ai_delay_ms,
        "chess-core v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let delay = Duration::from_millis(config.ai_delay_ms);
    let mut session = GameSession::new(&config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: PendingTurn = None;

    print_board(&session);
    println!("type `help` for commands");

    loop {
        if pending.is_none()
            && let Some(ticket) = session.automated_turn()
        {
            println!("{} is thinking...", session.automated_color());
            pending = Some((ticket, Box::pin(sleep(delay))));
        }

        tokio::select! {
            () = wait_pending(&mut pending) => {
                let Some((ticket, _)) = pending.take() else { continue };
                match session.play_automated_turn(ticket) {
                    Ok(Some(applied)) => {
                        println!("{} plays {}", applied.piece.color, applied.mv);
                        print_board(&session);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        if report(&e) {
                            std::process::exit(1);
                        }
                    }
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to read stdin");
                        break;
                    }
                };
                match handle_command(&mut session, line.trim()) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => {
                        if report(&e) {
                            std::process::exit(1);
                        }
                    }
                }
                // A command that changed the game voids the pending turn.
                if pending.is_some() && !session.is_thinking() {
                    pending = None;
                }
            }
        }
    }
}

/// Resolve when the pending automated turn's delay has elapsed; never without one.
async fn wait_pending(pending: &mut PendingTurn) {
    match pending {
        Some((_, delay)) => delay.as_mut().await,
        None => std::future::pending().await,
    }
}

/// Print a rejection. Returns `true` when the session can no longer continue.
fn report(e: &ChessError) -> bool {
    if e.is_fatal() {
        tracing::error!(error = %e, "fatal engine error");
        eprintln!("fatal: {e}");
        return true;
    }
    println!("rejected [{}]: {e}", e.code());
    false
}

fn handle_command(session: &mut GameSession, line: &str) -> Result<Flow, ChessError> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(Flow::Continue);
    };
    let args: Vec<&str> = parts.collect();

    match cmd {
        "quit" | "exit" => return Ok(Flow::Quit),
        "help" => print_help(),
        "board" => print_board(session),
        "state" => match serde_json::to_string_pretty(&session.state()) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "failed to serialize state"),
        },
        "fen" if args.is_empty() => println!("{}", session.game().to_fen()),
        "fen" => {
            session.load_fen(&args.join(" "))?;
            print_board(session);
        }
        "moves" => {
            let moves = match args.first() {
                Some(sq) => session.game().legal_moves_from(sq.parse()?),
                None => session.game().legal_moves(),
            };
            let list: Vec<String> = moves.iter().map(|m| m.to_string()).collect();
            println!("{}", list.join(" "));
        }
        "select" => {
            let sq: Square = args.first().copied().unwrap_or_default().parse()?;
            match session.select_square(sq)? {
                Selection::Selected { square, destinations } => {
                    let dests: Vec<String> = destinations.iter().map(|s| s.to_string()).collect();
                    println!("selected {square}: {}", dests.join(" "));
                }
                Selection::Deselected => println!("selection cleared"),
                Selection::Moved(applied) => {
                    println!("{} plays {}", applied.piece.color, applied.mv);
                    print_board(session);
                }
                Selection::Ignored => println!("nothing to select"),
            }
        }
        "undo" => {
            let undone = session.undo();
            if undone.is_empty() {
                println!("nothing to undo");
            } else {
                print_board(session);
            }
        }
        "reset" => {
            session.reset();
            print_board(session);
        }
        "ai" => match args.as_slice() {
            ["on"] => session.set_automated_opponent(true),
            ["off"] => session.set_automated_opponent(false),
            [color] => match color.parse::<Color>() {
                Ok(color) => session.set_automated_color(color),
                Err(_) => println!("usage: ai on|off|white|black"),
            },
            _ => println!(
                "automated opponent: {} ({})",
                if session.automated_opponent() { "on" } else { "off" },
                session.automated_color()
            ),
        },
        _ => {
            let (from, to, promotion) = parse_move(line)?;
            let applied = session.attempt_move(from, to, promotion)?;
            println!("{} plays {}", applied.piece.color, applied.mv);
            print_board(session);
        }
    }
    Ok(Flow::Continue)
}

/// Parse "e2e4", "e2 e4", "e7e8q" or "e7 e8 q".
fn parse_move(input: &str) -> Result<(Square, Square, Option<PieceType>), ChessError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !(4..=5).contains(&compact.len()) || !compact.is_ascii() {
        return Err(ChessError::InvalidSquare(input.to_string()));
    }
    let from: Square = compact[0..2].parse()?;
    let to: Square = compact[2..4].parse()?;
    let promotion = match &compact[4..] {
        "" => None,
        letter => Some(letter.parse()?),
    };
    Ok((from, to, promotion))
}

fn print_board(session: &GameSession) {
    println!("{}", session.game().position().board_string());
    let summary = format!("{} to move, status: {}", session.side_to_move(), session.status());
    match session.last_move() {
        Some(mv) => println!("{summary}, last move: {mv}"),
        None => println!("{summary}"),
    }
}

fn print_help() {
    println!(
        "commands:
  e2e4 | e7e8q        play a move (promotion letter optional)
  select <square>     click a square
  moves [square]      list legal moves
  undo | reset        take back / start over
  ai on|off|white|black
  fen [fen]           show or load a position
  board | state       print the board / JSON snapshot
  quit"
    );
}
