//! Line-oriented terminal front end.
//!
//! A thin presentation layer: it renders the session state and forwards
//! typed commands to the [`PuzzleSession`]. Stage changes (including the
//! delayed advance after a level) are rendered as they happen.

use crate::command::{HELP, PlayerCommand};
use crate::games::puzzles::{GameStateMachine, HintDecision, PuzzleConfig, SolveOutcome, Stage};
use crate::session::PuzzleSession;
use std::fmt::Write as _;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument};

const BRIEFING: &str = "\"Auta Joulupukkia selvittämään Joulumuorin lempielokuva. Tontut ovat \
jättäneet kryptisiä vihjeitä ja pukilta alkaa loppua aika ennen jouluaattoa.\"";

/// Renders the screen for the current stage.
pub fn render_stage(machine: &GameStateMachine) -> String {
    let mut out = String::new();
    match machine.stage() {
        Stage::Intro => {
            let _ = writeln!(out, "X-MAS MOVIE APOCALYPSE\n");
            let _ = writeln!(out, "{}\n", BRIEFING);
            let _ = writeln!(out, "Type `start` to begin the mission.");
        }
        Stage::Finished => {
            let _ = writeln!(out, "CLASSIFIED FILE DECRYPTED\n");
            let _ = writeln!(out, "    APOLLO 13\n");
            let _ = writeln!(out, "MRS. CLAUS'S FAVORITE MOVIE");
            let _ = writeln!(out, "Type `reset` to play again.");
        }
        stage => {
            let Some(level) = machine.active_level() else {
                return out;
            };
            let _ = writeln!(out, "== {} ==", level.title());
            let _ = writeln!(
                out,
                "Decryption Phase: {} / {}  {}",
                stage.level_number().unwrap_or_default(),
                machine.catalog().play_level_count(),
                progress_bar(stage)
            );
            for puzzle in level.puzzles() {
                out.push('\n');
                out.push_str(&render_puzzle(machine, puzzle));
            }
        }
    }
    out
}

fn progress_bar(current: Stage) -> String {
    Stage::PLAY_STAGES
        .iter()
        .map(|&stage| match stage.cmp(&current) {
            std::cmp::Ordering::Less => "[x]",
            std::cmp::Ordering::Equal => "[>]",
            std::cmp::Ordering::Greater => "[ ]",
        })
        .collect()
}

/// Renders one puzzle card: status, image, inputs and hint.
pub fn render_puzzle(machine: &GameStateMachine, puzzle: &PuzzleConfig) -> String {
    let mut out = String::new();
    let solved = machine.is_puzzle_solved(puzzle.id());
    let status = if solved { "UNLOCKED" } else { "LOCKED" };
    let _ = writeln!(out, "[{}] {}", puzzle.id(), status);

    let image = machine.resolve_image(puzzle.image_key());
    if machine.needs_override(puzzle.image_key()) {
        let _ = writeln!(
            out,
            "  image: missing evidence, supply one with `override {} <file>`",
            puzzle.image_key()
        );
    } else {
        let _ = writeln!(out, "  image: {}", image);
    }

    let mut fields = String::new();
    for (index, input) in puzzle.inputs().iter().enumerate() {
        if index > 0 {
            match input.label() {
                Some(label) => {
                    let _ = write!(fields, " {} ", label);
                }
                None => fields.push(' '),
            }
        }
        let _ = write!(fields, "<{}: {}>", input.id(), input.placeholder().unwrap_or("???"));
    }
    let _ = writeln!(out, "  answer: {}", fields);

    if let Some(hint) = machine.revealed_hint(puzzle.id()) {
        let _ = writeln!(out, "  [HINT] {}", hint);
    } else if puzzle.hint().is_some() && !solved {
        if machine.hint_used() {
            let _ = writeln!(out, "  hint unavailable");
        } else {
            let _ = writeln!(out, "  global hint available: `hint {}`", puzzle.id());
        }
    }
    out
}

/// What the loop should do after a command.
enum Reply {
    Text(String),
    Quit,
}

#[instrument(skip(session))]
async fn handle(session: &PuzzleSession, line: &str) -> Reply {
    let command = match line.parse::<PlayerCommand>() {
        Ok(command) => command,
        Err(e) => return Reply::Text(format!("! {}", e)),
    };
    debug!(?command, "Parsed command");

    let text = match command {
        PlayerCommand::Start => match session.start().await {
            Ok(_) => String::new(),
            Err(rejection) => format!("! {}", rejection),
        },
        PlayerCommand::Solve { puzzle, answers } => {
            let answers = match session.read(|m| m.catalog().puzzle(&puzzle).cloned()).await {
                Some(config) => answers.into_answers(&config),
                None => Default::default(),
            };
            match session.solve_puzzle(&puzzle, &answers).await {
                Ok(SolveOutcome::Incorrect { inputs }) => {
                    format!("x Access denied: {} incorrect", inputs.join(", "))
                }
                Ok(SolveOutcome::AlreadySolved) => format!("{} is already unlocked", puzzle),
                Ok(SolveOutcome::Solved) => format!("{} unlocked", puzzle),
                Ok(SolveOutcome::LevelComplete(_)) => {
                    format!("{} unlocked. Level decrypted, stand by...", puzzle)
                }
                Err(rejection) => format!("! {}", rejection),
            }
        }
        PlayerCommand::Hint(puzzle) => match session.request_hint(&puzzle).await {
            Ok(HintDecision::Granted | HintDecision::AlreadyRevealed) => session
                .read(|m| m.revealed_hint(&puzzle).map(|hint| format!("[HINT] {}", hint)))
                .await
                .unwrap_or_default(),
            Ok(HintDecision::Denied) => {
                "Hint unavailable: the global hint is already spent".to_string()
            }
            Err(rejection) => format!("! {}", rejection),
        },
        PlayerCommand::Override { key, reference } => {
            session.set_override(&key, reference.clone()).await;
            format!("{} now shows {}", key, reference)
        }
        PlayerCommand::Missing(key) => {
            session.report_asset_failure(&key).await;
            format!("{} marked missing; supply one with `override {} <file>`", key, key)
        }
        PlayerCommand::Status => serde_json::to_string_pretty(&session.snapshot().await)
            .unwrap_or_else(|e| format!("! Failed to serialize session: {}", e)),
        PlayerCommand::Reset => {
            session.reset().await;
            String::new()
        }
        PlayerCommand::Help => HELP.to_string(),
        PlayerCommand::Quit => return Reply::Quit,
    };
    Reply::Text(text)
}

/// Runs an interactive session until `quit` or end of input.
pub async fn run<R, W>(session: &PuzzleSession, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Terminal session started");
    let mut stages = session.subscribe();
    let mut lines = input.lines();

    let screen = session.read(render_stage).await;
    output.write_all(screen.as_bytes()).await?;
    output.flush().await?;

    loop {
        tokio::select! {
            biased;

            changed = stages.changed() => {
                if changed.is_err() {
                    break;
                }
                let screen = session.read(render_stage).await;
                output.write_all(b"\n").await?;
                output.write_all(screen.as_bytes()).await?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match handle(session, &line).await {
                    Reply::Quit => break,
                    Reply::Text(text) if text.is_empty() => {}
                    Reply::Text(text) => {
                        output.write_all(text.as_bytes()).await?;
                        output.write_all(b"\n").await?;
                    }
                }
            }
        }
        output.flush().await?;
    }

    info!("Terminal session ended");
    output.flush().await
}
