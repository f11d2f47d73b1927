//! Terminal front end: stdin lines are the "new joke" button, stdout is the
//! text view. Logs go to stderr so they never interleave with jokes.

use std::str::FromStr;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// User input understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch a new joke now. Leaves the countdown alone.
    NewJoke,
    /// Log the countdown and content state.
    Status,
    /// Tear the controller down and rebuild it from an in-memory snapshot.
    Reload,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "n" | "new" => Ok(Command::NewJoke),
            "s" | "status" => Ok(Command::Status),
            "r" | "reload" => Ok(Command::Reload),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

pub const HELP: &str = "[enter] new joke  [s] status  [r] reload  [q] quit";

/// Forward stdin lines as commands. EOF counts as `Quit`.
pub fn spawn_stdin_reader(tx: mpsc::Sender<Command>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let cmd = match lines.next_line().await {
                Ok(Some(line)) => match line.parse::<Command>() {
                    Ok(cmd) => cmd,
                    Err(e) => {
                        println!("{e}\n{HELP}");
                        continue;
                    }
                },
                Ok(None) => Command::Quit,
                Err(e) => {
                    warn!("stdin read failed: {e}");
                    Command::Quit
                }
            };
            if tx.send(cmd).await.is_err() || cmd == Command::Quit {
                break;
            }
        }
        debug!("stdin reader exited");
    })
}

/// Print every value published on the display channel, starting with the
/// current one. Returns when the owning content cell is dropped.
pub async fn print_display(mut rx: watch::Receiver<String>) {
    let first = rx.borrow_and_update().clone();
    println!("\n{first}\n");
    while rx.changed().await.is_ok() {
        let text = rx.borrow_and_update().clone();
        println!("\n{text}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("".parse::<Command>(), Ok(Command::NewJoke));
        assert_eq!("  N ".parse::<Command>(), Ok(Command::NewJoke));
        assert_eq!("status".parse::<Command>(), Ok(Command::Status));
        assert_eq!("r".parse::<Command>(), Ok(Command::Reload));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
        assert!("dance".parse::<Command>().is_err());
    }
}
