//! Headless Front End
//!
//! Prints one line per notable event and forwards stdin characters to the
//! engine as key presses. Per-turn flips and turn ticks are not printed.

use std::io::{self, BufRead, Write};
use std::thread;

use gol_engine::Event;
use tokio::sync::mpsc;
use tracing::debug;

/// `Completed Turns {n:<8} {event}`, or `None` for per-turn noise
#[must_use]
pub fn format_event(event: &Event) -> Option<String> {
    let line = event.to_string();
    if line.is_empty() {
        return None;
    }
    Some(format!(
        "Completed Turns {:<8} {}",
        event.completed_turns(),
        line
    ))
}

/// Print events to `out` until the engine closes the stream
pub async fn print_events<W: Write>(
    mut events: mpsc::Receiver<Event>,
    mut out: W,
) -> io::Result<()> {
    while let Some(event) = events.recv().await {
        if let Some(line) = format_event(&event) {
            writeln!(out, "{line}")?;
            out.flush()?;
        }
    }
    Ok(())
}

/// Forward every non-whitespace character typed on stdin
///
/// Runs on a plain thread since stdin reads block. The thread ends when
/// stdin closes or the engine stops listening.
pub fn forward_stdin(keys: mpsc::Sender<char>) -> thread::JoinHandle<()> {
    thread::spawn(move || forward_lines(io::stdin().lock(), &keys))
}

fn forward_lines<R: BufRead>(input: R, keys: &mpsc::Sender<char>) {
    for line in input.lines() {
        let Ok(line) = line else {
            break;
        };
        for key in line.chars().filter(|c| !c.is_whitespace()) {
            if keys.blocking_send(key).is_err() {
                debug!("Engine stopped listening for keys");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gol_engine::{Board, Cell, State};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_format_event() {
        let event = Event::AliveCellsCount {
            completed_turns: 42,
            cells_count: 5565,
        };
        assert_eq!(
            format_event(&event).unwrap(),
            "Completed Turns 42       Alive Cells 5565"
        );

        let quitting = Event::StateChange {
            completed_turns: 100,
            new_state: State::Quitting,
        };
        assert_eq!(
            format_event(&quitting).unwrap(),
            "Completed Turns 100      Quitting"
        );
    }

    #[test]
    fn test_noise_not_printed() {
        assert_eq!(format_event(&Event::TurnComplete { completed_turns: 1 }), None);
        assert_eq!(
            format_event(&Event::CellFlipped {
                completed_turns: 1,
                cell: Cell::new(0, 0)
            }),
            None
        );
    }

    #[tokio::test]
    async fn test_print_events_until_closed() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(Event::TurnComplete { completed_turns: 1 }).await.unwrap();
        tx.send(Event::ImageOutputComplete {
            completed_turns: 1,
            filename: "4x4x1".into(),
        })
        .await
        .unwrap();
        tx.send(Event::FinalTurnComplete {
            completed_turns: 1,
            board: Arc::new(Board::new(4, 4)),
        })
        .await
        .unwrap();
        drop(tx);

        let mut out = Vec::new();
        print_events(rx, &mut out).await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Completed Turns 1        File 4x4x1 Output Complete\n\
             Completed Turns 1        Final Turn Complete (0 alive)\n"
        );
    }

    #[test]
    fn test_forward_lines() {
        let (tx, mut rx) = mpsc::channel(16);
        forward_lines("s p\nq\n".as_bytes(), &tx);

        let mut keys = Vec::new();
        while let Ok(key) = rx.try_recv() {
            keys.push(key);
        }
        assert_eq!(keys, vec!['s', 'p', 'q']);
    }

    #[test]
    fn test_forward_stops_when_engine_gone() {
        let (tx, rx) = mpsc::channel(16);
        drop(rx);
        forward_lines("sss\n".as_bytes(), &tx);
    }
}
