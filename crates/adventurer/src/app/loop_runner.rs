use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use chronos::ParseOutcome;
use tracing::{error, info};

use super::bootstrap::AppWiring;

const PROMPT: &str = "> ";

pub(crate) fn run(mut app: AppWiring) -> ExitCode {
    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(err) = run_session(&mut app, stdin.lock(), &mut stdout.lock()) {
        error!(error = %err, "session_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

pub(crate) fn run_session<R: BufRead, W: Write>(
    app: &mut AppWiring,
    input: R,
    out: &mut W,
) -> io::Result<()> {
    writeln!(
        out,
        "Welcome to the {}. It is {}. Type 'help' for a list of commands.",
        app.inn_name,
        app.clock.time_of_day()
    )?;
    write!(out, "{PROMPT}")?;
    out.flush()?;

    let mut pending = Vec::new();
    let mut lines_read = 0usize;
    for line in input.lines() {
        let line = line?;
        lines_read += 1;
        let outcome = app.parser.receive_command(&line);

        app.output.drain_output_lines_into(&mut pending);
        for text in pending.drain(..) {
            writeln!(out, "{text}")?;
        }
        if let ParseOutcome::Scheduled(Some(_)) = outcome {
            writeln!(out, "[{}]", app.clock.time_of_day())?;
        }

        if app.quit_requested.load(Ordering::SeqCst) {
            break;
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }

    info!(
        lines = lines_read,
        clock = app.clock.time(),
        "session_ended"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chronos::{GameConfig, PatronArrival};

    use super::super::bootstrap::wire;
    use super::*;

    fn config_with_one_patron() -> GameConfig {
        GameConfig {
            patrons: vec![PatronArrival {
                name: "Falsoon".to_string(),
                far_description: "A burly fighter.".to_string(),
                near_description: "His knuckles are scarred.".to_string(),
                arrive_after: 60,
            }],
            patron_visit_seconds: 600,
            ..GameConfig::default()
        }
    }

    fn play(script: &str) -> (String, AppWiring) {
        let mut app = wire(&config_with_one_patron());
        let mut out = Vec::new();
        run_session(&mut app, Cursor::new(script.to_string()), &mut out).expect("session");
        (String::from_utf8(out).expect("utf8"), app)
    }

    #[test]
    fn patron_arrives_while_waiting_and_leaves_later() {
        let (out, app) = play("wait 2 m\nlook\ninspect falsoon\nwait 1 h\nquit\nlook\n");

        assert!(out.contains("Falsoon enters the Ugly Ogre Inn."));
        assert!(out.contains("You see patrons inside:\nFalsoon"));
        assert!(out.contains("His knuckles are scarred."));
        assert!(out.contains("You wait for 1 hour."));
        assert!(out.contains("Falsoon leaves the Ugly Ogre Inn."));
        assert!(out.contains("Farewell, adventurer."));
        assert_eq!(out.matches("Ugly Ogre Inn\nBork tends the bar.").count(), 1);
        assert_eq!(app.clock.time(), 21_600 + 10 + 120 + 4 + 5 + 10 + 3600);
    }

    #[test]
    fn rejected_and_unknown_lines_leave_clock_alone() {
        let (out, app) = play("wait 90 minutes\nsing\n");

        assert!(out.contains("USAGE: WAIT"));
        assert!(out.contains(chronos::command::ERRMSG_UNKNOWN));
        assert!(!out.contains("[06:"));
        assert_eq!(app.clock.time(), 21_600);
    }
}
