// ==============================================================================
// Generator Hand-Off
// ==============================================================================
//
// A generator is an external executable, `threft-gen-<name>`, that reads the
// encoded model from stdin and writes its output files into its working
// directory. Its stdout and stderr are inherited so the user sees them
// directly.
//
// The payload is written on a separate thread while this thread waits for the
// process to exit. A generator that stops reading early therefore cannot
// wedge the hand-off: its exit closes the pipe and the writer returns.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use crate::config::GeneratorSpec;
use crate::error::GeneratorError;

/// Build the command for `spec`, to run in `output_dir` with a piped stdin
/// and inherited stdout/stderr.
pub fn generator_command(spec: &GeneratorSpec, output_dir: &Path) -> Command {
    let mut command = Command::new(spec.program());
    command
        .args(&spec.args)
        .current_dir(output_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    command
}

/// Start the generator described by `spec`.
pub fn spawn_generator(spec: &GeneratorSpec, output_dir: &Path) -> Result<Child, GeneratorError> {
    spawn(generator_command(spec, output_dir))
}

fn spawn(mut command: Command) -> Result<Child, GeneratorError> {
    let program = command.get_program().to_string_lossy().into_owned();
    tracing::debug!(%program, "spawning generator");
    command
        .spawn()
        .map_err(|source| GeneratorError::Spawn { program, source })
}

/// Write `payload` to the child's stdin, close it, and wait for the child.
///
/// Returns the exit status whatever it is; interpreting it is up to the
/// caller. A broken pipe is only reported as a write failure when the child
/// claims success, since a failing child explains itself through its status.
pub fn send(payload: Vec<u8>, child: &mut Child) -> Result<ExitStatus, GeneratorError> {
    let mut stdin = child.stdin.take().ok_or(GeneratorError::MissingStdin)?;
    let len = payload.len();
    let writer = thread::spawn(move || -> io::Result<()> {
        stdin.write_all(&payload)?;
        stdin.flush()
        // `stdin` drops here, closing the pipe.
    });

    let status = child.wait().map_err(GeneratorError::Wait)?;
    let written = writer.join().map_err(|_| GeneratorError::WriterPanicked)?;
    tracing::debug!(bytes = len, %status, "generator exited");

    match written {
        Ok(()) => Ok(status),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe && !status.success() => Ok(status),
        Err(e) => Err(GeneratorError::Write(e)),
    }
}

/// Spawn `command`, hand it `payload`, and require a successful exit.
pub fn run(command: Command, payload: Vec<u8>) -> Result<(), GeneratorError> {
    let mut child = spawn(command)?;
    let status = send(payload, &mut child)?;
    if status.success() {
        Ok(())
    } else {
        Err(GeneratorError::Failed { status })
    }
}

/// Run the generator described by `spec` in `output_dir` on `payload`.
pub fn run_generator(
    spec: &GeneratorSpec,
    output_dir: &Path,
    payload: Vec<u8>,
) -> Result<(), GeneratorError> {
    run(generator_command(spec, output_dir), payload)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Command {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::null());
        command
    }

    #[test]
    fn send_delivers_payload_and_returns_status() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let out = dir.path().join("received.json");

        let mut child = shell(&format!("cat > '{}'", out.display()))
            .spawn()
            .expect("sh is available");
        let status = send(b"{\"parsed\": true}".to_vec(), &mut child).expect("hand-off succeeds");
        assert!(status.success());
        assert_eq!(
            std::fs::read_to_string(&out).expect("payload written"),
            "{\"parsed\": true}"
        );
    }

    #[test]
    fn send_reports_nonzero_status_without_error() {
        let mut child = shell("cat > /dev/null; exit 3").spawn().expect("sh is available");
        let status = send(vec![b'x'; 1024], &mut child).expect("hand-off completes");
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn early_exit_with_failure_is_not_a_write_error() {
        // Larger than any pipe buffer, and never read.
        let mut child = shell("exit 7").spawn().expect("sh is available");
        let status = send(vec![b'x'; 4 << 20], &mut child).expect("status is reported");
        assert_eq!(status.code(), Some(7));
    }

    #[test]
    fn send_requires_piped_stdin() {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg("exit 0")
            .stdin(Stdio::null())
            .spawn()
            .expect("sh is available");
        let err = send(Vec::new(), &mut child).expect_err("stdin is not piped");
        assert!(matches!(err, GeneratorError::MissingStdin));
        child.wait().ok();
    }

    #[test]
    fn run_turns_failure_status_into_error() {
        run(shell("cat > /dev/null"), b"{}".to_vec()).expect("successful generator");
        let err = run(shell("cat > /dev/null; exit 2"), b"{}".to_vec())
            .expect_err("failing generator");
        assert!(matches!(err, GeneratorError::Failed { status } if status.code() == Some(2)));
    }

    #[test]
    fn missing_generator_fails_to_spawn() {
        let spec = GeneratorSpec::parse("no-such-generator-for-tests").expect("valid spec");
        let err = run_generator(&spec, Path::new("."), Vec::new()).expect_err("not on PATH");
        match err {
            GeneratorError::Spawn { program, .. } => {
                assert_eq!(program, "threft-gen-no-such-generator-for-tests");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn generator_command_runs_in_output_dir() {
        let spec = GeneratorSpec::parse("go --flag").expect("valid spec");
        let command = generator_command(&spec, Path::new("out"));
        assert_eq!(command.get_program(), "threft-gen-go");
        assert_eq!(command.get_args().collect::<Vec<_>>(), vec!["--flag"]);
        assert_eq!(command.get_current_dir(), Some(Path::new("out")));
    }
}
