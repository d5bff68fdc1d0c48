// 100 concurrent emitters x 100 entries against the lossless loggers.
use rask_logger::test_support::SharedBuffer;
use rask_logger::{
    ConsoleLogger, Field, FileLogger, FileRotation, Format, Level, Logger, MemoryLogger,
    SharedLogger,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 100;
const PER_THREAD: usize = 100;

fn hammer(logger: &SharedLogger) {
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.child(&format!("t{t}"));
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info_with(
                        format_args!("thread {t} entry {i} {}", "x".repeat(64)).into(),
                        &[Field::new("thread", t), Field::new("seq", i)],
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("emitter thread panicked");
    }
    logger.flush();
}

/// Every line must be a complete JSON entry and every (thread, seq) pair must appear once.
fn assert_complete(lines: &[String]) {
    assert_eq!(lines.len(), THREADS * PER_THREAD);

    let mut seen = HashSet::new();
    for line in lines {
        let json: serde_json::Value =
            serde_json::from_str(line).unwrap_or_else(|e| panic!("torn line {line:?}: {e}"));
        let thread = json["fields"]["thread"].as_u64().unwrap();
        let seq = json["fields"]["seq"].as_u64().unwrap();
        assert_eq!(json["logger"], format!("app.t{thread}"));
        assert!(seen.insert((thread, seq)), "duplicate entry {thread}/{seq}");
    }
}

#[test]
fn test_memory_logger_loses_nothing() {
    let memory = MemoryLogger::new("app");
    let shared: SharedLogger = Arc::new(memory.clone());

    hammer(&shared);

    let lines: Vec<String> = memory
        .entries()
        .iter()
        .map(|e| e.to_json().unwrap())
        .collect();
    assert_complete(&lines);
    assert_eq!(memory.stats().emitted, (THREADS * PER_THREAD) as u64);
}

#[test]
fn test_console_lines_never_interleave() {
    let buffer = SharedBuffer::new();
    let console = ConsoleLogger::with_writer("app", Level::Debug, Format::Json, buffer.clone());
    let shared: SharedLogger = Arc::new(console.clone());

    hammer(&shared);

    assert_complete(&buffer.lines());
    assert_eq!(console.stats().failed, 0);
}

#[test]
fn test_console_text_lines_are_whole() {
    let buffer = SharedBuffer::new();
    let shared: SharedLogger = Arc::new(ConsoleLogger::with_writer(
        "app",
        Level::Debug,
        Format::Text,
        buffer.clone(),
    ));

    hammer(&shared);

    let lines = buffer.lines();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    for line in &lines {
        assert!(line.contains(" INFO  app.t"), "{line}");
        assert!(line.contains(&"x".repeat(64)), "{line}");
        assert!(line.contains("seq="), "{line}");
    }
}

#[test]
fn test_file_logger_loses_nothing_across_rotations() {
    let dir = TempDir::new().unwrap();
    let file = FileLogger::with_rotation(
        dir.path().join("app.json"),
        "app",
        Level::Debug,
        FileRotation {
            max_size_bytes: 256 * 1024,
            ..FileRotation::default()
        },
    )
    .unwrap();
    let shared: SharedLogger = Arc::new(file.clone());

    hammer(&shared);

    let mut lines = Vec::new();
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let content = std::fs::read_to_string(entry.unwrap().path()).unwrap();
        lines.extend(content.lines().map(str::to_string));
    }
    assert_complete(&lines);
    assert_eq!(file.stats().failed, 0);
}
