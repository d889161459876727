// fuzz/fuzz_targets/parse_record.rs
//
// The raw-record parser must never panic: any byte soup a backend manages
// to persist as a log message degrades to a `log` event.
#![no_main]

use libfuzzer_sys::fuzz_target;
use specdeck_stream::{parse_log_record, EnvelopeFinders};
use specdeck_types::{LogLevel, LogRecord};

fuzz_target!(|data: &[u8]| {
    let Ok(message) = std::str::from_utf8(data) else {
        return;
    };
    let finders = EnvelopeFinders::new();
    let record = LogRecord {
        id: "fuzz".to_owned(),
        timestamp: "2026-01-01T00:00:00Z".to_owned(),
        level: LogLevel::Info,
        message: message.to_owned(),
    };
    let _ = parse_log_record(&record, &finders);
});
