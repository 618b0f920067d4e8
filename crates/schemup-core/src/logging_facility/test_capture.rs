//! In-memory capture of operation events for tests
//!
//! Only events emitted through the `log_op_*` macros (those carrying an `op`
//! field) are recorded. Numeric fields stay numeric so tests can assert on
//! versions and file counts directly.

use schemup_core_types::schema::{
    FIELD_CURRENT_VERSION, FIELD_DURATION_MS, FIELD_ERR_CODE, FIELD_EVENT, FIELD_FILE_COUNT,
    FIELD_OP, FIELD_TARGET_VERSION,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded operation event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: String,
    pub event: String,
    numbers: BTreeMap<&'static str, u64>,
    text: BTreeMap<&'static str, String>,
}

impl CapturedEvent {
    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op == op && self.event == event
    }

    /// Unsigned field value, if the field was recorded as a number
    pub fn number(&self, name: &str) -> Option<u64> {
        self.numbers.get(name).copied()
    }

    /// Field value recorded as text or through `Debug`
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.number(FIELD_DURATION_MS)
    }

    pub fn current_version(&self) -> Option<u32> {
        self.version_field(FIELD_CURRENT_VERSION)
    }

    pub fn target_version(&self) -> Option<u32> {
        self.version_field(FIELD_TARGET_VERSION)
    }

    pub fn file_count(&self) -> Option<usize> {
        self.number(FIELD_FILE_COUNT)
            .and_then(|n| usize::try_from(n).ok())
    }

    pub fn err_code(&self) -> Option<&str> {
        self.text(FIELD_ERR_CODE)
    }

    /// Formatted message of the event
    pub fn message(&self) -> Option<&str> {
        self.text("message")
    }

    fn version_field(&self, name: &str) -> Option<u32> {
        self.number(name).and_then(|n| u32::try_from(n).ok())
    }
}

#[derive(Default)]
struct EventVisitor {
    numbers: BTreeMap<&'static str, u64>,
    text: BTreeMap<&'static str, String>,
}

impl Visit for EventVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.numbers.insert(field.name(), value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match u64::try_from(value) {
            Ok(n) => self.record_u64(field, n),
            Err(_) => {
                self.text.insert(field.name(), value.to_string());
            }
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.text.insert(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.text.insert(field.name(), format!("{:?}", value));
    }
}

impl EventVisitor {
    fn into_event(mut self, level: Level) -> Option<CapturedEvent> {
        let op = self.text.remove(FIELD_OP)?;
        let event = self.text.remove(FIELD_EVENT).unwrap_or_default();
        Some(CapturedEvent {
            level,
            op,
            event,
            numbers: self.numbers,
            text: self.text,
        })
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        if let Some(captured) = visitor.into_event(*event.metadata().level()) {
            if let Ok(mut events) = self.events.lock() {
                events.push(captured);
            }
        }
    }
}

/// Shared handle on the captured events
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events of `op` with the given event name, in emission order
    pub fn events_for(&self, op: &str, event: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.is(op, event))
            .collect()
    }

    pub fn count_events(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// # Panics
    ///
    /// Panics if no event of `op` named `event` was captured
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "no {} event for op {} among {} captured events",
            event,
            op,
            events.len()
        );
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber.
///
/// Every test in the binary shares one buffer, so filter on something the
/// test owns (a unique op name or a temp path).
///
/// ```
/// use schemup_core::log_op_start;
/// use schemup_core::logging_facility::test_capture::init_test_capture;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_example", target_version = 2);
/// let start = &capture.events_for("doc_capture_example", "start")[0];
/// assert_eq!(start.target_version(), Some(2));
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let events = Arc::new(Mutex::new(Vec::new()));
            let layer = CaptureLayer {
                events: events.clone(),
            };
            let _ = tracing_subscriber::registry().with(layer).try_init();
            TestCapture { events }
        })
        .clone()
}
