// src/omnixtracker/omnixmetry.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[OMNIXTRACKER]Xyn>=====S===t===u===d===i===o===s======[R|$>

use crate::constants::{INITIAL_LOG_LEVEL, LOG_FILE_PATH, METRICS_HISTORY_LEN};
use tracing_subscriber::{Layer, Registry, EnvFilter};
use tracing::{Event, Level, Metadata, Subscriber};
use anyhow::{Context, Result as AnyhowResult};
use tracing_subscriber::prelude::*;
use std::fmt::Write as FmtWrite;
use std::fs::{OpenOptions, File};
use std::io::{Write, BufWriter};
use std::collections::{VecDeque, HashMap};
use std::path::Path;
use parking_lot::RwLock;
use std::sync::Arc;
use chrono::Local;
use colored::*;

#[derive(Clone)]
pub struct OmniXMetry {
    log_file: Arc<RwLock<Option<BufWriter<File>>>>,
    log_level: Arc<RwLock<Level>>,
    metrics_data: Arc<RwLock<MetricsData>>,
}

struct MetricsData {
    counters: HashMap<String, u64>,
    gauges: HashMap<String, VecDeque<(chrono::DateTime<Local>, f64)>>,
    histograms: HashMap<String, VecDeque<(chrono::DateTime<Local>, f64)>>,
}

impl MetricsData {
    fn new() -> Self {
        Self {
            counters: HashMap::new(),
            gauges: HashMap::new(),
            histograms: HashMap::new(),
        }
    }

    fn add_counter(&mut self, key: String, value: u64) {
        *self.counters.entry(key).or_insert(0) += value;
    }

    fn push_bounded(series: &mut HashMap<String, VecDeque<(chrono::DateTime<Local>, f64)>>, key: String, value: f64) {
        let entry = series.entry(key).or_insert_with(VecDeque::new);
        entry.push_back((Local::now(), value));
        if entry.len() > METRICS_HISTORY_LEN {
            entry.pop_front();
        }
    }
}

impl OmniXMetry {
    /// Opens (or creates) the log file at `LOG_FILE_PATH` in append mode.
    pub fn init() -> AnyhowResult<Self> {
        Self::with_log_file(&*LOG_FILE_PATH)
    }

    pub fn with_log_file(path: impl AsRef<Path>) -> AnyhowResult<Self> {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .with_context(|| format!("Failed to open log file {}", path.as_ref().display()))?;

        let metry = Self::in_memory();
        *metry.log_file.write() = Some(BufWriter::new(log_file));
        Ok(metry)
    }

    /// Console-only logging with an in-memory metrics history.
    pub fn in_memory() -> Self {
        Self {
            log_level: Arc::new(RwLock::new(*INITIAL_LOG_LEVEL)),
            log_file: Arc::new(RwLock::new(None)),
            metrics_data: Arc::new(RwLock::new(MetricsData::new())),
        }
    }

    pub fn set_log_level(&self, level: Level) {
        let mut log_level = self.log_level.write();
        *log_level = level;
    }

    pub fn get_log_level(&self) -> Level {
        *self.log_level.read()
    }

    pub fn is_log_file_initialized(&self) -> bool {
        self.log_file.read().is_some()
    }

    pub fn increment_counter(&self, key_name: &str, value: u64) {
        metrics::counter!(key_name.to_string()).increment(value);
        self.metrics_data.write().add_counter(key_name.to_string(), value);
    }

    pub fn update_gauge(&self, key_name: &str, value: f64) {
        metrics::gauge!(key_name.to_string()).set(value);
        MetricsData::push_bounded(&mut self.metrics_data.write().gauges, key_name.to_string(), value);
    }

    pub fn record_histogram(&self, key_name: &str, value: f64) {
        metrics::histogram!(key_name.to_string()).record(value);
        MetricsData::push_bounded(&mut self.metrics_data.write().histograms, key_name.to_string(), value);
    }

    pub fn counter_value(&self, key_name: &str) -> u64 {
        self.metrics_data.read().counters.get(key_name).copied().unwrap_or(0)
    }

    pub fn latest_gauge(&self, key_name: &str) -> Option<f64> {
        self.metrics_data
            .read()
            .gauges
            .get(key_name)
            .and_then(|series| series.back().map(|(_, v)| *v))
    }

    pub fn histogram_values(&self, key_name: &str) -> Vec<f64> {
        self.metrics_data
            .read()
            .histograms
            .get(key_name)
            .map(|series| series.iter().map(|(_, v)| *v).collect())
            .unwrap_or_default()
    }

    pub fn write_log(&self, log_entry: &str) -> std::io::Result<()> {
        if let Some(ref mut file) = *self.log_file.write() {
            writeln!(file, "{}", log_entry)?;
            file.flush()?;
        }
        Ok(())
    }
}

impl<S> Layer<S> for OmniXMetry
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        if *event.metadata().level() <= self.get_log_level() {
            let level_str = match *event.metadata().level() {
                Level::ERROR => "ERROR".red(),
                Level::WARN => "WARN ".yellow(),
                Level::INFO => "INFO ".green(),
                Level::DEBUG => "DEBUG".blue(),
                Level::TRACE => "TRACE".magenta(),
            };

            let mut fields = String::new();
            {
                let mut visitor = FieldVisitor { output: &mut fields };
                event.record(&mut visitor);
            }

            let timestamp = Local::now().format("%B, %d %Y @ %I:%M %p");
            println!("{} [{}] {}: {}", timestamp, level_str, event.metadata().target(), fields);

            // Plain level name in the file, no ANSI codes.
            let file_entry = format!(
                "{} [{}] {}: {}",
                timestamp,
                event.metadata().level(),
                event.metadata().target(),
                fields
            );
            if let Err(e) = self.write_log(&file_entry) {
                eprintln!("Failed to write to log file: {}", e);
            }
        }
    }

    fn enabled(
        &self,
        metadata: &Metadata<'_>,
        _: tracing_subscriber::layer::Context<'_, S>,
    ) -> bool {
        *metadata.level() <= self.get_log_level()
    }
}

struct FieldVisitor<'a> {
    output: &'a mut String,
}

impl<'a> tracing::field::Visit for FieldVisitor<'a> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if !self.output.is_empty() {
            self.output.push_str(", ");
        }
        if field.name() == "message" {
            let _ = write!(self.output, "{:?}", value);
        } else {
            let _ = write!(self.output, "{} = {:?}", field.name(), value);
        }
    }
}

pub fn setup_global_subscriber(omnixmetry: OmniXMetry) -> AnyhowResult<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let subscriber = Registry::default().with(env_filter).with(omnixmetry);
    tracing::subscriber::set_global_default(subscriber).context("Failed to set global subscriber")?;
    Ok(())
}
