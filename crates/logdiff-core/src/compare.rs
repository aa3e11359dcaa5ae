//! Two-log comparison: the full extraction-to-report pipeline.

use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::align::{align_as_of_with, AlignOptions};
use crate::config::LogdiffConfig;
use crate::decoder::LogDecoder;
use crate::error::{CompareError, LogSide};
use crate::extract::{self, Extraction};
use crate::model::{ComparisonReport, MessageEvent, ParameterMap, ReportWarning, TimeSeries};
use crate::params::diff_parameters;
use crate::record_type::{RecordTags, RecordType};

/// The two logs to compare. The first is the baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    pub log1: PathBuf,
    pub log2: PathBuf,
}

impl CompareRequest {
    pub fn new(log1: impl Into<PathBuf>, log2: impl Into<PathBuf>) -> Self {
        Self {
            log1: log1.into(),
            log2: log2.into(),
        }
    }
}

/// Runs comparisons with one decoder and one set of tags.
///
/// Holds no per-run state: the same request always produces the same
/// report, and one comparator may serve concurrent runs.
#[derive(Debug, Clone)]
pub struct Comparator<D> {
    decoder: D,
    tags: RecordTags,
    align: AlignOptions,
}

impl<D: LogDecoder> Comparator<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            tags: RecordTags::default(),
            align: AlignOptions::default(),
        }
    }

    pub fn from_config(decoder: D, config: &LogdiffConfig) -> Self {
        Self {
            decoder,
            tags: config.record_types.clone(),
            align: config.alignment,
        }
    }

    pub fn with_align_options(mut self, align: AlignOptions) -> Self {
        self.align = align;
        self
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Compare two logs. All-or-nothing: any decode failure aborts.
    pub fn compare(
        &self,
        request: &CompareRequest,
        cancel: &CancellationToken,
    ) -> Result<ComparisonReport, CompareError> {
        let _span = tracing::info_span!(
            "compare",
            log1 = %request.log1.display(),
            log2 = %request.log2.display()
        )
        .entered();

        let (log1, log2) = (request.log1.as_path(), request.log2.as_path());
        let mut run = Run::new(self, cancel);

        let series1 = run.aligned_series(LogSide::First, log1)?;
        let series2 = run.aligned_series(LogSide::Second, log2)?;
        let params1 = run.parameters(LogSide::First, log1)?;
        let params2 = run.parameters(LogSide::Second, log2)?;
        let messages1 = run.messages(LogSide::First, log1)?;
        let messages2 = run.messages(LogSide::Second, log2)?;

        let param_diff = diff_parameters(&params1, &params2);
        tracing::info!(
            changed = param_diff.len(),
            warnings = run.warnings.len(),
            "comparison complete"
        );

        Ok(ComparisonReport {
            param_diff,
            series1,
            series2,
            messages1,
            messages2,
            warnings: run.warnings,
        })
    }

    /// Parameter maps of both logs, for the parameter-only view.
    pub fn parameter_maps(
        &self,
        request: &CompareRequest,
        cancel: &CancellationToken,
    ) -> Result<(ParameterMap, ParameterMap, Vec<ReportWarning>), CompareError> {
        let mut run = Run::new(self, cancel);
        let first = run.parameters(LogSide::First, &request.log1)?;
        let second = run.parameters(LogSide::Second, &request.log2)?;
        Ok((first, second, run.warnings))
    }

    /// Messages of a single log. Warnings and errors are labelled
    /// [`LogSide::Single`].
    pub fn log_messages(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<(Vec<MessageEvent>, Vec<ReportWarning>), CompareError> {
        let mut run = Run::new(self, cancel);
        let messages = run.messages(LogSide::Single, path)?;
        Ok((messages, run.warnings))
    }
}

/// Scratch for one comparison: collected warnings. Each step is told
/// which log it reads and how to label it.
struct Run<'a, D> {
    comparator: &'a Comparator<D>,
    cancel: &'a CancellationToken,
    warnings: Vec<ReportWarning>,
}

impl<'a, D: LogDecoder> Run<'a, D> {
    fn new(comparator: &'a Comparator<D>, cancel: &'a CancellationToken) -> Self {
        Self {
            comparator,
            cancel,
            warnings: Vec::new(),
        }
    }

    fn extract(
        &mut self,
        log: LogSide,
        path: &Path,
        record_type: RecordType,
    ) -> Result<Extraction, CompareError> {
        if self.cancel.is_cancelled() {
            return Err(CompareError::Cancelled);
        }
        let tag = self.comparator.tags.tag(record_type);
        let _span = tracing::info_span!("extract", %log, %record_type, tag).entered();

        let extraction = extract::extract(&self.comparator.decoder, path, &[tag], self.cancel)
            .map_err(|source| {
                if source.is_cancelled() {
                    CompareError::Cancelled
                } else {
                    CompareError::Decode { log, source }
                }
            })?;

        if extraction.skipped > 0 {
            self.warnings.push(ReportWarning::SkippedRows {
                log,
                record_type,
                count: extraction.skipped,
            });
        }
        if extraction.is_empty() {
            self.warnings.push(ReportWarning::NoData { log, record_type });
        }
        Ok(extraction)
    }

    fn series(
        &mut self,
        log: LogSide,
        path: &Path,
        record_type: RecordType,
    ) -> Result<TimeSeries, CompareError> {
        let extraction = self.extract(log, path, record_type)?;
        let (series, reordered) = extract::time_series(&extraction.rows);
        if reordered {
            tracing::warn!(%log, %record_type, "rows out of timestamp order, sorted");
            self.warnings.push(ReportWarning::Reordered { log, record_type });
        }
        Ok(series)
    }

    /// Attitude series with control tuning merged in, both from `path`.
    fn aligned_series(&mut self, log: LogSide, path: &Path) -> Result<TimeSeries, CompareError> {
        let attitude = self.series(log, path, RecordType::Attitude)?;
        let control = self.series(log, path, RecordType::ControlTuning)?;
        Ok(align_as_of_with(&attitude, &control, self.comparator.align))
    }

    fn parameters(&mut self, log: LogSide, path: &Path) -> Result<ParameterMap, CompareError> {
        let extraction = self.extract(log, path, RecordType::Parameter)?;
        let (params, skipped) = extract::parameter_map(&extraction.rows);
        self.add_skipped(log, RecordType::Parameter, skipped);
        Ok(params)
    }

    fn messages(&mut self, log: LogSide, path: &Path) -> Result<Vec<MessageEvent>, CompareError> {
        let extraction = self.extract(log, path, RecordType::Message)?;
        let (events, skipped, reordered) = extract::message_events(&extraction.rows);
        self.add_skipped(log, RecordType::Message, skipped);
        if reordered {
            self.warnings.push(ReportWarning::Reordered {
                log,
                record_type: RecordType::Message,
            });
        }
        Ok(events)
    }

    /// Fold conversion-level skips into the extraction's warning, if any.
    fn add_skipped(&mut self, log: LogSide, record_type: RecordType, skipped: usize) {
        if skipped == 0 {
            return;
        }
        let existing = self.warnings.iter_mut().find_map(|w| match w {
            ReportWarning::SkippedRows {
                log: l,
                record_type: r,
                count,
            } if *l == log && *r == record_type => Some(count),
            _ => None,
        });
        match existing {
            Some(count) => *count += skipped,
            None => self.warnings.push(ReportWarning::SkippedRows {
                log,
                record_type,
                count: skipped,
            }),
        }
    }
}
