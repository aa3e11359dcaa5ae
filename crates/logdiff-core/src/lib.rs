//! Compare two vehicle telemetry logs.
//!
//! The pipeline decodes each log through a [`LogDecoder`], types the rows,
//! aligns control-tuning samples onto attitude samples by nearest
//! timestamp, diffs the parameter sets and formats the text messages. The
//! result is a [`ComparisonReport`] with no residual state.

pub mod align;
pub mod channels;
pub mod compare;
pub mod config;
pub mod decoder;
pub mod error;
pub mod extract;
pub mod messages;
pub mod model;
pub mod params;
pub mod record_type;

pub use align::{align_as_of, align_as_of_with, AlignOptions};
pub use channels::{summarize_channels, ChannelPair, ChannelStats, ChannelSummary};
pub use compare::{Comparator, CompareRequest};
pub use config::{load_config, LogdiffConfig};
pub use decoder::{DecodedTable, LogDecoder, MavlogdumpDecoder, RawRecord};
pub use error::{CompareError, ConfigError, DecodeError, DecodeErrorKind, LogSide, MalformedRecord};
pub use extract::{extract, Extraction, Row, Value};
pub use messages::format_messages;
pub use model::{
    ComparisonReport, MessageEvent, ParameterDiffEntry, ParameterMap, ReportWarning, TimeSeries,
    TimeSeriesRecord,
};
pub use params::{diff_parameters, format_parameter_diff, ParameterDiffSummary};
pub use record_type::{RecordTags, RecordType};

pub use tokio_util::sync::CancellationToken;
