//! Consumers of the aggregated series.

use crate::error::SinkError;
use crate::series::Series;

mod chart;

pub use chart::{render_svg, SvgChartSink};

/// Receives the series while a consume session runs
///
/// The session calls `on_sample` after every accepted reading, `on_refresh` at every
/// cooperative yield point, and `on_complete` exactly once, with a full series, when the
/// target count is reached. A session that is cancelled never calls `on_complete`.
pub trait Sink {
    fn on_sample(&mut self, series: &Series);

    /// Chance to redraw between polls
    fn on_refresh(&mut self, _series: &Series) {}

    /// Persist or export the final series
    ///
    /// # Errors
    /// Returns an error if the export fails; the session reports it as fatal.
    fn on_complete(&mut self, series: &Series) -> Result<(), SinkError>;
}
