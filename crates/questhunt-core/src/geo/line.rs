//! Line-oriented position source.
//!
//! Reads one reading per line from any async reader (typically stdin fed by
//! a GPS bridge such as `gpspipe` post-processed to text):
//!
//! ```text
//! 50.6740,3.1468          fix
//! heading 270             device heading
//! error signal_lost       source error
//! # comment               ignored
//! ```

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::warn;

use super::stream::{GeoEvent, PositionFix, PositionSource, Subscription, WatchOptions};
use super::Coordinate;
use crate::error::PositionError;

pub struct LineSource<R> {
    reader: R,
}

impl<R> LineSource<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

/// Parse one line. `None` for blank lines and comments.
pub fn parse_line(line: &str) -> Option<GeoEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    if let Some(rest) = line.strip_prefix("heading") {
        return Some(match rest.trim().parse::<f64>() {
            Ok(deg) if deg.is_finite() => GeoEvent::Heading(deg),
            _ => GeoEvent::Error(PositionError::Source(format!("bad heading: {line}"))),
        });
    }
    if let Some(rest) = line.strip_prefix("error") {
        return Some(GeoEvent::Error(PositionError::from_code(rest.trim())));
    }
    Some(match line.parse::<Coordinate>() {
        Ok(coordinate) => GeoEvent::Fix(PositionFix::fresh(coordinate)),
        Err(e) => GeoEvent::Error(PositionError::Source(e.to_string())),
    })
}

impl<R> PositionSource for LineSource<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    fn watch(self, options: WatchOptions) -> Subscription {
        let (raw_tx, raw_rx) = mpsc::channel(16);
        let mut lines = self.reader.lines();
        let producer = tokio::spawn(async move {
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(event) = parse_line(&line) {
                            if raw_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "position input failed");
                        let _ = raw_tx
                            .send(GeoEvent::Error(PositionError::Source(e.to_string())))
                            .await;
                        break;
                    }
                }
            }
        });
        Subscription::supervise(raw_rx, options, vec![producer])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fix_heading_and_error() {
        assert_eq!(
            parse_line("50.6740, 3.1468"),
            Some(GeoEvent::Fix(PositionFix::fresh(Coordinate::new(50.6740, 3.1468))))
        );
        assert_eq!(parse_line("heading 270"), Some(GeoEvent::Heading(270.0)));
        assert_eq!(
            parse_line("error permission_denied"),
            Some(GeoEvent::Error(PositionError::PermissionDenied))
        );
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("# start of walk"), None);
    }

    #[test]
    fn garbage_becomes_source_error() {
        assert!(matches!(
            parse_line("somewhere over there"),
            Some(GeoEvent::Error(PositionError::Source(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn streams_lines_from_reader() {
        let input: &[u8] = b"50.6740,3.1468\nheading 90\n";
        let mut sub = LineSource::new(input).watch(WatchOptions::default());

        assert!(matches!(sub.recv().await, Some(GeoEvent::Fix(_))));
        assert_eq!(sub.recv().await, Some(GeoEvent::Heading(90.0)));
        // End of input is not the end of the stream.
        assert!(matches!(
            sub.recv().await,
            Some(GeoEvent::Error(PositionError::Timeout { .. }))
        ));
    }
}
