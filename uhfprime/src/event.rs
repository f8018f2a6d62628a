//! Notifications published by a [`crate::Reader`]

use uhfprime_core::{Frame, FrameTrace};
use uhfprime_types::TagReport;

/// Reader notification
///
/// Delivered through a broadcast channel; see [`crate::Reader::subscribe`].
#[derive(Debug, Clone)]
pub enum ReaderEvent {
    /// A tag was seen during inventory
    TagReported(TagReport),

    /// A frame with a valid CRC arrived
    FrameReceived(Frame),

    /// A frame was sent or received, valid or not
    FrameTraced(FrameTrace),
}

impl ReaderEvent {
    /// Tag report carried by this event, if any
    pub fn as_tag(&self) -> Option<&TagReport> {
        match self {
            Self::TagReported(report) => Some(report),
            _ => None,
        }
    }
}
