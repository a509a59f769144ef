// SPDX-License-Identifier: GPL-3.0-only

//! Landmark sources
//!
//! Everything that produces [`DetectionFrame`](crate::gesture::DetectionFrame)s:
//! recorded traces, external detector processes and the pointer-driven
//! synthetic hand. All of them publish into a
//! [`LatestSender`](crate::session::LatestSender); the frame loop reads the
//! newest value on each tick.

pub mod pointer;
pub mod process;
pub mod replay;
pub mod trace;

pub use pointer::PointerHand;
pub use process::{DetectorProcess, DetectorStats};
pub use replay::{load_trace, parse_trace, play};
pub use trace::{DetectionRecord, HandRecord, decode_line, encode_line};
