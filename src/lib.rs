//! Scratch card reveal over a pixel buffer, plus UPI payment deep links.
//!
//! The card ([`scratcher::ScratchCard`]) erases a cover bitmap under the
//! pointer and reports completion once enough of it is gone. The payment side
//! ([`payment`], [`dispatch`]) builds `upi://` links and hands the right one to
//! the OS for the current platform.

pub mod assets;
pub mod config;
pub mod dispatch;
pub mod draw;
pub mod error;
pub mod input;
pub mod layout;
pub mod logging;
pub mod payment;
pub mod popup;
pub mod progress;
pub mod scratcher;
pub mod surface;
pub mod types;
