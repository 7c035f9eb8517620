//! Third-party integrations
//!
//! Opaque domain services (search/confirm) consumed by agents.

pub mod booking;

pub use booking::{
    BookingConfirmation, BookingCriteria, BookingOption, BookingProvider, HttpBookingProvider,
};
