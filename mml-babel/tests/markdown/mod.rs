//! Legacy markdown format tests
//!
//! Export (tree → text + entities), import (text + entities → tree), and the
//! round trip between them.

mod import;
mod round_trip;
mod sentinels;
